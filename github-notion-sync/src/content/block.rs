//! Notion block and rich text values.
//!
//! These serialize directly into the JSON the Notion API accepts for page
//! children and comment bodies.

use serde::Serialize;

/// Formatting applied to a rich text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
}

impl Annotations {
    /// Returns true when no formatting is applied.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Target of a linked run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

/// Text of a rich text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichText {
    pub text: TextContent,
    #[serde(skip_serializing_if = "Annotations::is_plain")]
    pub annotations: Annotations,
}

impl RichText {
    /// Creates an unformatted run.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::styled(content, Annotations::default(), None)
    }

    /// Creates a run with the given formatting and optional link.
    pub fn styled(
        content: impl Into<String>,
        annotations: Annotations,
        link: Option<String>,
    ) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
                link: link.map(|url| Link { url }),
            },
            annotations,
        }
    }

    /// Returns the unformatted text of the run.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.text.content
    }

    /// Returns the link target, if any.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.text.link.as_ref().map(|link| link.url.as_str())
    }
}

/// Concatenates the text of several runs.
#[must_use]
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(RichText::content).collect()
}

/// Body of text-bearing blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub rich_text: Vec<RichText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

/// Body of a to-do block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToDoBlock {
    pub rich_text: Vec<RichText>,
    pub checked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

/// Body of a code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

/// Externally hosted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

/// Body of an image block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageBlock {
    External { external: ExternalFile },
}

/// Body of blocks without content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Empty {}

/// A Notion block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextBlock,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        numbered_list_item: TextBlock,
    },
    ToDo {
        to_do: ToDoBlock,
    },
    Quote {
        quote: TextBlock,
    },
    Code {
        code: CodeBlock,
    },
    Image {
        image: ImageBlock,
    },
    Divider {
        divider: Empty,
    },
}

impl Block {
    /// Creates a paragraph.
    #[must_use]
    pub fn paragraph(rich_text: Vec<RichText>) -> Self {
        Self::Paragraph {
            paragraph: TextBlock {
                rich_text,
                children: Vec::new(),
            },
        }
    }

    /// Returns the block's own rich text (not its children's).
    #[must_use]
    pub fn rich_text(&self) -> &[RichText] {
        match self {
            Self::Paragraph { paragraph: b }
            | Self::Heading1 { heading_1: b }
            | Self::Heading2 { heading_2: b }
            | Self::Heading3 { heading_3: b }
            | Self::BulletedListItem {
                bulleted_list_item: b,
            }
            | Self::NumberedListItem {
                numbered_list_item: b,
            }
            | Self::Quote { quote: b } => &b.rich_text,
            Self::ToDo { to_do } => &to_do.rich_text,
            Self::Code { code } => &code.rich_text,
            Self::Image { .. } | Self::Divider { .. } => &[],
        }
    }

    /// Returns the nested child blocks.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        match self {
            Self::BulletedListItem {
                bulleted_list_item: b,
            }
            | Self::NumberedListItem {
                numbered_list_item: b,
            } => &b.children,
            Self::ToDo { to_do } => &to_do.children,
            _ => &[],
        }
    }

    /// Returns the block's own text without formatting.
    #[must_use]
    pub fn plain_text(&self) -> String {
        plain_text(self.rich_text())
    }
}
