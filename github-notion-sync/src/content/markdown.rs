//! Folds a pulldown-cmark event stream into Notion blocks.

use crate::content::block::{
    Annotations, Block, CodeBlock, Empty, ExternalFile, ImageBlock, RichText, TextBlock, ToDoBlock,
};
use crate::content::limit_rich_text;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

/// List items deeper than this have their children flattened into the
/// parent, since Notion accepts two levels of nesting per request.
const MAX_LIST_NESTING: usize = 2;

/// Languages Notion's code block accepts, after alias resolution.
const NOTION_LANGUAGES: &[&str] = &[
    "bash", "c", "c#", "c++", "clojure", "css", "dart", "diff", "docker", "elixir", "elm",
    "erlang", "go", "graphql", "groovy", "haskell", "html", "java", "javascript", "json", "julia",
    "kotlin", "latex", "lua", "makefile", "markdown", "nix", "objective-c", "ocaml", "perl",
    "php", "plain text", "powershell", "protobuf", "python", "r", "ruby", "rust", "scala",
    "scss", "shell", "sql", "swift", "typescript", "xml", "yaml",
];

/// Parses markdown into Notion blocks.
pub(crate) fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy)]
enum Leaf {
    Paragraph,
    Heading(u8),
}

/// Tags currently open, popped on each `End` event.
#[derive(Debug)]
enum Open {
    Leaf(Leaf),
    Quote,
    CodeBlock,
    List,
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image(Option<String>),
    Other,
}

#[derive(Debug, Default)]
struct ListItem {
    ordered: bool,
    checked: Option<bool>,
    rich_text: Vec<RichText>,
    children: Vec<Block>,
}

#[derive(Debug, Default)]
struct PendingCode {
    language: String,
    text: String,
}

/// Inline runs of the leaf being built plus the active formatting.
#[derive(Debug, Default)]
struct Inline {
    runs: Vec<RichText>,
    bold: usize,
    italic: usize,
    strikethrough: usize,
    links: Vec<Option<String>>,
}

impl Inline {
    fn push(&mut self, text: &str, code: bool) {
        if text.is_empty() {
            return;
        }
        let annotations = Annotations {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strikethrough: self.strikethrough > 0,
            code,
        };
        let link = self.links.last().cloned().flatten();

        if let Some(last) = self.runs.last_mut() {
            if last.annotations == annotations && last.link() == link.as_deref() {
                last.text.content.push_str(text);
                return;
            }
        }
        self.runs.push(RichText::styled(text, annotations, link));
    }

    fn take(&mut self) -> Vec<RichText> {
        let mut runs = std::mem::take(&mut self.runs);
        trim_trailing_newlines(&mut runs);
        runs
    }
}

#[derive(Debug, Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    open: Vec<Open>,
    lists: Vec<bool>,
    items: Vec<ListItem>,
    inline: Inline,
    quote: Vec<RichText>,
    quote_depth: usize,
    code: Option<PendingCode>,
    images: Vec<String>,
    image_depth: usize,
    in_html_comment: bool,
}

impl BlockBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if self.image_depth == 0 {
                    self.inline.push(&code, true);
                }
            }
            Event::SoftBreak | Event::HardBreak => self.text("\n"),
            Event::Html(html) | Event::InlineHtml(html) => {
                let visible = self.strip_html_comments(&html);
                if !visible.trim().is_empty() {
                    self.text(&visible);
                }
            }
            Event::Rule => {
                self.flush_loose_text();
                self.place(Block::Divider { divider: Empty {} });
            }
            Event::TaskListMarker(checked) => {
                if let Some(item) = self.items.last_mut() {
                    item.checked = Some(checked);
                }
            }
            _ => {}
        }
    }

    /// Removes `<!-- ... -->` spans. HTML blocks arrive one line per event,
    /// so an open comment carries over to the next event.
    fn strip_html_comments(&mut self, html: &str) -> String {
        let mut visible = String::new();
        let mut rest = html;
        loop {
            if self.in_html_comment {
                let Some(end) = rest.find("-->") else {
                    return visible;
                };
                rest = &rest[end + 3..];
                self.in_html_comment = false;
            }
            match rest.find("<!--") {
                Some(start) => {
                    visible.push_str(&rest[..start]);
                    rest = &rest[start + 4..];
                    self.in_html_comment = true;
                }
                None => {
                    visible.push_str(rest);
                    return visible;
                }
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph | Tag::HtmlBlock => {
                self.flush_loose_text();
                Open::Leaf(Leaf::Paragraph)
            }
            Tag::Heading { level, .. } => {
                self.flush_loose_text();
                Open::Leaf(Leaf::Heading(match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    _ => 3,
                }))
            }
            Tag::BlockQuote(_) => {
                self.flush_loose_text();
                self.quote_depth += 1;
                Open::Quote
            }
            Tag::CodeBlock(kind) => {
                self.flush_loose_text();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(PendingCode {
                    language,
                    text: String::new(),
                });
                Open::CodeBlock
            }
            Tag::List(start) => {
                self.flush_loose_text();
                self.lists.push(start.is_some());
                Open::List
            }
            Tag::Item => {
                self.items.push(ListItem {
                    ordered: self.lists.last().copied().unwrap_or(false),
                    ..ListItem::default()
                });
                Open::Item
            }
            Tag::Emphasis => {
                self.inline.italic += 1;
                Open::Emphasis
            }
            Tag::Strong => {
                self.inline.bold += 1;
                Open::Strong
            }
            Tag::Strikethrough => {
                self.inline.strikethrough += 1;
                Open::Strikethrough
            }
            Tag::Link { dest_url, .. } => {
                self.inline.links.push(absolute_url(&dest_url));
                Open::Link
            }
            Tag::Image { dest_url, .. } => {
                let url = absolute_url(&dest_url);
                if url.is_some() {
                    self.image_depth += 1;
                }
                Open::Image(url)
            }
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        match open {
            Open::Leaf(leaf) => self.finish_leaf(leaf),
            Open::Quote => {
                self.flush_loose_text();
                self.quote_depth -= 1;
                if self.quote_depth == 0 {
                    let rich_text = limit_rich_text(std::mem::take(&mut self.quote));
                    self.place(Block::Quote {
                        quote: TextBlock {
                            rich_text,
                            children: Vec::new(),
                        },
                    });
                }
            }
            Open::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let text = code.text.trim_end_matches('\n');
                    self.place(Block::Code {
                        code: CodeBlock {
                            rich_text: limit_rich_text(vec![RichText::plain(text)]),
                            language: notion_language(&code.language).to_string(),
                        },
                    });
                }
            }
            Open::List => {
                self.lists.pop();
            }
            Open::Item => self.finish_item(),
            Open::Emphasis => self.inline.italic -= 1,
            Open::Strong => self.inline.bold -= 1,
            Open::Strikethrough => self.inline.strikethrough -= 1,
            Open::Link => {
                self.inline.links.pop();
            }
            Open::Image(Some(url)) => {
                self.image_depth -= 1;
                self.images.push(url);
            }
            Open::Image(None) | Open::Other => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(text);
        } else if self.image_depth == 0 {
            self.inline.push(text, false);
        }
    }

    /// Turns inline text outside any leaf (tight list items) into a paragraph.
    fn flush_loose_text(&mut self) {
        if !self.inline.runs.is_empty() {
            self.finish_leaf(Leaf::Paragraph);
        }
    }

    fn finish_leaf(&mut self, leaf: Leaf) {
        let runs = self.inline.take();
        let images = std::mem::take(&mut self.images);

        if self.quote_depth > 0 {
            self.append_to_quote(runs);
        } else if !runs.is_empty() {
            let into_item = matches!(leaf, Leaf::Paragraph)
                && self
                    .items
                    .last()
                    .is_some_and(|item| item.rich_text.is_empty() && item.children.is_empty());
            if into_item {
                if let Some(item) = self.items.last_mut() {
                    item.rich_text = limit_rich_text(runs);
                }
            } else {
                self.place(leaf_block(leaf, limit_rich_text(runs)));
            }
        }

        for url in images {
            self.place(Block::Image {
                image: ImageBlock::External {
                    external: ExternalFile { url },
                },
            });
        }
    }

    fn finish_item(&mut self) {
        self.flush_loose_text();
        let Some(mut item) = self.items.pop() else {
            return;
        };

        // Children of items at this depth or deeper become siblings in the parent.
        let flattened = if self.items.len() >= MAX_LIST_NESTING {
            std::mem::take(&mut item.children)
        } else {
            Vec::new()
        };

        let block = match item.checked {
            Some(checked) => Block::ToDo {
                to_do: ToDoBlock {
                    rich_text: item.rich_text,
                    checked,
                    children: item.children,
                },
            },
            None => {
                let body = TextBlock {
                    rich_text: item.rich_text,
                    children: item.children,
                };
                if item.ordered {
                    Block::NumberedListItem {
                        numbered_list_item: body,
                    }
                } else {
                    Block::BulletedListItem {
                        bulleted_list_item: body,
                    }
                }
            }
        };

        self.place(block);
        for child in flattened {
            self.place(child);
        }
    }

    /// Adds a finished block to the innermost open container.
    fn place(&mut self, block: Block) {
        if self.quote_depth > 0 {
            let runs = match &block {
                Block::Image {
                    image: ImageBlock::External { external },
                } => vec![RichText::styled(
                    external.url.clone(),
                    Annotations::default(),
                    Some(external.url.clone()),
                )],
                other => other.rich_text().to_vec(),
            };
            self.append_to_quote(runs);
        } else if let Some(item) = self.items.last_mut() {
            item.children.push(block);
        } else {
            self.blocks.push(block);
        }
    }

    fn append_to_quote(&mut self, runs: Vec<RichText>) {
        if runs.is_empty() {
            return;
        }
        if !self.quote.is_empty() {
            self.quote.push(RichText::plain("\n"));
        }
        self.quote.extend(runs);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_loose_text();
        for url in std::mem::take(&mut self.images) {
            self.place(Block::Image {
                image: ImageBlock::External {
                    external: ExternalFile { url },
                },
            });
        }
        self.blocks
    }
}

fn leaf_block(leaf: Leaf, rich_text: Vec<RichText>) -> Block {
    let body = TextBlock {
        rich_text,
        children: Vec::new(),
    };
    match leaf {
        Leaf::Paragraph => Block::Paragraph { paragraph: body },
        Leaf::Heading(1) => Block::Heading1 { heading_1: body },
        Leaf::Heading(2) => Block::Heading2 { heading_2: body },
        Leaf::Heading(_) => Block::Heading3 { heading_3: body },
    }
}

/// Notion rejects relative and malformed link targets.
fn absolute_url(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .filter(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .map(|_| url.to_string())
}

fn trim_trailing_newlines(runs: &mut Vec<RichText>) {
    while let Some(last) = runs.last_mut() {
        let trimmed = last.text.content.trim_end_matches('\n').len();
        if trimmed == 0 {
            runs.pop();
        } else {
            last.text.content.truncate(trimmed);
            break;
        }
    }
}

/// Maps a fenced code info string to a Notion code language.
fn notion_language(info: &str) -> &'static str {
    let lower = info.to_ascii_lowercase();
    let resolved = match lower.as_str() {
        "rs" => "rust",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "sh" | "zsh" | "console" => "shell",
        "yml" => "yaml",
        "cpp" | "cxx" => "c++",
        "cs" | "csharp" => "c#",
        "golang" => "go",
        "md" => "markdown",
        "dockerfile" => "docker",
        "patch" => "diff",
        "rb" => "ruby",
        "kt" => "kotlin",
        other => other,
    };
    NOTION_LANGUAGES
        .iter()
        .find(|language| **language == resolved)
        .copied()
        .unwrap_or("plain text")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_code_languages() {
        assert_eq!(notion_language("rs"), "rust");
        assert_eq!(notion_language("Python"), "python");
        assert_eq!(notion_language("toml"), "plain text");
        assert_eq!(notion_language(""), "plain text");
    }

    #[test]
    fn accepts_only_absolute_http_urls() {
        assert_eq!(
            absolute_url("https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(absolute_url("/relative/path"), None);
        assert_eq!(absolute_url("mailto:someone@example.com"), None);
    }

    #[test]
    fn trims_trailing_newlines_across_runs() {
        let mut runs = vec![RichText::plain("text\n"), RichText::plain("\n")];
        trim_trailing_newlines(&mut runs);
        assert_eq!(runs, vec![RichText::plain("text")]);
    }
}
