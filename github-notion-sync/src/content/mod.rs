//! Markdown to Notion content conversion.
//!
//! Both entry points are pure: they take GitHub-flavoured markdown and
//! return values ready to be serialized into a Notion request, already
//! split to respect Notion's text limits.

mod block;
mod markdown;

pub use block::{
    plain_text, Annotations, Block, CodeBlock, Empty, ExternalFile, ImageBlock, Link, RichText,
    TextBlock, TextContent, ToDoBlock,
};

use tracing::warn;

/// Longest text Notion accepts in a single rich text run, in UTF-16 units.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Most rich text runs Notion accepts in a single array.
pub const MAX_RICH_TEXT_RUNS: usize = 100;

/// Converts markdown into a list of Notion blocks.
#[must_use]
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    markdown::parse_blocks(markdown)
}

/// Converts markdown into a single rich text array, as used by comments.
///
/// Block structure is flattened into text: list items get bullet or number
/// prefixes, headings become bold and blocks are separated by blank lines.
#[must_use]
pub fn markdown_to_rich_text(markdown: &str) -> Vec<RichText> {
    let blocks = markdown::parse_blocks(markdown);
    let mut runs = Vec::new();
    flatten_blocks(&blocks, 0, &mut runs);
    limit_rich_text(runs)
}

fn flatten_blocks(blocks: &[Block], depth: usize, runs: &mut Vec<RichText>) {
    let indent = "  ".repeat(depth);
    let mut number = 0;
    let mut previous_was_item = false;

    for block in blocks {
        let is_item = matches!(
            block,
            Block::BulletedListItem { .. } | Block::NumberedListItem { .. } | Block::ToDo { .. }
        );
        if !runs.is_empty() {
            let separator = if depth > 0 || (is_item && previous_was_item) {
                "\n"
            } else {
                "\n\n"
            };
            runs.push(RichText::plain(separator));
        }
        number = if matches!(block, Block::NumberedListItem { .. }) {
            number + 1
        } else {
            0
        };

        let prefix = match block {
            Block::BulletedListItem { .. } => Some(format!("{indent}• ")),
            Block::NumberedListItem { .. } => Some(format!("{indent}{number}. ")),
            Block::ToDo { to_do } => Some(format!(
                "{indent}{} ",
                if to_do.checked { "☑" } else { "☐" }
            )),
            Block::Quote { .. } => Some("> ".to_string()),
            _ => None,
        };
        if let Some(prefix) = prefix {
            runs.push(RichText::plain(prefix));
        }

        match block {
            Block::Heading1 { .. } | Block::Heading2 { .. } | Block::Heading3 { .. } => {
                runs.extend(block.rich_text().iter().cloned().map(|mut run| {
                    run.annotations.bold = true;
                    run
                }));
            }
            Block::Code { code } => {
                runs.extend(code.rich_text.iter().cloned().map(|mut run| {
                    run.annotations.code = true;
                    run
                }));
            }
            Block::Image {
                image: ImageBlock::External { external },
            } => runs.push(RichText::styled(
                external.url.clone(),
                Annotations::default(),
                Some(external.url.clone()),
            )),
            Block::Divider { .. } => runs.push(RichText::plain("———")),
            _ => runs.extend(block.rich_text().iter().cloned()),
        }

        if !block.children().is_empty() {
            flatten_blocks(block.children(), depth + 1, runs);
        }
        previous_was_item = is_item;
    }
}

/// Fits a rich text array into Notion's limits.
///
/// Adjacent runs with equal formatting are merged and long runs are split.
/// If that still leaves too many runs the formatting is dropped so the text
/// survives; text beyond what fits even then is truncated.
pub(crate) fn limit_rich_text(runs: Vec<RichText>) -> Vec<RichText> {
    let merged = merge_runs(runs);
    let split: Vec<RichText> = merged.iter().flat_map(split_run).collect();
    if split.len() <= MAX_RICH_TEXT_RUNS {
        return split;
    }

    warn!(
        runs = split.len(),
        max = MAX_RICH_TEXT_RUNS,
        "Too many formatted text runs, dropping formatting"
    );
    let text = plain_text(&merged);
    let mut plain: Vec<RichText> = split_text(&text).into_iter().map(RichText::plain).collect();
    if plain.len() > MAX_RICH_TEXT_RUNS {
        warn!(
            chars = text.chars().count(),
            "Text exceeds what Notion accepts in one rich text array, truncating"
        );
        plain.truncate(MAX_RICH_TEXT_RUNS);
    }
    plain
}

fn merge_runs(runs: Vec<RichText>) -> Vec<RichText> {
    let mut merged: Vec<RichText> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.content.is_empty() {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            if last.annotations == run.annotations && last.text.link == run.text.link {
                last.text.content.push_str(&run.text.content);
                continue;
            }
        }
        merged.push(run);
    }
    merged
}

fn split_run(run: &RichText) -> Vec<RichText> {
    split_text(&run.text.content)
        .into_iter()
        .map(|content| RichText {
            text: TextContent {
                content,
                link: run.text.link.clone(),
            },
            annotations: run.annotations,
        })
        .collect()
}

/// Splits text into pieces of at most [`MAX_TEXT_LENGTH`] UTF-16 units.
fn split_text(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut units = 0;
    for c in text.chars() {
        if units + c.len_utf16() > MAX_TEXT_LENGTH {
            pieces.push(std::mem::take(&mut current));
            units = 0;
        }
        units += c.len_utf16();
        current.push(c);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
