//! Page body construction
//!
//! File content becomes a flat list of paragraph blocks. Only the head of a
//! file is published: the caps below keep requests inside Notion's limits.

use serde::Serialize;

/// Lines of content considered for a page
pub const MAX_LINES: usize = 50;

/// Characters kept per paragraph
pub const MAX_LINE_CHARS: usize = 2000;

/// Children accepted by a single page creation request
pub const MAX_BLOCKS: usize = 100;

/// A Notion block object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    object: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    paragraph: Paragraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Paragraph {
    rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RichText {
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TextContent {
    content: String,
}

impl TextContent {
    pub(crate) fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl RichText {
    fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: TextContent::new(content),
        }
    }
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: "paragraph",
            paragraph: Paragraph {
                rich_text: vec![RichText::plain(text)],
            },
        }
    }

    /// Text of the block's first rich text run
    pub fn text(&self) -> &str {
        self.paragraph
            .rich_text
            .first()
            .map(|t| t.text.content.as_str())
            .unwrap_or("")
    }
}

/// Convert raw content into paragraph blocks.
///
/// Takes the first [`MAX_LINES`] lines, skips blank ones, cuts each
/// remaining line to [`MAX_LINE_CHARS`] characters and caps the result at
/// [`MAX_BLOCKS`].
pub fn paragraph_blocks(content: &str) -> Vec<Block> {
    content
        .split('\n')
        .take(MAX_LINES)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| Block::paragraph(truncate_chars(line, MAX_LINE_CHARS)))
        .take(MAX_BLOCKS)
        .collect()
}

fn truncate_chars(line: &str, max: usize) -> &str {
    match line.char_indices().nth(max) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_cap_applies_before_block_cap() {
        let content: String = (1..=120).map(|i| format!("line {}\n", i)).collect();
        let blocks = paragraph_blocks(&content);

        assert_eq!(blocks.len(), 50);
        assert_eq!(blocks[0].text(), "line 1");
        assert_eq!(blocks[49].text(), "line 50");
    }

    #[test]
    fn test_blank_lines_produce_no_blocks() {
        let blocks = paragraph_blocks("first\n\n   \n\tsecond\r\n\r\nthird");
        let texts: Vec<_> = blocks.iter().map(Block::text).collect();

        assert_eq!(texts, vec!["first", "\tsecond", "third"]);
    }

    #[test]
    fn test_blank_lines_count_toward_line_cap() {
        let mut content = "\n".repeat(49);
        content.push_str("kept\ndropped\n");
        let blocks = paragraph_blocks(&content);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "kept");
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let line = "x".repeat(2500);
        let blocks = paragraph_blocks(&line);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text().chars().count(), 2000);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let line = "é".repeat(2001);
        let blocks = paragraph_blocks(&line);

        assert_eq!(blocks[0].text().chars().count(), 2000);
        assert!(blocks[0].text().chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_empty_content() {
        assert!(paragraph_blocks("").is_empty());
    }

    #[test]
    fn test_block_json_shape() {
        let value = serde_json::to_value(Block::paragraph("hello")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{"type": "text", "text": {"content": "hello"}}]
                }
            })
        );
    }
}
