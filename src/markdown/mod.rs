//! Markdown pipeline for book chapters: a block tree built in one scan,
//! rendered to HTML or to styled terminal lines (see `ui::reader`).

pub mod block;
pub mod html;
pub mod inline;

pub use block::{Block, CalloutKind, CodeBlock, ListItem};
pub use inline::Inline;

/// A recoverable anomaly found while parsing, with a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A parsed chapter: the block tree plus any warnings collected on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub warnings: Vec<ParseWarning>,
}

impl Document {
    /// First level-1 heading, if the chapter has one.
    pub fn title(&self) -> Option<String> {
        self.blocks.iter().find_map(|b| match b {
            Block::Heading { level: 1, inlines } => Some(inline::plain_text(inlines)),
            _ => None,
        })
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Code(c) => Some(c),
            _ => None,
        })
    }
}

/// Parse chapter text. Never fails: malformed input degrades to best-effort
/// blocks with warnings attached.
pub fn parse(text: &str) -> Document {
    let mut warnings = Vec::new();
    let blocks = block::scan(text, &mut warnings);
    Document { blocks, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_twice_is_identical() {
        let text = "# One\n\ntext **here**\n\n```assembly\nmov eax, 1\n```\n\n* a\n* b";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn test_document_title() {
        let doc = parse("intro text\n\n# Real Title\n\n## Sub");
        assert_eq!(doc.title().as_deref(), Some("Real Title"));
        assert_eq!(parse("no headings at all").title(), None);
    }

    #[test]
    fn test_code_blocks_iterator() {
        let doc = parse("```a\nx\n```\n\n```b\ny\n```");
        let langs: Vec<_> = doc
            .code_blocks()
            .filter_map(|c| c.language.clone())
            .collect();
        assert_eq!(langs, vec!["a", "b"]);
    }
}
