//! Block-level scanner: one left-to-right pass over the source lines,
//! producing a tagged block tree with explicit boundaries.

use super::inline::{self, Inline};
use super::ParseWarning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        inlines: Vec<Inline>,
    },
    Code(CodeBlock),
    Table {
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Blockquote {
        lines: Vec<Vec<Inline>>,
    },
    Rule,
    Callout {
        kind: CalloutKind,
        lines: Vec<Vec<Inline>>,
    },
    Paragraph {
        inlines: Vec<Inline>,
    },
}

/// One fenced code block. Line numbers are 1-based and inclusive, covering
/// the fence lines themselves; content occupies `start_line+1..end_line-1`
/// when the block was properly closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub lines: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

impl CodeBlock {
    /// 1-based source line of the first content line.
    pub fn content_start_line(&self) -> usize {
        self.start_line + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub level: usize,
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    Exercise,
    Example,
    Tip,
    Warning,
}

impl CalloutKind {
    pub fn label(&self) -> &'static str {
        match self {
            CalloutKind::Exercise => "Exercise",
            CalloutKind::Example => "Example",
            CalloutKind::Tip => "Tip",
            CalloutKind::Warning => "Warning",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            CalloutKind::Exercise => "callout-exercise",
            CalloutKind::Example => "callout-example",
            CalloutKind::Tip => "callout-tip",
            CalloutKind::Warning => "callout-warning",
        }
    }
}

/// Scan the full text into blocks. Never fails: anything unrecognized
/// falls through to paragraph grouping, and recoverable anomalies are
/// reported through `warnings`.
pub fn scan(text: &str, warnings: &mut Vec<ParseWarning>) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        if is_fence(trimmed) {
            i = scan_code_block(&lines, i, &mut blocks, warnings);
            continue;
        }

        if let Some((level, rest)) = heading_prefix(trimmed) {
            blocks.push(Block::Heading {
                level,
                inlines: inline::parse(rest),
            });
            i += 1;
            continue;
        }

        if is_rule(trimmed) {
            blocks.push(Block::Rule);
            i += 1;
            continue;
        }

        if is_table_row(trimmed) && i + 1 < lines.len() && is_table_separator(lines[i + 1].trim()) {
            i = scan_table(&lines, i, &mut blocks);
            continue;
        }

        if trimmed.starts_with('>') {
            i = scan_blockquote(&lines, i, &mut blocks);
            continue;
        }

        if let Some(kind) = callout_kind(trimmed) {
            i = scan_callout(&lines, i, kind, &mut blocks);
            continue;
        }

        if list_marker(line).is_some() {
            i = scan_list(&lines, i, &mut blocks);
            continue;
        }

        i = scan_paragraph(&lines, i, &mut blocks);
    }

    blocks
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```")
}

fn scan_code_block(
    lines: &[&str],
    start: usize,
    blocks: &mut Vec<Block>,
    warnings: &mut Vec<ParseWarning>,
) -> usize {
    let opener = lines[start].trim();
    let tag = opener.trim_start_matches('`').trim();
    let language = if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    };

    let mut content = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        if is_fence(lines[i].trim()) {
            blocks.push(Block::Code(CodeBlock {
                language,
                lines: content,
                start_line: start + 1,
                end_line: i + 1,
            }));
            return i + 1;
        }
        content.push(lines[i].to_string());
        i += 1;
    }

    // Unclosed fence: recover the block rather than dropping it.
    warnings.push(ParseWarning {
        line: start + 1,
        message: String::from("unclosed code fence, auto-closed at end of input"),
    });
    blocks.push(Block::Code(CodeBlock {
        language,
        lines: content,
        start_line: start + 1,
        end_line: lines.len(),
    }));
    lines.len()
}

fn heading_prefix(trimmed: &str) -> Option<(u8, &str)> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = &trimmed[hashes..];
        if rest.starts_with(' ') {
            return Some((hashes as u8, rest.trim()));
        }
    }
    None
}

fn is_rule(trimmed: &str) -> bool {
    let marker = match trimmed.chars().next() {
        Some(c @ ('*' | '-' | '_')) => c,
        _ => return false,
    };
    let mut count = 0;
    for c in trimmed.chars() {
        if c == marker {
            count += 1;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    count >= 3
}

fn is_table_row(trimmed: &str) -> bool {
    trimmed.contains('|')
}

fn is_table_separator(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn split_table_row(trimmed: &str) -> Vec<Vec<Inline>> {
    trimmed
        .trim_matches('|')
        .split('|')
        .map(|cell| inline::parse(cell.trim()))
        .collect()
}

fn scan_table(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let header = split_table_row(lines[start].trim());
    let mut rows = Vec::new();
    let mut i = start + 2; // skip the separator row
    while i < lines.len() && is_table_row(lines[i].trim()) && !lines[i].trim().is_empty() {
        rows.push(split_table_row(lines[i].trim()));
        i += 1;
    }
    blocks.push(Block::Table { header, rows });
    i
}

fn scan_blockquote(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let mut quoted = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if let Some(rest) = trimmed.strip_prefix('>') {
            quoted.push(inline::parse(rest.strip_prefix(' ').unwrap_or(rest)));
            i += 1;
        } else {
            break;
        }
    }
    blocks.push(Block::Blockquote { lines: quoted });
    i
}

/// Callout openers: a `Kind:` keyword, optionally preceded by emoji or
/// other symbol decoration as the chapters use (`📝 Exercise: ...`).
/// A list bullet is not decoration: `* Exercise: ...` stays a list item.
fn callout_kind(trimmed: &str) -> Option<CalloutKind> {
    if list_marker(trimmed).is_some() {
        return None;
    }
    let text = trimmed.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    for (prefix, kind) in [
        ("Exercise:", CalloutKind::Exercise),
        ("Example:", CalloutKind::Example),
        ("Tip:", CalloutKind::Tip),
        ("Warning:", CalloutKind::Warning),
    ] {
        if text.starts_with(prefix) {
            return Some(kind);
        }
    }
    None
}

fn scan_callout(
    lines: &[&str],
    start: usize,
    kind: CalloutKind,
    blocks: &mut Vec<Block>,
) -> usize {
    let first = lines[start].trim();
    let text = first.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    let body = text
        .splitn(2, ':')
        .nth(1)
        .map(str::trim)
        .unwrap_or_default();

    let mut content = Vec::new();
    if !body.is_empty() {
        content.push(inline::parse(body));
    }

    // The box runs to the next block boundary.
    let mut i = start + 1;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty()
            || is_fence(trimmed)
            || heading_prefix(trimmed).is_some()
            || is_rule(trimmed)
            || trimmed.starts_with('>')
            || callout_kind(trimmed).is_some()
            || list_marker(lines[i]).is_some()
        {
            break;
        }
        content.push(inline::parse(trimmed));
        i += 1;
    }

    blocks.push(Block::Callout {
        kind,
        lines: content,
    });
    i
}

/// Returns (indent level, ordered, item text) for a list-item line.
fn list_marker(line: &str) -> Option<(usize, bool, &str)> {
    let indent = line.len() - line.trim_start().len();
    let level = indent / 2;
    let trimmed = line.trim_start();

    for marker in ["* ", "- ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Some((level, false, rest.trim()));
        }
    }

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix(". ") {
            return Some((level, true, rest.trim()));
        }
    }

    None
}

fn scan_list(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let Some((_, ordered, _)) = list_marker(lines[start]) else {
        return start + 1;
    };
    let mut items = Vec::new();
    let mut i = start;

    while i < lines.len() {
        match list_marker(lines[i]) {
            Some((level, item_ordered, text)) if item_ordered == ordered => {
                items.push(ListItem {
                    level,
                    inlines: inline::parse(text),
                });
                i += 1;
            }
            _ => break,
        }
    }

    blocks.push(Block::List { ordered, items });
    i
}

fn scan_paragraph(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let mut parts = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty()
            || is_fence(trimmed)
            || heading_prefix(trimmed).is_some()
            || is_rule(trimmed)
            || trimmed.starts_with('>')
            || callout_kind(trimmed).is_some()
            || list_marker(lines[i]).is_some()
            || (is_table_row(trimmed)
                && i + 1 < lines.len()
                && is_table_separator(lines[i + 1].trim()))
        {
            break;
        }
        parts.push(trimmed);
        i += 1;
    }

    if !parts.is_empty() {
        blocks.push(Block::Paragraph {
            inlines: inline::parse(&parts.join(" ")),
        });
    } else {
        // Defensive: never loop without consuming a line.
        i += 1;
    }

    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_ok(text: &str) -> Vec<Block> {
        let mut warnings = Vec::new();
        let blocks = scan(text, &mut warnings);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        blocks
    }

    #[test]
    fn test_heading_levels() {
        let blocks = scan_ok("# One\n\n### Three");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], Block::Heading { level: 3, .. }));
    }

    #[test]
    fn test_fence_pairing_and_line_span() {
        let text = "intro\n\n```assembly\nmov eax, 1\nret\n```\ntail";
        let blocks = scan_ok(text);
        let code = blocks
            .iter()
            .find_map(|b| match b {
                Block::Code(c) => Some(c),
                _ => None,
            })
            .expect("code block");
        assert_eq!(code.language.as_deref(), Some("assembly"));
        assert_eq!(code.lines, vec!["mov eax, 1", "ret"]);
        assert_eq!(code.start_line, 3);
        assert_eq!(code.end_line, 6);
    }

    #[test]
    fn test_block_count_matches_fence_pairs() {
        let text = "```\na\n```\n\n```asm\nb\n```\n";
        let blocks = scan_ok(text);
        let count = blocks
            .iter()
            .filter(|b| matches!(b, Block::Code(_)))
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_unclosed_fence_recovered_with_warning() {
        let mut warnings = Vec::new();
        let blocks = scan("```assembly\nmov eax, 1", &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("unclosed"));
        match &blocks[0] {
            Block::Code(c) => {
                assert_eq!(c.lines, vec!["mov eax, 1"]);
                assert_eq!(c.end_line, 2);
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_table_discards_separator_row() {
        let blocks = scan_ok("| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |");
        match &blocks[0] {
            Block::Table { header, rows } => {
                assert_eq!(header.len(), 2);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_list_grouping_and_indent() {
        let blocks = scan_ok("* one\n* two\n  * nested\n\n1. first\n2. second");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(items.len(), 3);
                assert_eq!(items[2].level, 1);
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert!(matches!(blocks[1], Block::List { ordered: true, .. }));
    }

    #[test]
    fn test_blockquote_grouping() {
        let blocks = scan_ok("> first\n> second\n\nplain");
        match &blocks[0] {
            Block::Blockquote { lines } => assert_eq!(lines.len(), 2),
            other => panic!("expected blockquote, got {:?}", other),
        }
        assert!(matches!(blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_rule_detection() {
        let blocks = scan_ok("---\n\n***\n\n_ _ _");
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| matches!(b, Block::Rule)));
    }

    #[test]
    fn test_callout_runs_to_block_boundary() {
        let blocks = scan_ok("💡 Tip: keep registers zeroed\nwith xor\n\nnext paragraph");
        match &blocks[0] {
            Block::Callout { kind, lines } => {
                assert_eq!(*kind, CalloutKind::Tip);
                assert_eq!(lines.len(), 2);
            }
            other => panic!("expected callout, got {:?}", other),
        }
        assert!(matches!(blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_list_item_with_callout_keyword_stays_a_list() {
        let blocks = scan_ok("* Exercise: try this\n* Tip: or this");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
        // Without the bullet the same line is still a callout.
        assert!(matches!(
            scan_ok("Exercise: try this")[0],
            Block::Callout {
                kind: CalloutKind::Exercise,
                ..
            }
        ));
    }

    #[test]
    fn test_list_marker_inside_fence_stays_code() {
        let blocks = scan_ok("```\n* not a list\n```");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Code(_)));
    }
}
