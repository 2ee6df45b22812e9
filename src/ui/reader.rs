//! Chapter composition and rendering. `compose` turns a parsed chapter
//! into owned styled lines once per chapter/resize/selection change, and
//! records where every mnemonic token and code block landed so key
//! handling can cycle references and copy blocks without re-walking the
//! document.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Mode};
use crate::fasm_lang;
use crate::highlight::{self, TokenType};
use crate::markdown::block::ListItem;
use crate::markdown::{self, Document, Inline};
use crate::theme::Theme;

const CODE_PREFIX: &str = "\u{2502} ";

/// A mnemonic token's position in the composed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnemonicRef {
    pub line: usize,
    pub col: u16,
    pub width: u16,
    pub mnemonic: String,
}

/// A code block's span in the composed lines, with its raw text for the
/// clipboard action and its source fence line for highlight anchoring.
#[derive(Debug, Clone)]
pub struct CodeSpan {
    pub first_line: usize,
    pub last_line: usize,
    pub source_line: usize,
    pub text: String,
}

#[derive(Default)]
pub struct Composed {
    pub lines: Vec<Line<'static>>,
    pub refs: Vec<MnemonicRef>,
    pub code_spans: Vec<CodeSpan>,
}

pub fn compose(
    doc: &Document,
    theme: &Theme,
    width: u16,
    selected: Option<usize>,
    show_warnings: bool,
    highlights: &[usize],
) -> Composed {
    let width = width.max(20) as usize;
    let mut out = Composed::default();

    for block in &doc.blocks {
        if !out.lines.is_empty() {
            out.lines.push(Line::from(""));
        }
        compose_block(block, theme, width, selected, highlights, &mut out);
    }

    if show_warnings && !doc.warnings.is_empty() {
        out.lines.push(Line::from(""));
        let style = Style::default().fg(theme.ui.quote.to_color());
        for warning in &doc.warnings {
            out.lines
                .push(Line::from(Span::styled(format!("\u{26a0} {}", warning), style)));
        }
    }

    out
}

fn compose_block(
    block: &markdown::Block,
    theme: &Theme,
    width: usize,
    selected: Option<usize>,
    highlights: &[usize],
    out: &mut Composed,
) {
    match block {
        markdown::Block::Heading { level, inlines } => {
            let text = markdown::inline::plain_text(inlines);
            let mut style = Style::default()
                .fg(theme.ui.heading.to_color())
                .add_modifier(Modifier::BOLD);
            if *level == 1 {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            let indent = "  ".repeat(level.saturating_sub(2) as usize);
            out.lines
                .push(Line::from(Span::styled(format!("{}{}", indent, text), style)));
        }
        markdown::Block::Code(code) => {
            let marked = highlights.contains(&code.start_line);
            compose_code(code, theme, width, selected, marked, out)
        }
        markdown::Block::Table { header, rows } => compose_table(header, rows, theme, out),
        markdown::Block::List { ordered, items } => {
            compose_list(*ordered, items, theme, width, out)
        }
        markdown::Block::Blockquote { lines } => {
            let style = Style::default()
                .fg(theme.ui.quote.to_color())
                .add_modifier(Modifier::ITALIC);
            for line in lines {
                let words = vec![Span::styled(markdown::inline::plain_text(line), style)];
                for wrapped in wrap_words(split_words(words), width.saturating_sub(2)) {
                    let mut spans = vec![Span::styled("\u{2503} ", style)];
                    spans.extend(wrapped);
                    out.lines.push(Line::from(spans));
                }
            }
        }
        markdown::Block::Rule => {
            out.lines.push(Line::from(Span::styled(
                "\u{2500}".repeat(width),
                Style::default().fg(theme.ui.border.to_color()),
            )));
        }
        markdown::Block::Callout { kind, lines } => {
            let color = match kind {
                markdown::CalloutKind::Exercise => theme.ui.callout_exercise.to_color(),
                markdown::CalloutKind::Example => theme.ui.callout_example.to_color(),
                markdown::CalloutKind::Tip => theme.ui.callout_tip.to_color(),
                markdown::CalloutKind::Warning => theme.ui.callout_warning.to_color(),
            };
            out.lines.push(Line::from(Span::styled(
                format!("\u{25cf} {}", kind.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in lines {
                for wrapped in wrap_words(inline_words(line, theme), width.saturating_sub(2)) {
                    let mut spans = vec![Span::raw("  ")];
                    spans.extend(wrapped);
                    out.lines.push(Line::from(spans));
                }
            }
        }
        markdown::Block::Paragraph { inlines } => {
            for wrapped in wrap_words(inline_words(inlines, theme), width) {
                out.lines.push(Line::from(wrapped));
            }
        }
    }
}

fn compose_code(
    code: &markdown::CodeBlock,
    theme: &Theme,
    width: usize,
    selected: Option<usize>,
    marked: bool,
    out: &mut Composed,
) {
    let border = if marked {
        Style::default().fg(theme.ui.search_match.to_color())
    } else {
        Style::default().fg(theme.ui.border.to_color())
    };
    let lang = code.language.as_deref().unwrap_or("text");
    let header = if marked {
        format!("\u{250c}\u{2500} {} \u{2605} ", lang)
    } else {
        format!("\u{250c}\u{2500} {} ", lang)
    };
    let fill = width.saturating_sub(header.chars().count());
    out.lines.push(Line::from(Span::styled(
        format!("{}{}", header, "\u{2500}".repeat(fill)),
        border,
    )));

    let first_line = out.lines.len();
    let is_assembly = code
        .language
        .as_deref()
        .is_some_and(fasm_lang::is_assembly_language);

    for raw in &code.lines {
        let mut spans = vec![Span::styled(CODE_PREFIX, border)];
        if is_assembly {
            let mut col = CODE_PREFIX.chars().count() as u16;
            for token in highlight::tokenize_line(raw) {
                let token_width = token.text.chars().count() as u16;
                let mut style = Style::default().fg(token_color(token.token_type, theme));
                if token.token_type == TokenType::Mnemonic {
                    if selected == Some(out.refs.len()) {
                        style = style
                            .bg(theme.ui.selection.to_color())
                            .add_modifier(Modifier::BOLD);
                    }
                    out.refs.push(MnemonicRef {
                        line: out.lines.len(),
                        col,
                        width: token_width,
                        mnemonic: token.text.to_ascii_uppercase(),
                    });
                }
                spans.push(Span::styled(token.text, style));
                col += token_width;
            }
        } else {
            spans.push(Span::styled(
                raw.clone(),
                Style::default().fg(theme.ui.foreground.to_color()),
            ));
        }
        out.lines.push(Line::from(spans));
    }

    out.code_spans.push(CodeSpan {
        first_line,
        last_line: out.lines.len().saturating_sub(1),
        source_line: code.start_line,
        text: code.lines.join("\n"),
    });

    out.lines.push(Line::from(Span::styled(
        format!("\u{2514}{}", "\u{2500}".repeat(width.saturating_sub(1))),
        border,
    )));
}

fn token_color(token_type: TokenType, theme: &Theme) -> Color {
    match token_type {
        TokenType::Mnemonic => theme.syntax.mnemonic.to_color(),
        TokenType::Register => theme.syntax.register.to_color(),
        TokenType::Directive => theme.syntax.directive.to_color(),
        TokenType::Number => theme.syntax.number.to_color(),
        TokenType::String => theme.syntax.string.to_color(),
        TokenType::Comment => theme.syntax.comment.to_color(),
        TokenType::Label => theme.syntax.label.to_color(),
        TokenType::Operator | TokenType::Plain => theme.syntax.operator.to_color(),
    }
}

fn compose_table(
    header: &[Vec<Inline>],
    rows: &[Vec<Vec<Inline>>],
    theme: &Theme,
    out: &mut Composed,
) {
    let cell = |inlines: &[Inline]| markdown::inline::plain_text(inlines);
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|c| cell(c).chars().count()).collect();
    for row in rows {
        for (i, c) in row.iter().enumerate().take(columns) {
            let w = cell(c).chars().count();
            if w > widths[i] {
                widths[i] = w;
            }
        }
    }

    let join = |cells: Vec<String>, style: Style| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect();
        Line::from(Span::styled(padded.join(" \u{2502} "), style))
    };

    out.lines.push(join(
        header.iter().map(|c| cell(c)).collect(),
        Style::default()
            .fg(theme.ui.foreground.to_color())
            .add_modifier(Modifier::BOLD),
    ));
    let rule_width = widths.iter().sum::<usize>() + 3 * columns.saturating_sub(1);
    out.lines.push(Line::from(Span::styled(
        "\u{2500}".repeat(rule_width),
        Style::default().fg(theme.ui.border.to_color()),
    )));
    for row in rows {
        out.lines.push(join(
            row.iter().map(|c| cell(c)).collect(),
            Style::default().fg(theme.ui.foreground.to_color()),
        ));
    }
}

fn compose_list(
    ordered: bool,
    items: &[ListItem],
    theme: &Theme,
    width: usize,
    out: &mut Composed,
) {
    // One counter per nesting level; deeper levels reset on pop.
    let mut counters: Vec<usize> = Vec::new();
    for item in items {
        counters.truncate(item.level + 1);
        while counters.len() <= item.level {
            counters.push(0);
        }
        counters[item.level] += 1;

        let indent = "  ".repeat(item.level);
        let marker = if ordered {
            format!("{}{}. ", indent, counters[item.level])
        } else {
            format!("{}\u{2022} ", indent)
        };
        let marker_width = marker.chars().count();

        let mut first = true;
        for wrapped in wrap_words(
            inline_words(&item.inlines, theme),
            width.saturating_sub(marker_width),
        ) {
            let lead = if first {
                marker.clone()
            } else {
                " ".repeat(marker_width)
            };
            first = false;
            let mut spans = vec![Span::styled(
                lead,
                Style::default().fg(theme.ui.foreground.to_color()),
            )];
            spans.extend(wrapped);
            out.lines.push(Line::from(spans));
        }
        if first {
            // Empty item still renders its marker.
            out.lines.push(Line::from(Span::raw(marker)));
        }
    }
}

fn inline_words(inlines: &[Inline], theme: &Theme) -> Vec<Span<'static>> {
    let mut words = Vec::new();
    for inline in inlines {
        let (text, style) = match inline {
            Inline::Text(t) => (t.clone(), Style::default().fg(theme.ui.foreground.to_color())),
            Inline::Code(t) => (t.clone(), Style::default().fg(theme.ui.inline_code.to_color())),
            Inline::Bold(t) => (
                t.clone(),
                Style::default()
                    .fg(theme.ui.emphasis.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Inline::Italic(t) => (
                t.clone(),
                Style::default()
                    .fg(theme.ui.emphasis.to_color())
                    .add_modifier(Modifier::ITALIC),
            ),
            Inline::Strike(t) => (
                t.clone(),
                Style::default()
                    .fg(theme.ui.quote.to_color())
                    .add_modifier(Modifier::CROSSED_OUT),
            ),
            Inline::Link { text, .. } => (
                text.clone(),
                Style::default()
                    .fg(theme.ui.link.to_color())
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Inline::Image { alt, .. } => (
                format!("[{}]", alt),
                Style::default().fg(theme.ui.link.to_color()),
            ),
        };
        for word in text.split_whitespace() {
            words.push(Span::styled(word.to_string(), style));
        }
    }
    words
}

fn split_words(spans: Vec<Span<'static>>) -> Vec<Span<'static>> {
    let mut words = Vec::new();
    for span in spans {
        let style = span.style;
        for word in span.content.split_whitespace() {
            words.push(Span::styled(word.to_string(), style));
        }
    }
    words
}

/// Greedy word wrap over pre-styled words. Words wider than the width get
/// a line of their own rather than being split.
fn wrap_words(words: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for word in words {
        let word_width = word.content.chars().count();
        if !current.is_empty() && current_width + 1 + word_width > width {
            lines.push(Line::from(std::mem::take(&mut current)));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(Span::raw(" "));
            current_width += 1;
        }
        current_width += word_width;
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.mode == Mode::Reading && !app.show_toc;

    let border_color = if focused {
        theme.ui.border_focused.to_color()
    } else {
        theme.ui.border.to_color()
    };
    let title_color = if focused {
        theme.ui.title_focused.to_color()
    } else {
        theme.ui.title.to_color()
    };

    let chapter = app.chapter();
    let title = format!(
        " {} ({}/{}) ",
        chapter.title,
        app.chapter_index + 1,
        app.book.chapters.len()
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(Style::default().fg(title_color))
        .style(Style::default().bg(theme.ui.background.to_color()));

    let paragraph = Paragraph::new(app.composed.lines.clone())
        .block(block)
        .scroll((app.scroll as u16, 0));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose_text(text: &str) -> Composed {
        compose(&markdown::parse(text), &Theme::dark(), 80, None, true, &[])
    }

    #[test]
    fn test_refs_point_at_mnemonic_columns() {
        let composed = compose_text("```assembly\nmov eax, 1\ncall exit\n```");
        assert_eq!(composed.refs.len(), 2);
        assert_eq!(composed.refs[0].mnemonic, "MOV");
        // Content starts after the "│ " gutter.
        assert_eq!(composed.refs[0].col, 2);
        assert_eq!(composed.refs[1].mnemonic, "CALL");
        assert_eq!(composed.refs[1].line, composed.refs[0].line + 1);
    }

    #[test]
    fn test_code_span_carries_raw_text() {
        let composed = compose_text("```assembly\nmov eax, 1\nret\n```");
        assert_eq!(composed.code_spans.len(), 1);
        assert_eq!(composed.code_spans[0].text, "mov eax, 1\nret");
        let span = &composed.code_spans[0];
        assert_eq!(span.last_line - span.first_line + 1, 2);
        assert_eq!(span.source_line, 1);
    }

    #[test]
    fn test_highlighted_block_changes_border() {
        let doc = markdown::parse("```assembly\nmov eax, 1\n```");
        let theme = Theme::dark();
        let plain = compose(&doc, &theme, 80, None, true, &[]);
        let marked = compose(&doc, &theme, 80, None, true, &[1]);

        let fence_style = |c: &Composed| c.lines[0].spans[0].style.fg;
        assert_eq!(fence_style(&plain), Some(theme.ui.border.to_color()));
        assert_eq!(
            fence_style(&marked),
            Some(theme.ui.search_match.to_color())
        );
        // The anchor is the source line; a mark elsewhere changes nothing.
        let other = compose(&doc, &theme, 80, None, true, &[9]);
        assert_eq!(fence_style(&other), Some(theme.ui.border.to_color()));
    }

    #[test]
    fn test_non_assembly_code_has_no_refs() {
        let composed = compose_text("```python\nmov = 1\n```");
        assert!(composed.refs.is_empty());
        assert_eq!(composed.code_spans.len(), 1);
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let text = "word ".repeat(60);
        let composed = compose_text(text.trim());
        assert!(composed.lines.len() > 1);
        for line in &composed.lines {
            assert!(line.width() <= 80);
        }
    }

    #[test]
    fn test_warnings_appended_when_enabled() {
        let composed = compose_text("```assembly\nmov eax, 1");
        let last = composed.lines.last().unwrap();
        let text: String = last.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("unclosed code fence"));

        let quiet = compose(
            &markdown::parse("```assembly\nmov eax, 1"),
            &Theme::dark(),
            80,
            None,
            false,
            &[],
        );
        let text: String = quiet
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .map(|s| s.content.as_ref())
            .collect();
        assert!(!text.contains("unclosed"));
    }

    #[test]
    fn test_ordered_list_numbering_resets_per_level() {
        let composed = compose_text("1. a\n2. b\n  1. b1\n3. c");
        let texts: Vec<String> = composed
            .lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(texts.iter().any(|t| t.starts_with("1. a")));
        assert!(texts.iter().any(|t| t.starts_with("  1. b1")));
        assert!(texts.iter().any(|t| t.starts_with("3. c")));
    }
}
