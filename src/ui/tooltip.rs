//! Instruction tooltip popup, anchored at the selected mnemonic token.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::TooltipState;
use crate::glossary::{Glossary, InstructionRecord};
use crate::theme::Theme;

const MIN_WIDTH: u16 = 30;
const MAX_WIDTH: u16 = 60;
const MAX_HEIGHT: u16 = 18;

/// Place a popup of `size` near `anchor` without leaving `viewport`:
/// below the anchor when there is room, otherwise above, otherwise
/// clamped to the top. Horizontal overflow slides left.
pub fn position(anchor: (u16, u16), size: (u16, u16), viewport: Rect) -> Rect {
    let (width, height) = (
        size.0.min(viewport.width),
        size.1.min(viewport.height),
    );
    let (anchor_x, anchor_y) = anchor;

    let x = if anchor_x + width <= viewport.right() {
        anchor_x
    } else {
        viewport.right().saturating_sub(width)
    }
    .max(viewport.x);

    let below = anchor_y + 1;
    let y = if below + height <= viewport.bottom() {
        below
    } else if anchor_y >= viewport.y + height {
        anchor_y - height
    } else {
        viewport.y
    };

    Rect::new(x, y, width, height)
}

pub fn render(
    frame: &mut Frame,
    state: &TooltipState,
    anchor: (u16, u16),
    glossary: &Glossary,
    theme: &Theme,
) {
    let area = frame.area();

    // A tooltip only opens for a mnemonic the glossary resolves.
    let Some(record) = glossary.lookup(&state.mnemonic) else {
        return;
    };
    let lines = record_lines(record, state, glossary, theme);

    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(20) as u16;
    let width = (content_width + 4).clamp(MIN_WIDTH, MAX_WIDTH);
    let height = (lines.len() as u16 + 2).min(MAX_HEIGHT);
    let popup_area = position(anchor, (width, height), area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.ui.border_focused.to_color()))
        .title(" Instruction ")
        .title_style(Style::default().fg(theme.ui.foreground.to_color()))
        .style(Style::default().bg(theme.ui.background.to_color()));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll as u16, 0));

    frame.render_widget(paragraph, popup_area);
}

fn record_lines(
    record: &InstructionRecord,
    state: &TooltipState,
    glossary: &Glossary,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let fg = Style::default().fg(theme.ui.foreground.to_color());
    let dim = Style::default().fg(theme.ui.quote.to_color());
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        record.syntax.clone(),
        Style::default()
            .fg(theme.syntax.mnemonic.to_color())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "{} \u{00b7} {} \u{00b7} flags: {}",
            record.category,
            record.difficulty,
            if record.flags.is_empty() {
                "none"
            } else {
                &record.flags
            }
        ),
        dim,
    )));
    lines.push(Line::from(""));

    for chunk in wrap_text(&record.description, 50) {
        lines.push(Line::from(Span::styled(chunk, fg)));
    }
    if !record.notes.is_empty() {
        lines.push(Line::from(""));
        for chunk in wrap_text(&record.notes, 50) {
            lines.push(Line::from(Span::styled(chunk, dim)));
        }
    }

    if let Some(example) = record.examples.first() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Example:",
            fg.add_modifier(Modifier::BOLD),
        )));
        for example_line in example.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", example_line),
                Style::default().fg(theme.syntax.comment.to_color()),
            )));
        }
    }

    if !state.related.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Related: ", fg.add_modifier(Modifier::BOLD)),
            Span::styled(
                state.related.join(", "),
                Style::default().fg(theme.ui.link.to_color()),
            ),
        ]));
    }

    let count = glossary.usage_count(&record.mnemonic);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Seen {} time{} in this book",
            count,
            if count == 1 { "" } else { "s" }
        ),
        dim,
    )));
    for usage in glossary.usages(&record.mnemonic).iter().take(3) {
        lines.push(Line::from(Span::styled(
            format!("  {}:{}  {}", usage.chapter, usage.line, usage.context),
            dim,
        )));
    }

    lines
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 40,
    };

    #[test]
    fn test_popup_opens_below_anchor() {
        let area = position((10, 5), (30, 10), VIEWPORT);
        assert_eq!(area, Rect::new(10, 6, 30, 10));
    }

    #[test]
    fn test_popup_flips_above_near_bottom() {
        let area = position((10, 38), (30, 10), VIEWPORT);
        assert_eq!(area, Rect::new(10, 28, 30, 10));
    }

    #[test]
    fn test_popup_slides_left_at_right_edge() {
        let area = position((90, 5), (30, 10), VIEWPORT);
        assert_eq!(area.x, 70);
        assert_eq!(area.right(), 100);
    }

    #[test]
    fn test_popup_never_exceeds_viewport() {
        let area = position((0, 0), (200, 200), VIEWPORT);
        assert!(area.width <= VIEWPORT.width);
        assert!(area.height <= VIEWPORT.height);
        assert_eq!(area.x, 0);
    }

    #[test]
    fn test_tall_popup_clamps_to_top() {
        // No room below or above: pin to the viewport top.
        let area = position((10, 20), (30, 39), VIEWPORT);
        assert_eq!(area.y, 0);
    }
}
