use crate::theme::Theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Help content organized by section - compact two-column format
const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "READING",
        &[
            ("j/k \u{2193}\u{2191}", "Scroll"),
            ("d/u", "Half page"),
            ("g/G", "Chapter start/end"),
            ("n/p", "Next/prev chapter"),
            ("Tab/S-Tab", "Cycle instructions"),
            ("Enter", "Instruction tooltip"),
            ("Esc", "Close tooltip"),
            ("c", "Copy code block"),
            ("b", "Toggle bookmark"),
            ("B", "Jump to bookmark"),
            ("h", "Highlight code block"),
            ("N", "New note"),
            ("v", "Jump to note"),
        ],
    ),
    (
        "PANELS",
        &[
            ("/", "Search glossary"),
            ("t", "Contents"),
            ("F1 or ?", "This help"),
            ("q / Ctrl+Q", "Quit"),
        ],
    ),
    (
        "SEARCH",
        &[
            ("type", "Filter instructions"),
            ("\u{2193}\u{2191}", "Select result"),
            ("Enter", "Open tooltip"),
            ("Tab", "Previous query"),
            ("Esc", "Back to reading"),
        ],
    ),
    (
        "CONTENTS",
        &[
            ("j/k \u{2193}\u{2191}", "Select chapter"),
            ("Enter", "Open chapter"),
            ("t or Esc", "Close"),
        ],
    ),
    (
        "THEMES",
        &[("T", "Cycle theme (dark/light/gruvbox)")],
    ),
];

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, scroll: usize) {
    let popup_width = (area.width * 80 / 100).min(56);
    let popup_height = (area.height * 80 / 100).min(26);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(
        area.x + popup_x,
        area.y + popup_y,
        popup_width,
        popup_height,
    );

    frame.render_widget(Clear, popup_area);

    let key_style = Style::default()
        .fg(theme.ui.title_focused.to_color())
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.ui.foreground.to_color());
    let section_style = Style::default()
        .fg(theme.ui.heading.to_color())
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (section_name, bindings) in HELP_SECTIONS {
        lines.push(Line::from(Span::styled(*section_name, section_style)));
        for (key, desc) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", key), key_style),
                Span::styled(*desc, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.ui.border_focused.to_color()))
        .title(" Help (F1/Esc to close, j/k to scroll) ")
        .title_style(Style::default().fg(theme.ui.foreground.to_color()))
        .style(Style::default().bg(theme.ui.background.to_color()));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, popup_area);
}
