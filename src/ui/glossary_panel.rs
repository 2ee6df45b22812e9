//! Search results panel: match list on the left, the selected record's
//! details on the right. Shown while search mode is active.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();

    let panel_height = (app.search_results.len() as u16 + 2).clamp(5, 14);
    let panel_area = Rect::new(
        area.x,
        area.bottom().saturating_sub(panel_height),
        area.width,
        panel_height,
    );

    frame.render_widget(Clear, panel_area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(panel_area);

    let total_note = if app.search_total > app.search_results.len() {
        format!(
            " Results ({} of {}) ",
            app.search_results.len(),
            app.search_total
        )
    } else {
        format!(" Results ({}) ", app.search_results.len())
    };

    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .map(|m| {
            let count = app.glossary.usage_count(&m.mnemonic);
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", m.mnemonic),
                    Style::default()
                        .fg(theme.syntax.mnemonic.to_color())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {:>3}  \u{00d7}{}", m.score, count),
                    Style::default().fg(theme.ui.quote.to_color()),
                ),
            ]))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.ui.border_focused.to_color()))
                .title(total_note),
        )
        .style(Style::default().bg(theme.ui.background.to_color()))
        .highlight_style(
            Style::default()
                .bg(theme.ui.selection.to_color())
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.search_selected));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let detail: Vec<Line> = match app
        .search_results
        .get(app.search_selected)
        .and_then(|m| app.glossary.lookup(&m.mnemonic))
    {
        Some(record) => vec![
            Line::from(Span::styled(
                record.syntax.clone(),
                Style::default()
                    .fg(theme.syntax.mnemonic.to_color())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} \u{00b7} {}", record.category, record.difficulty),
                Style::default().fg(theme.ui.quote.to_color()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                record.description.clone(),
                Style::default().fg(theme.ui.foreground.to_color()),
            )),
        ],
        None if app.search_input.is_empty() && !app.recent_lookups.is_empty() => {
            let mut lines = vec![Line::from(Span::styled(
                "Recent lookups:",
                Style::default().fg(theme.ui.foreground.to_color()),
            ))];
            lines.push(Line::from(Span::styled(
                app.recent_lookups.join(", "),
                Style::default().fg(theme.ui.link.to_color()),
            )));
            lines
        }
        None => vec![Line::from(Span::styled(
            "No matching instruction.",
            Style::default().fg(theme.ui.quote.to_color()),
        ))],
    };

    let paragraph = Paragraph::new(detail)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.ui.border.to_color()))
                .title(" Details "),
        )
        .style(Style::default().bg(theme.ui.background.to_color()))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, chunks[1]);
}
