//! Table-of-contents sidebar.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{App, Mode};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.mode == Mode::Toc;

    let border_color = if focused {
        theme.ui.border_focused.to_color()
    } else {
        theme.ui.border.to_color()
    };

    let items: Vec<ListItem> = app
        .book
        .chapters
        .iter()
        .map(|chapter| {
            let bookmarked = app
                .bookmarks
                .iter()
                .any(|b| b.chapter_index == chapter.index);
            let marker = if bookmarked { "\u{2691} " } else { "  " };
            let style = if chapter.index == app.chapter_index {
                Style::default()
                    .fg(theme.ui.toc_current.to_color())
                    .add_modifier(Modifier::BOLD)
            } else if chapter.load_error.is_some() {
                Style::default().fg(theme.ui.quote.to_color())
            } else {
                Style::default().fg(theme.ui.toc_entry.to_color())
            };
            ListItem::new(Line::from(Span::styled(
                format!("{}{:>2}. {}", marker, chapter.index + 1, chapter.title),
                style,
            )))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Contents ")
                .title_style(Style::default().fg(if focused {
                    theme.ui.title_focused.to_color()
                } else {
                    theme.ui.title.to_color()
                })),
        )
        .style(Style::default().bg(theme.ui.background.to_color()))
        .highlight_style(Style::default().bg(theme.ui.selection.to_color()));

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.toc_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
