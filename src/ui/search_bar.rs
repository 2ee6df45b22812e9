use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();

    let line = Line::from(vec![
        Span::styled(
            "/",
            Style::default()
                .fg(theme.ui.mode_search_bg.to_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            app.search_input.clone(),
            Style::default().fg(theme.ui.foreground.to_color()),
        ),
        Span::styled("\u{2588}", Style::default().fg(theme.ui.foreground.to_color())),
        Span::styled(
            "   (Enter: open  Tab: history  Esc: close)",
            Style::default().fg(theme.ui.quote.to_color()),
        ),
    ]);

    let paragraph =
        Paragraph::new(line).style(Style::default().bg(theme.ui.status_bar_bg.to_color()));
    frame.render_widget(paragraph, area);
}
