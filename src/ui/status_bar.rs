use crate::app::{App, Mode};
use ratatui::{prelude::*, text::Span, widgets::Paragraph};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();

    let mode_str = match app.mode {
        Mode::Reading => " READ ",
        Mode::Search => " SEARCH ",
        Mode::Toc => " CONTENTS ",
        Mode::Note => " NOTE ",
    };

    let mode_style = match app.mode {
        Mode::Reading => Style::default()
            .bg(theme.ui.mode_reading_bg.to_color())
            .fg(theme.ui.mode_reading_fg.to_color())
            .add_modifier(Modifier::BOLD),
        // Note entry shares the search chip colors; both are input modes.
        Mode::Search | Mode::Note => Style::default()
            .bg(theme.ui.mode_search_bg.to_color())
            .fg(theme.ui.mode_search_fg.to_color())
            .add_modifier(Modifier::BOLD),
        Mode::Toc => Style::default()
            .bg(theme.ui.mode_toc_bg.to_color())
            .fg(theme.ui.mode_toc_fg.to_color())
            .add_modifier(Modifier::BOLD),
    };

    let chapter = app.chapter();
    let chapter_info = format!(
        " {} [{}/{}] ",
        chapter.title,
        app.chapter_index + 1,
        app.book.chapters.len()
    );

    let ref_info = match app.selected_ref {
        Some(i) if !app.composed.refs.is_empty() => {
            format!(" {} {}/{} ", app.composed.refs[i].mnemonic, i + 1, app.composed.refs.len())
        }
        _ => String::new(),
    };

    let status_msg = format!(" {} ", app.status_message);

    let percent = if app.composed.lines.is_empty() {
        100
    } else {
        (app.scroll * 100 / app.composed.lines.len()).min(100)
    };
    let position = format!(" {}% \u{00b7} F1 help ", percent);

    let mode_span = Span::styled(mode_str, mode_style);
    let chapter_span = Span::styled(
        chapter_info.clone(),
        Style::default()
            .bg(theme.ui.status_bar_bg.to_color())
            .fg(theme.ui.foreground.to_color()),
    );
    let ref_span = Span::styled(
        ref_info.clone(),
        Style::default()
            .bg(theme.ui.selection.to_color())
            .fg(theme.ui.foreground.to_color()),
    );
    let msg_span = Span::styled(
        status_msg.clone(),
        Style::default().fg(theme.ui.status_bar_fg.to_color()),
    );

    let left_len = mode_str.len() + chapter_info.len() + ref_info.len() + status_msg.len();
    let right_len = position.len();
    let padding = if area.width as usize > left_len + right_len {
        area.width as usize - left_len - right_len
    } else {
        1
    };

    let padding_span = Span::raw(" ".repeat(padding));
    let position_span = Span::styled(
        position,
        Style::default()
            .bg(theme.ui.status_bar_bg.to_color())
            .fg(theme.ui.status_bar_fg.to_color()),
    );

    let line = Line::from(vec![
        mode_span,
        chapter_span,
        ref_span,
        msg_span,
        padding_span,
        position_span,
    ]);
    let paragraph =
        Paragraph::new(line).style(Style::default().bg(theme.ui.status_bar_bg.to_color()));

    frame.render_widget(paragraph, area);
}
