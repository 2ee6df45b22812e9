use crate::app::{App, Mode};
use ratatui::prelude::*;

const TOC_WIDTH: u16 = 34;

pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let theme = app.config.theme.clone();

    // Main vertical layout: content + status bar + (optional) search bar
    let bottom_bar_height = match app.mode {
        Mode::Search | Mode::Note => 1,
        _ => 0,
    };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(bottom_bar_height),
        ])
        .split(size);

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    // Content area: contents sidebar (optional) | reader
    let mut h_constraints = Vec::new();
    if app.show_toc {
        h_constraints.push(Constraint::Length(TOC_WIDTH));
    }
    h_constraints.push(Constraint::Min(30));

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(h_constraints)
        .split(content_area);

    let mut chunk_idx = 0;
    if app.show_toc {
        super::toc::render(frame, h_chunks[chunk_idx], app);
        chunk_idx += 1;
    }

    let reader_area = h_chunks[chunk_idx];

    // Composition depends on the inner text width; recompose on change.
    app.viewport_height = reader_area.height;
    app.ensure_composed(reader_area.width.saturating_sub(2));
    super::reader::render(frame, reader_area, app);

    super::status_bar::render(frame, status_area, app);

    match app.mode {
        Mode::Search => {
            super::search_bar::render(frame, main_chunks[2], app);
            super::glossary_panel::render(frame, content_area, app);
        }
        Mode::Note => super::note_bar::render(frame, main_chunks[2], app),
        _ => {}
    }

    // Tooltip anchors at its mnemonic token when visible, else at the
    // viewport corner (reachable after a search-result jump).
    if let Some(state) = app.tooltip.clone() {
        let anchor = app
            .selected_ref
            .and_then(|i| app.composed.refs.get(i))
            .filter(|r| r.line >= app.scroll)
            .map(|r| {
                (
                    reader_area.x + 1 + r.col,
                    reader_area.y + 1 + (r.line - app.scroll) as u16,
                )
            })
            .filter(|(_, y)| *y < reader_area.bottom().saturating_sub(1))
            .unwrap_or((reader_area.x + 2, reader_area.y + 1));
        super::tooltip::render(frame, &state, anchor, &app.glossary, &theme);
    }

    if app.show_help {
        super::help::render(frame, size, &theme, app.help_scroll);
    }
}
