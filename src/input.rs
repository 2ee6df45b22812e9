//! Keyboard handling. One entry point per frame; the help popup and the
//! tooltip take keys before the per-mode handlers.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::app::{App, Mode};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Wait for and dispatch the next event, if any arrived within the poll
/// interval.
pub fn poll_and_handle(app: &mut App) -> Result<()> {
    if event::poll(POLL_INTERVAL)? {
        match event::read()? {
            Event::Key(key) => handle_key(app, key),
            // A resize re-runs composition through the render path.
            Event::Resize(..) => {}
            _ => {}
        }
    }
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+Q quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        app.quit();
        return;
    }

    if app.show_help {
        handle_help_key(app, key);
        return;
    }

    match app.mode {
        Mode::Reading => handle_reading_key(app, key),
        Mode::Search => handle_search_key(app, key),
        Mode::Toc => handle_toc_key(app, key),
        Mode::Note => handle_note_key(app, key),
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.help_scroll += 1,
        KeyCode::Char('k') | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
        KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

fn handle_reading_key(app: &mut App, key: KeyEvent) {
    // Tooltip keys first: shifted j/k scroll it, Esc closes it.
    if app.tooltip.is_some() {
        match key.code {
            KeyCode::Char('J') => {
                if let Some(t) = app.tooltip.as_mut() {
                    t.scroll += 1;
                }
                return;
            }
            KeyCode::Char('K') => {
                if let Some(t) = app.tooltip.as_mut() {
                    t.scroll = t.scroll.saturating_sub(1);
                }
                return;
            }
            KeyCode::Esc => {
                app.close_tooltip();
                return;
            }
            _ => {
                app.close_tooltip();
                // Fall through so the key still acts on the page.
            }
        }
    }

    let step = app.config.reader.scroll_step.max(1);
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(step),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(step),
        KeyCode::Char('d') | KeyCode::PageDown => app.scroll_down(app.half_page()),
        KeyCode::Char('u') | KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char('n') | KeyCode::Right => app.next_chapter(),
        KeyCode::Char('p') | KeyCode::Left => app.prev_chapter(),
        KeyCode::Tab => app.select_next_ref(),
        KeyCode::BackTab => app.select_prev_ref(),
        KeyCode::Enter => app.open_tooltip(),
        KeyCode::Esc => app.selected_ref = None,
        KeyCode::Char('c') => app.copy_visible_code_block(),
        KeyCode::Char('b') => app.toggle_bookmark(),
        KeyCode::Char('B') => app.jump_to_next_bookmark(),
        KeyCode::Char('h') => app.toggle_highlight(),
        KeyCode::Char('N') => app.enter_note(),
        KeyCode::Char('v') => app.jump_to_next_note(),
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('t') => app.toggle_toc(),
        KeyCode::Char('T') => app.cycle_theme(),
        KeyCode::F(1) | KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_search(),
        KeyCode::Enter => app.open_search_result(),
        KeyCode::Tab => app.recall_previous_query(),
        KeyCode::Down => {
            if !app.search_results.is_empty() {
                app.search_selected = (app.search_selected + 1) % app.search_results.len();
            }
        }
        KeyCode::Up => {
            if !app.search_results.is_empty() {
                app.search_selected = app
                    .search_selected
                    .checked_sub(1)
                    .unwrap_or(app.search_results.len() - 1);
            }
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.history_cursor = None;
            app.run_search();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.push(c);
            app.history_cursor = None;
            app.run_search();
        }
        _ => {}
    }
}

fn handle_note_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_note(),
        KeyCode::Enter => app.save_note(),
        KeyCode::Backspace => {
            app.note_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.note_input.push(c);
        }
        _ => {}
    }
}

fn handle_toc_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.toc_selected + 1 < app.book.chapters.len() {
                app.toc_selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.toc_selected = app.toc_selected.saturating_sub(1);
        }
        KeyCode::Enter => app.open_toc_selection(),
        KeyCode::Char('t') | KeyCode::Esc | KeyCode::Char('q') => app.toggle_toc(),
        KeyCode::F(1) | KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::config::Config;
    use crate::glossary::Glossary;
    use crate::storage::Storage;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(tmp: &TempDir) -> App {
        let book_dir = tmp.path().join("book");
        fs::create_dir_all(&book_dir).unwrap();
        fs::write(
            book_dir.join("chapter-01-a.md"),
            "# One\n\n```assembly\nmov eax, 1\n```",
        )
        .unwrap();
        fs::write(book_dir.join("chapter-02-b.md"), "# Two\n\ntext").unwrap();

        let book = Book::open(&book_dir).unwrap();
        App::with_parts(
            book,
            Glossary::fallback(),
            Storage::with_dir(tmp.path().join("data")),
            Config::default(),
        )
    }

    #[test]
    fn test_slash_enters_search_and_esc_leaves() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.mode, Mode::Search);

        handle_key(&mut app, key(KeyCode::Char('m')));
        handle_key(&mut app, key(KeyCode::Char('o')));
        assert_eq!(app.search_input, "mo");
        assert!(app.search_results.iter().any(|m| m.mnemonic == "MOV"));

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.search_history.queries, vec!["mo"]);
    }

    #[test]
    fn test_enter_opens_tooltip_for_selected_ref() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        app.ensure_composed(80);
        handle_key(&mut app, key(KeyCode::Tab));
        app.ensure_composed(80);
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.tooltip.as_ref().unwrap().mnemonic, "MOV");

        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.tooltip.is_none());
        // Selection survives the tooltip closing.
        assert_eq!(app.selected_ref, Some(0));
    }

    #[test]
    fn test_note_entry_flow() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        handle_key(&mut app, key(KeyCode::Char('N')));
        assert_eq!(app.mode, Mode::Note);

        for c in "slow loop".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.notes[0].text, "slow loop");

        // Esc abandons a half-typed note.
        handle_key(&mut app, key(KeyCode::Char('N')));
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.notes.len(), 1);
    }

    #[test]
    fn test_help_captures_keys() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        handle_key(&mut app, key(KeyCode::F(1)));
        assert!(app.show_help);
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_toc_navigation() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        handle_key(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.mode, Mode::Toc);
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.chapter_index, 1);
    }

    #[test]
    fn test_ctrl_q_quits_from_any_mode() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        app.mode = Mode::Search;
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
