use crate::book::{Book, Chapter};
use crate::config::Config;
use crate::glossary::{Glossary, SearchMatch, SearchOptions};
use crate::storage::{Bookmark, Highlight, Note, ReadingProgress, SearchHistory, Storage};
use crate::theme::Theme;
use crate::ui::reader::{self, Composed};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reading,
    Search,
    Toc,
    Note,
}

/// The open instruction tooltip. At most one exists; opening another
/// replaces this one.
#[derive(Debug, Clone)]
pub struct TooltipState {
    pub mnemonic: String,
    pub related: Vec<String>,
    pub scroll: usize,
}

pub struct App {
    pub mode: Mode,
    pub book: Book,
    pub glossary: Glossary,
    pub storage: Storage,
    pub config: Config,

    pub chapter_index: usize,
    pub scroll: usize,
    pub composed: Composed,
    pub selected_ref: Option<usize>,
    pub tooltip: Option<TooltipState>,

    pub search_input: String,
    pub search_results: Vec<SearchMatch>,
    pub search_total: usize,
    pub search_selected: usize,
    pub search_history: SearchHistory,
    pub history_cursor: Option<usize>,
    pub recent_lookups: Vec<String>,

    pub show_toc: bool,
    pub toc_selected: usize,
    pub show_help: bool,
    pub help_scroll: usize,
    pub bookmarks: Vec<Bookmark>,
    pub notes: Vec<Note>,
    pub note_input: String,
    pub highlights: Vec<Highlight>,

    pub status_message: String,
    pub should_quit: bool,
    pub viewport_height: u16,
    compose_width: u16,
    compose_dirty: bool,
}

impl App {
    pub fn new(book_dir: &Path) -> Result<Self> {
        let config = Config::load()?;
        let book = Book::open(book_dir)?;
        let (mut glossary, glossary_error) = book.load_glossary();
        book.scan_usages(&mut glossary);
        let storage = Storage::open()?;

        let progress: ReadingProgress = storage.load_or("progress");
        let chapter_index = progress.chapter_index.min(book.chapters.len() - 1);
        let scroll = if chapter_index == progress.chapter_index {
            progress.scroll
        } else {
            0
        };

        let status_message = match glossary_error {
            Some(err) => format!("Glossary unavailable ({}); using built-in entries", err),
            None => format!(
                "{} chapters, {} instructions | F1 for help",
                book.chapters.len(),
                glossary.len()
            ),
        };

        let bookmarks = storage.load_or("bookmarks");
        let notes = storage.load_or("notes");
        let highlights = storage.load_or("highlights");
        let search_history = storage.load_or("search_history");
        let recent_lookups = storage.load_or("recent_lookups");

        Ok(Self {
            mode: Mode::Reading,
            book,
            glossary,
            storage,
            config,
            chapter_index,
            scroll,
            composed: Composed::default(),
            selected_ref: None,
            tooltip: None,
            search_input: String::new(),
            search_results: Vec::new(),
            search_total: 0,
            search_selected: 0,
            search_history,
            history_cursor: None,
            recent_lookups,
            show_toc: false,
            toc_selected: chapter_index,
            show_help: false,
            help_scroll: 0,
            bookmarks,
            notes,
            note_input: String::new(),
            highlights,
            status_message,
            should_quit: false,
            viewport_height: 24,
            compose_width: 0,
            compose_dirty: true,
        })
    }

    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    pub fn chapter(&self) -> &Chapter {
        &self.book.chapters[self.chapter_index]
    }

    /// Recompose the current chapter if its geometry inputs changed.
    /// Called from the render path, which knows the text width.
    pub fn ensure_composed(&mut self, width: u16) {
        if !self.compose_dirty && width == self.compose_width {
            return;
        }
        self.compose_width = width;
        self.compose_dirty = false;

        let chapter = &self.book.chapters[self.chapter_index];
        if let Some(err) = &chapter.load_error {
            let placeholder = crate::markdown::parse(&format!(
                "# {}\n\nCould not read this chapter: {}\n\nUse n/p or the contents panel (t) to move to another chapter.",
                chapter.title, err
            ));
            self.composed =
                reader::compose(&placeholder, &self.config.theme, width, None, false, &[]);
            return;
        }
        let marks: Vec<usize> = self
            .highlights
            .iter()
            .filter(|h| h.chapter_index == self.chapter_index)
            .map(|h| h.start_line)
            .collect();
        self.composed = reader::compose(
            &chapter.doc,
            &self.config.theme,
            width,
            self.selected_ref,
            self.config.reader.show_parse_warnings,
            &marks,
        );
        if let Some(i) = self.selected_ref {
            if i >= self.composed.refs.len() {
                self.selected_ref = None;
            }
        }
        self.clamp_scroll();
    }

    fn invalidate(&mut self) {
        self.compose_dirty = true;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn max_scroll(&self) -> usize {
        let visible = self.viewport_height.saturating_sub(2) as usize;
        self.composed.lines.len().saturating_sub(visible.max(1))
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.scroll > max {
            self.scroll = max;
        }
    }

    // Scrolling

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> usize {
        (self.viewport_height as usize / 2).max(1)
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    // Chapter navigation

    pub fn goto_chapter(&mut self, index: usize) {
        if index >= self.book.chapters.len() || index == self.chapter_index {
            return;
        }
        self.chapter_index = index;
        self.scroll = 0;
        self.selected_ref = None;
        self.tooltip = None;
        self.toc_selected = index;
        self.invalidate();
        self.save_progress();
    }

    pub fn next_chapter(&mut self) {
        if self.chapter_index + 1 < self.book.chapters.len() {
            self.goto_chapter(self.chapter_index + 1);
        } else {
            self.set_status("Already at the last chapter");
        }
    }

    pub fn prev_chapter(&mut self) {
        if self.chapter_index > 0 {
            self.goto_chapter(self.chapter_index - 1);
        } else {
            self.set_status("Already at the first chapter");
        }
    }

    // Mnemonic references

    pub fn select_next_ref(&mut self) {
        if self.composed.refs.is_empty() {
            self.set_status("No instructions in this chapter");
            return;
        }
        let next = match self.selected_ref {
            Some(i) => (i + 1) % self.composed.refs.len(),
            None => self
                .composed
                .refs
                .iter()
                .position(|r| r.line >= self.scroll)
                .unwrap_or(0),
        };
        self.select_ref(next);
    }

    pub fn select_prev_ref(&mut self) {
        if self.composed.refs.is_empty() {
            self.set_status("No instructions in this chapter");
            return;
        }
        let prev = match self.selected_ref {
            Some(0) | None => self.composed.refs.len() - 1,
            Some(i) => i - 1,
        };
        self.select_ref(prev);
    }

    fn select_ref(&mut self, index: usize) {
        self.selected_ref = Some(index);
        self.tooltip = None;
        self.scroll_ref_into_view(index);
        self.invalidate();
    }

    fn scroll_ref_into_view(&mut self, index: usize) {
        let line = self.composed.refs[index].line;
        let visible = self.viewport_height.saturating_sub(2) as usize;
        let margin = self.config.reader.scroll_margin;
        if line < self.scroll + margin {
            self.scroll = line.saturating_sub(margin);
        } else if line + margin >= self.scroll + visible {
            self.scroll = (line + margin + 1).saturating_sub(visible).min(self.max_scroll());
        }
    }

    // Tooltip

    pub fn open_tooltip(&mut self) {
        let Some(index) = self.selected_ref else {
            self.set_status("Tab to an instruction first");
            return;
        };
        let mnemonic = self.composed.refs[index].mnemonic.clone();
        self.open_tooltip_for(&mnemonic);
    }

    pub fn open_tooltip_for(&mut self, mnemonic: &str) {
        let mnemonic = mnemonic.to_ascii_uppercase();
        if self.glossary.lookup(&mnemonic).is_none() {
            self.set_status(format!("{}: not in this book's glossary", mnemonic));
            return;
        }
        let related = self.glossary.related(&mnemonic);
        self.note_lookup(&mnemonic);
        self.tooltip = Some(TooltipState {
            mnemonic,
            related,
            scroll: 0,
        });
    }

    pub fn close_tooltip(&mut self) -> bool {
        self.tooltip.take().is_some()
    }

    fn note_lookup(&mut self, mnemonic: &str) {
        self.recent_lookups.retain(|m| m != mnemonic);
        self.recent_lookups.insert(0, mnemonic.to_string());
        self.recent_lookups.truncate(10);
        let _ = self.storage.save("recent_lookups", &self.recent_lookups);
    }

    // Search

    pub fn enter_search(&mut self) {
        self.mode = Mode::Search;
        self.search_input.clear();
        self.history_cursor = None;
        self.run_search();
    }

    pub fn leave_search(&mut self) {
        self.mode = Mode::Reading;
        if !self.search_input.is_empty() {
            self.search_history.push(&self.search_input);
            let _ = self.storage.save("search_history", &self.search_history);
        }
    }

    pub fn run_search(&mut self) {
        let options = SearchOptions {
            limit: self.config.search.result_limit,
            ..Default::default()
        };
        let results = self.glossary.search(&self.search_input, &options);
        self.search_results = results.matches;
        self.search_total = results.total;
        if self.search_selected >= self.search_results.len() {
            self.search_selected = 0;
        }
    }

    pub fn recall_previous_query(&mut self) {
        if self.search_history.queries.is_empty() {
            return;
        }
        let next = match self.history_cursor {
            None => 0,
            Some(i) => (i + 1) % self.search_history.queries.len(),
        };
        self.history_cursor = Some(next);
        self.search_input = self.search_history.queries[next].clone();
        self.run_search();
    }

    pub fn open_search_result(&mut self) {
        if let Some(m) = self.search_results.get(self.search_selected) {
            let mnemonic = m.mnemonic.clone();
            self.leave_search();
            self.selected_ref = None;
            self.open_tooltip_for(&mnemonic);
        }
    }

    // Contents

    pub fn toggle_toc(&mut self) {
        self.show_toc = !self.show_toc;
        self.mode = if self.show_toc { Mode::Toc } else { Mode::Reading };
        self.toc_selected = self.chapter_index;
    }

    pub fn open_toc_selection(&mut self) {
        let index = self.toc_selected;
        self.show_toc = false;
        self.mode = Mode::Reading;
        self.goto_chapter(index);
    }

    // Bookmarks

    pub fn toggle_bookmark(&mut self) {
        let here = Bookmark {
            chapter_index: self.chapter_index,
            scroll: self.scroll,
            title: self.chapter().title.clone(),
        };
        if let Some(pos) = self
            .bookmarks
            .iter()
            .position(|b| b.chapter_index == here.chapter_index && b.scroll == here.scroll)
        {
            self.bookmarks.remove(pos);
            self.set_status("Bookmark removed");
        } else {
            self.bookmarks.push(here);
            self.set_status("Bookmark added");
        }
        let _ = self.storage.save("bookmarks", &self.bookmarks);
    }

    pub fn jump_to_next_bookmark(&mut self) {
        if self.bookmarks.is_empty() {
            self.set_status("No bookmarks");
            return;
        }
        // First bookmark after the current position, wrapping around.
        let next = self
            .bookmarks
            .iter()
            .position(|b| {
                (b.chapter_index, b.scroll) > (self.chapter_index, self.scroll)
            })
            .unwrap_or(0);
        let bookmark = self.bookmarks[next].clone();
        self.goto_chapter(bookmark.chapter_index);
        self.scroll = bookmark.scroll;
        self.set_status(format!("Bookmark: {}", bookmark.title));
    }

    // Notes

    pub fn enter_note(&mut self) {
        self.mode = Mode::Note;
        self.note_input.clear();
    }

    pub fn cancel_note(&mut self) {
        self.mode = Mode::Reading;
        self.note_input.clear();
    }

    pub fn save_note(&mut self) {
        let text = self.note_input.trim().to_string();
        if text.is_empty() {
            self.cancel_note();
            return;
        }
        self.notes.push(Note {
            chapter_index: self.chapter_index,
            scroll: self.scroll,
            text,
        });
        self.notes.sort_by_key(|n| (n.chapter_index, n.scroll));
        let _ = self.storage.save("notes", &self.notes);
        self.note_input.clear();
        self.mode = Mode::Reading;
        self.set_status("Note saved");
    }

    pub fn jump_to_next_note(&mut self) {
        if self.notes.is_empty() {
            self.set_status("No notes");
            return;
        }
        // First note after the current position, wrapping around.
        let next = self
            .notes
            .iter()
            .position(|n| (n.chapter_index, n.scroll) > (self.chapter_index, self.scroll))
            .unwrap_or(0);
        let note = self.notes[next].clone();
        self.goto_chapter(note.chapter_index);
        self.scroll = note.scroll;
        self.set_status(format!("Note: {}", note.text));
    }

    // Highlights

    pub fn toggle_highlight(&mut self) {
        let Some(source_line) = self
            .composed
            .code_spans
            .iter()
            .find(|s| s.last_line >= self.scroll)
            .map(|s| s.source_line)
        else {
            self.set_status("No code block below this point");
            return;
        };
        let mark = Highlight {
            chapter_index: self.chapter_index,
            start_line: source_line,
        };
        if let Some(pos) = self.highlights.iter().position(|h| *h == mark) {
            self.highlights.remove(pos);
            self.set_status("Highlight removed");
        } else {
            self.highlights.push(mark);
            self.set_status("Highlight added");
        }
        let _ = self.storage.save("highlights", &self.highlights);
        self.invalidate();
    }

    // Clipboard

    pub fn copy_visible_code_block(&mut self) {
        let span = self
            .composed
            .code_spans
            .iter()
            .find(|s| s.last_line >= self.scroll)
            .cloned();
        let Some(span) = span else {
            self.set_status("No code block below this point");
            return;
        };
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(span.text.clone())) {
            Ok(()) => {
                let lines = span.last_line - span.first_line + 1;
                self.set_status(format!("Copied {} lines", lines));
            }
            Err(e) => self.set_status(format!("Clipboard error: {}", e)),
        }
    }

    // Themes

    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        let current = themes
            .iter()
            .position(|t| *t == self.config.theme_name)
            .unwrap_or(0);
        let next = themes[(current + 1) % themes.len()];
        self.config.set_theme(next);
        let _ = self.config.save();
        self.invalidate();
        self.set_status(format!("Theme: {}", next));
    }

    // Persistence

    pub fn save_progress(&self) {
        let _ = self.storage.save(
            "progress",
            &ReadingProgress {
                chapter_index: self.chapter_index,
                scroll: self.scroll,
            },
        );
    }

    pub fn quit(&mut self) {
        self.save_progress();
        self.should_quit = true;
    }
}

#[cfg(test)]
impl App {
    /// App from preloaded parts, so tests never touch the real config
    /// or data directories.
    pub fn with_parts(book: Book, glossary: Glossary, storage: Storage, config: Config) -> Self {
        Self {
            mode: Mode::Reading,
            book,
            glossary,
            storage,
            config,
            chapter_index: 0,
            scroll: 0,
            composed: Composed::default(),
            selected_ref: None,
            tooltip: None,
            search_input: String::new(),
            search_results: Vec::new(),
            search_total: 0,
            search_selected: 0,
            search_history: SearchHistory::default(),
            history_cursor: None,
            recent_lookups: Vec::new(),
            show_toc: false,
            toc_selected: 0,
            show_help: false,
            help_scroll: 0,
            bookmarks: Vec::new(),
            notes: Vec::new(),
            note_input: String::new(),
            highlights: Vec::new(),
            status_message: String::new(),
            should_quit: false,
            viewport_height: 24,
            compose_width: 0,
            compose_dirty: true,
        }
    }
}
