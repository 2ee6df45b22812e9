pub mod glossary_panel;
pub mod help;
pub mod layout;
pub mod note_bar;
pub mod reader;
pub mod search_bar;
pub mod status_bar;
pub mod toc;
pub mod tooltip;

use crate::app::App;
use ratatui::Frame;

pub fn render(frame: &mut Frame, app: &mut App) {
    layout::render(frame, app);
}
