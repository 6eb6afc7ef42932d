//! UI components using ratatui

mod input;
mod layout;
mod log;
mod prompt;
mod status;
mod styles;

pub use input::*;
pub use layout::*;
pub use log::*;
pub use prompt::*;
pub use status::*;
pub use styles::*;

use ratatui::Frame;

use crate::app::{EventEntry, Stage};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal text input
    Normal,
    /// Recording a voice sample
    Recording,
}

/// State needed for rendering (borrowed references)
pub struct RenderState<'a> {
    pub stage: Stage,
    pub events: &'a [EventEntry],
    pub input: &'a str,
    /// Cursor position as a character index into `input`
    pub cursor_position: usize,
    pub input_mode: InputMode,
    pub username: Option<&'a str>,
    /// Zero-based index and text of the sentence to read next
    pub prompt: Option<(usize, &'a str)>,
    /// Samples recorded so far for the active username
    pub recorded: usize,
    pub busy: bool,
    pub voice: &'a str,
    pub scroll_offset: usize,
    pub status_message: Option<&'a str>,
}

/// Main draw function
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let chunks = create_layout(frame.area());

    // Draw prompt panel
    draw_prompt(frame, chunks[0], state);

    // Draw event log
    draw_log(frame, chunks[1], state);

    // Draw input area
    draw_input(frame, chunks[2], state);

    // Draw status bar
    draw_status(frame, chunks[3], state);
}
