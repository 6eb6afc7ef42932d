//! Input field widget

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::Stage;
use crate::input_utils::byte_index;

use super::{styles, InputMode, RenderState};

/// Draw the input area
pub fn draw_input(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (title, border_style) = match (state.input_mode, state.stage) {
        (InputMode::Recording, _) => (
            " Recording... (press * to stop, Esc to cancel) ",
            styles::recording_style(),
        ),
        (_, Stage::ApiKey) => (" OpenAI API Key ", styles::border_style()),
        (_, Stage::Username) => (" Username ", styles::border_style()),
        (_, Stage::Collecting) => (" Press * to record (/help for commands) ", styles::border_style()),
        (_, Stage::Synthesis) => (" Text to speak ", styles::border_style()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    // Build input line with vertical bar cursor. The cursor is a char
    // index, converted to a byte offset before splitting.
    let input = state.input;
    let cursor_pos = state.cursor_position;
    let (before_cursor, after_cursor) = input.split_at(byte_index(input, cursor_pos));

    // The API key is never echoed back
    let (before_cursor, after_cursor) = if state.stage == Stage::ApiKey {
        (
            "*".repeat(before_cursor.chars().count()),
            "*".repeat(after_cursor.chars().count()),
        )
    } else {
        (before_cursor.to_string(), after_cursor.to_string())
    };

    let line = Line::from(vec![
        Span::styled("  ", styles::input_style()), // Left padding
        Span::styled(before_cursor, styles::input_style()),
        Span::styled("│", styles::cursor_style()),
        Span::styled(after_cursor, styles::input_style()),
    ]);

    let paragraph = Paragraph::new(line).block(block);

    frame.render_widget(paragraph, area);

    // Set cursor position (accounting for border + padding)
    let x = area.x + 1 + 2 + cursor_pos as u16; // +1 border, +2 padding
    let y = area.y + 1;
    if x < area.x + area.width - 1 {
        frame.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_state(input: &str, cursor_position: usize, stage: Stage) -> RenderState {
        RenderState {
            stage,
            events: &[],
            input,
            cursor_position,
            input_mode: InputMode::Normal,
            username: None,
            prompt: None,
            recorded: 0,
            busy: false,
            voice: "tts-1/echo",
            scroll_offset: 0,
            status_message: None,
        }
    }

    #[test]
    fn test_draw_handles_cursor_after_multibyte_chars() {
        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        let state = render_state("héllo", 2, Stage::Synthesis);
        terminal
            .draw(|frame| draw_input(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn test_api_key_is_masked_per_char() {
        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        let state = render_state("sk-é", 4, Stage::ApiKey);
        terminal
            .draw(|frame| draw_input(frame, frame.area(), &state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(row.contains("****"), "row was {:?}", row);
        assert!(!row.contains('é'), "row was {:?}", row);
    }
}
