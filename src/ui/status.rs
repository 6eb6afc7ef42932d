//! Status bar widget

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ledger::MAX_SAMPLES;

use super::{styles, InputMode, RenderState};

/// Draw the status bar
pub fn draw_status(frame: &mut Frame, area: Rect, state: &RenderState) {
    let mut spans = vec![];

    // Voice model
    spans.push(Span::styled(
        format!(" {} ", state.voice),
        styles::voice_style(),
    ));
    spans.push(Span::styled(" | ", styles::status_style()));

    // Status indicator
    if state.input_mode == InputMode::Recording {
        spans.push(Span::styled("Recording", styles::recording_style()));
    } else if state.busy {
        spans.push(Span::styled("Working...", styles::busy_style()));
    } else {
        spans.push(Span::styled("Ready", styles::ready_style()));
    }

    // Status message
    if let Some(msg) = state.status_message {
        spans.push(Span::styled(" | ", styles::status_style()));
        spans.push(Span::styled(msg, styles::status_style()));
    }

    // Username and sample progress (right aligned)
    let user_info = match state.username {
        Some(name) => format!("{} {}/{} ", name, state.recorded, MAX_SAMPLES),
        None => "no user ".to_string(),
    };

    // Calculate padding to right-align, counting chars rather than bytes
    let left_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize).saturating_sub(left_len + user_info.chars().count());
    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }
    spans.push(Span::styled(user_info, styles::user_style()));

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Stage;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_user_info_is_right_aligned_for_non_ascii_names() {
        let mut terminal = Terminal::new(TestBackend::new(40, 1)).unwrap();
        let state = RenderState {
            stage: Stage::Synthesis,
            events: &[],
            input: "",
            cursor_position: 0,
            input_mode: InputMode::Normal,
            username: Some("José"),
            prompt: None,
            recorded: 0,
            busy: false,
            voice: "tts-1/echo",
            scroll_offset: 0,
            status_message: None,
        };
        terminal
            .draw(|frame| draw_status(frame, frame.area(), &state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer[(x, 0)].symbol()).collect();
        assert!(row.ends_with("José 0/5 "), "row was {:?}", row);
    }
}
