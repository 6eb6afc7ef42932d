//! Prompt panel widget

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::Stage;
use crate::ledger::MAX_SAMPLES;

use super::{styles, RenderState};

/// Draw the panel showing where the session stands and what to do next
pub fn draw_prompt(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .title(" ECHO GEN ");

    let mut lines: Vec<Line> = Vec::new();

    match state.stage {
        Stage::ApiKey => {
            lines.push(Line::from(Span::styled(
                "This is an AI voice generating software.",
                styles::info_style(),
            )));
            lines.push(Line::from(Span::styled(
                "Enter your OpenAI API key to begin.",
                styles::input_style(),
            )));
        }
        Stage::Username => {
            lines.push(Line::from(Span::styled(
                "Please provide 5 voice samples by reading the given sentences.",
                styles::info_style(),
            )));
            lines.push(Line::from(Span::styled(
                "Enter your username (e.g. user1, user2, user3).",
                styles::input_style(),
            )));
        }
        Stage::Collecting => {
            if let Some((index, sentence)) = state.prompt {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("Sample {} of {}: ", index + 1, MAX_SAMPLES),
                        styles::progress_style(),
                    ),
                    Span::styled(progress_dots(state.recorded), styles::progress_style()),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("\"{}\"", sentence),
                    styles::prompt_style(),
                )));
                lines.push(Line::from(Span::styled(
                    "Read the sentence aloud, then press * to start recording.",
                    styles::info_style(),
                )));
            }
        }
        Stage::Synthesis => {
            lines.push(Line::from(Span::styled(
                "All 5 voice samples have been recorded.",
                styles::sample_style(),
            )));
            lines.push(Line::from(Span::styled(
                "Enter the text you want to hear in your custom voice.",
                styles::input_style(),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn progress_dots(recorded: usize) -> String {
    let mut dots = String::new();
    for slot in 0..MAX_SAMPLES {
        dots.push(if slot < recorded { '●' } else { '○' });
    }
    dots
}
