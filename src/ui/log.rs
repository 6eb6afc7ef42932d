//! Event log widget

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::EventKind;

use super::{styles, RenderState};

/// Draw the scrolling event log
pub fn draw_log(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .title(" Session Log ");

    let inner = block.inner(area);

    // Build lines from events
    let mut lines: Vec<Line> = Vec::new();

    for entry in state.events {
        let (prefix, style) = match entry.kind {
            EventKind::Info => ("Info", styles::info_style()),
            EventKind::User => ("You", styles::user_style()),
            EventKind::Sample => ("Saved", styles::sample_style()),
            EventKind::Transcript => ("Heard", styles::transcript_style()),
            EventKind::Error => ("Error", styles::error_style()),
        };

        let timestamp = entry.timestamp.format("%H:%M:%S");
        let mut text_lines = entry.text.lines();

        // First line carries the timestamp and prefix
        if let Some(first) = text_lines.next() {
            lines.push(Line::from(vec![
                Span::styled(format!("[{}] ", timestamp), styles::status_style()),
                Span::styled(format!("{}: ", prefix), style),
                Span::styled(first.to_string(), Style::default().fg(styles::TEXT)),
            ]));
        }
        // Continuation lines are indented under the prefix
        for line in text_lines {
            lines.push(Line::from(Span::styled(
                format!("  {}", line),
                Style::default().fg(styles::TEXT),
            )));
        }
    }

    // Calculate scroll
    let visible_height = inner.height as usize;
    let total_lines = lines.len();
    let scroll = if total_lines > visible_height {
        let max_scroll = total_lines.saturating_sub(visible_height);
        max_scroll.saturating_sub(state.scroll_offset)
    } else {
        0
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, area);
}
