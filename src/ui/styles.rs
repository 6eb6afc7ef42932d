//! UI styles and colors (Catppuccin theme)

use ratatui::style::{Color, Modifier, Style};

// Catppuccin Mocha palette
pub const MAUVE: Color = Color::Rgb(203, 166, 247);
pub const RED: Color = Color::Rgb(243, 139, 168);
pub const PEACH: Color = Color::Rgb(250, 179, 135);
pub const YELLOW: Color = Color::Rgb(249, 226, 175);
pub const GREEN: Color = Color::Rgb(166, 227, 161);
pub const TEAL: Color = Color::Rgb(148, 226, 213);
pub const SAPPHIRE: Color = Color::Rgb(116, 199, 236);
pub const BLUE: Color = Color::Rgb(137, 180, 250);
pub const TEXT: Color = Color::Rgb(205, 214, 244);
pub const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
pub const OVERLAY1: Color = Color::Rgb(127, 132, 156);
pub const SURFACE2: Color = Color::Rgb(88, 91, 112);
pub const BASE: Color = Color::Rgb(30, 30, 46);

// Event and widget styles
pub fn user_style() -> Style {
    Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)
}

pub fn info_style() -> Style {
    Style::default().fg(OVERLAY1).add_modifier(Modifier::ITALIC)
}

pub fn sample_style() -> Style {
    Style::default().fg(GREEN)
}

pub fn transcript_style() -> Style {
    Style::default().fg(TEAL)
}

pub fn error_style() -> Style {
    Style::default().fg(RED)
}

pub fn prompt_style() -> Style {
    Style::default().fg(MAUVE).add_modifier(Modifier::BOLD)
}

pub fn progress_style() -> Style {
    Style::default().fg(PEACH)
}

pub fn recording_style() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

pub fn busy_style() -> Style {
    Style::default().fg(YELLOW)
}

pub fn border_style() -> Style {
    Style::default().fg(SURFACE2)
}

pub fn input_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn cursor_style() -> Style {
    Style::default().fg(BASE).bg(TEXT)
}

pub fn status_style() -> Style {
    Style::default().fg(SUBTEXT0)
}

pub fn voice_style() -> Style {
    Style::default().fg(BLUE)
}

pub fn ready_style() -> Style {
    Style::default().fg(GREEN)
}
