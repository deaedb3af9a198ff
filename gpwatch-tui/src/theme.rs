//! Parrot/neon theme tokens for the gpwatch dashboard
//!
//! # Color Palette
//! - **Accent**: Electric cyan (selection, titles, the price line)
//! - **Positive**: Neon green (gains)
//! - **Negative**: Hot pink (losses, fetch errors)
//! - **Warning**: Neon orange (stale prices, notices)
//! - **Muted**: Steel blue (hints, axis labels)

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const SELECTION_BG: Color = Color::Rgb(40, 44, 52);

/// Dashboard palette.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            muted: MUTED,
            text_primary: Color::White,
        }
    }

    /// Get color for a profit/loss value (zero counts as a gain).
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn pnl(value: f64) -> Style {
    Style::default().fg(Theme::default().pnl_color(value))
}

pub fn header() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn selected_row() -> Style {
    Style::default().bg(SELECTION_BG).add_modifier(Modifier::BOLD)
}

pub fn panel_border() -> Style {
    Style::default().fg(ACCENT)
}

pub fn panel_title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}
