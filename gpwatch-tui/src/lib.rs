//! gpwatch TUI - live terminal dashboard for GPW stock prices
//!
//! Provides:
//! - Raw-mode keyboard input decoded into navigation actions
//! - The session loop (price table, fullscreen chart)
//! - A ratatui renderer with the parrot/neon theme

pub mod escape;
pub mod input;
pub mod render;
pub mod session;
pub mod theme;
pub mod ui;

pub use escape::EscapeDecoder;
#[cfg(not(unix))]
pub use input::CrosstermKeys;
pub use input::{
    Action, InputController, InputError, KeySource, RawModeGuard, StdinKeys, TerminalKeys,
};
pub use render::{Renderer, TerminalRenderer};
pub use session::{Flow, Mode, SessionController};
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
