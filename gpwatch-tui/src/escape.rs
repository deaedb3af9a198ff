//! Byte-level key decoding for raw terminal input.
//!
//! An ESC byte either starts a sequence (`ESC [ A` is the up arrow) or is the
//! Escape key itself. The two can only be told apart by waiting: when no
//! recognized continuation arrives within [`ESCAPE_TIMEOUT`], whatever is
//! pending resolves to a plain Esc.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// How long a partial escape sequence may wait for its next byte.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(100);

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;
const DEL: u8 = 0x7f;

/// Longest CSI we keep buffering before giving up on it.
const MAX_SEQUENCE: usize = 16;

#[derive(Debug, Default)]
pub struct EscapeDecoder {
    pending: Vec<u8>,
    started_at: Option<Instant>,
}

impl EscapeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the pending sequence resolves to Esc if nothing else arrives.
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.map(|at| at + ESCAPE_TIMEOUT)
    }

    /// Resolve a pending sequence whose continuation timed out.
    pub fn expire(&mut self, now: Instant) -> Option<KeyEvent> {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.reset();
                Some(KeyEvent::from(KeyCode::Esc))
            }
            _ => None,
        }
    }

    /// Feed one byte; returns a key once one is complete.
    pub fn feed(&mut self, byte: u8, now: Instant) -> Option<KeyEvent> {
        if self.pending.is_empty() {
            return self.start(byte, now);
        }

        // A new ESC cuts off whatever was pending: that one was a bare Esc.
        if byte == ESC {
            self.reset();
            self.start(byte, now);
            return Some(KeyEvent::from(KeyCode::Esc));
        }

        match (self.pending.as_slice(), byte) {
            ([ESC], b'[' | b'O') => {
                self.pending.push(byte);
                None
            }
            // ESC followed by anything else (Alt+key) counts as Esc.
            ([ESC], _) => {
                self.reset();
                Some(KeyEvent::from(KeyCode::Esc))
            }
            ([ESC, b'[', ..], b'0'..=b'9' | b';') if self.pending.len() < MAX_SEQUENCE => {
                self.pending.push(byte);
                None
            }
            ([ESC, b'[' | b'O', ..], 0x40..=0x7e) => {
                self.reset();
                final_byte_key(byte)
            }
            // Malformed or overlong: drop it.
            _ => {
                self.reset();
                None
            }
        }
    }

    fn start(&mut self, byte: u8, now: Instant) -> Option<KeyEvent> {
        match byte {
            ESC => {
                self.pending.push(ESC);
                self.started_at = Some(now);
                None
            }
            b'\r' | b'\n' => Some(KeyEvent::from(KeyCode::Enter)),
            CTRL_C => Some(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            DEL => Some(KeyEvent::from(KeyCode::Backspace)),
            b' '..=b'~' => Some(KeyEvent::from(KeyCode::Char(char::from(byte)))),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.started_at = None;
    }
}

fn final_byte_key(byte: u8) -> Option<KeyEvent> {
    let code = match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        _ => return None,
    };
    Some(KeyEvent::from(code))
}
