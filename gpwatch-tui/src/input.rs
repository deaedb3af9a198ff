//! Keyboard input: raw-mode key reads decoded into dashboard actions.
//!
//! Raw mode is only held while a read is in progress. Between reads the
//! terminal stays in its normal mode, so a slow refresh never leaves the
//! user's shell half-configured if the process dies mid-fetch.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(not(unix))]
use crossterm::event;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
use thiserror::Error;

use crate::escape::EscapeDecoder;

/// How long each slice of [`InputController::wait_for_dismiss`] waits before
/// re-checking the shutdown flag.
const DISMISS_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to switch terminal raw mode: {0}")]
    RawMode(#[source] io::Error),

    #[error("failed to read terminal input: {0}")]
    Read(#[source] io::Error),
}

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    Confirm,
    Cancel,
    /// Ctrl+C or `q`. Raw mode swallows SIGINT, so the key has to do its job.
    Quit,
    None,
}

/// Map one key event to an action.
pub fn decode_key(key: KeyEvent) -> Action {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::MoveDown,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => Action::None,
    }
}

/// Where key events come from.
pub trait KeySource {
    /// Wait up to `timeout` for the next key event. `Ok(None)` on timeout.
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError>;
}

/// Restores the terminal mode it found when dropped.
pub struct RawModeGuard {
    was_raw: bool,
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self, InputError> {
        let was_raw = is_raw_mode_enabled().map_err(InputError::RawMode)?;
        if !was_raw {
            enable_raw_mode().map_err(InputError::RawMode)?;
        }
        Ok(Self { was_raw })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_raw {
            let _ = disable_raw_mode();
        }
    }
}

/// Decodes raw terminal bytes read from stdin.
///
/// A background thread forwards bytes over a channel so reads can time out.
/// Escape sequences go through [`EscapeDecoder`]: an ESC whose continuation
/// does not arrive within [`ESCAPE_TIMEOUT`](crate::escape::ESCAPE_TIMEOUT) becomes a plain Esc, even if
/// that means waiting slightly past the caller's timeout.
pub struct StdinKeys {
    bytes: Receiver<u8>,
    decoder: EscapeDecoder,
}

impl StdinKeys {
    pub fn spawn() -> Result<Self, InputError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("gpwatch-stdin".into())
            .spawn(move || forward_stdin(&tx))
            .map_err(InputError::Read)?;
        Ok(Self::from_channel(rx))
    }

    fn from_channel(bytes: Receiver<u8>) -> Self {
        Self {
            bytes,
            decoder: EscapeDecoder::new(),
        }
    }

    /// Decode until a key completes or `deadline` passes with nothing pending.
    fn read_key(&mut self, deadline: Instant) -> Result<Option<KeyEvent>, InputError> {
        loop {
            let now = Instant::now();
            if let Some(key) = self.decoder.expire(now) {
                return Ok(Some(key));
            }
            let until = self.decoder.deadline().unwrap_or(deadline);
            match self.bytes.recv_timeout(until.saturating_duration_since(now)) {
                Ok(byte) => {
                    if let Some(key) = self.decoder.feed(byte, Instant::now()) {
                        return Ok(Some(key));
                    }
                }
                Err(RecvTimeoutError::Timeout) if self.decoder.is_pending() => {}
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(InputError::Read(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    )));
                }
            }
        }
    }
}

impl KeySource for StdinKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        let _raw = RawModeGuard::acquire()?;
        self.read_key(Instant::now() + timeout)
    }
}

fn forward_stdin(tx: &Sender<u8>) {
    let mut stdin = io::stdin().lock();
    let mut buf = [0u8; 64];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => {
                if buf[..n].iter().any(|b| tx.send(*b).is_err()) {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                log::warn!("stdin reader stopped: {e}");
                return;
            }
        }
    }
}

/// Reads the console through crossterm's event queue.
#[cfg(not(unix))]
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermKeys;

#[cfg(not(unix))]
impl KeySource for CrosstermKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        let _raw = RawModeGuard::acquire()?;
        if !event::poll(timeout).map_err(InputError::Read)? {
            return Ok(None);
        }
        match event::read().map_err(InputError::Read)? {
            event::Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// Key source for the real terminal on this platform.
#[cfg(unix)]
pub type TerminalKeys = StdinKeys;
#[cfg(not(unix))]
pub type TerminalKeys = CrosstermKeys;

/// Turns a [`KeySource`] into a stream of [`Action`]s.
pub struct InputController<S = TerminalKeys> {
    source: S,
}

impl InputController<TerminalKeys> {
    /// Controller over the real terminal, after checking raw mode works.
    pub fn terminal() -> Result<Self, InputError> {
        drop(RawModeGuard::acquire()?);
        #[cfg(unix)]
        let source = StdinKeys::spawn()?;
        #[cfg(not(unix))]
        let source = CrosstermKeys;
        Ok(Self::new(source))
    }
}

impl<S: KeySource> InputController<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Next pending action without blocking. Unmapped keys are consumed.
    pub fn poll_action(&mut self) -> Result<Action, InputError> {
        self.wait_for_action(Duration::ZERO)
    }

    /// Block up to `timeout` for a mapped key; `Action::None` on timeout.
    pub fn wait_for_action(&mut self, timeout: Duration) -> Result<Action, InputError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(key) = self.source.next_key(remaining)? else {
                return Ok(Action::None);
            };
            let action = decode_key(key);
            if action != Action::None {
                return Ok(action);
            }
        }
    }

    /// Block until Cancel or Quit, or until `shutdown` is raised.
    ///
    /// Returns `Action::Quit` when interrupted by the flag.
    pub fn wait_for_dismiss(&mut self, shutdown: &AtomicBool) -> Result<Action, InputError> {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                return Ok(Action::Quit);
            }
            match self.wait_for_action(DISMISS_SLICE)? {
                action @ (Action::Cancel | Action::Quit) => return Ok(action),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::ESCAPE_TIMEOUT;
    use crate::test_helpers::ScriptedKeys;

    #[test]
    fn test_arrow_and_letter_keys_match() {
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Up)), Action::MoveUp);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('w'))), Action::MoveUp);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('W'))), Action::MoveUp);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Down)), Action::MoveDown);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('s'))), Action::MoveDown);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('S'))), Action::MoveDown);
    }

    #[test]
    fn test_enter_and_esc() {
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Enter)), Action::Confirm);
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Esc)), Action::Cancel);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('q'))), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(decode_key(ctrl_c), Action::Quit);
        // Plain 'c' is not bound.
        assert_eq!(decode_key(KeyEvent::from(KeyCode::Char('c'))), Action::None);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = KeyEvent::from(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(decode_key(key), Action::None);
    }

    #[test]
    fn test_poll_returns_none_when_idle() {
        let mut input = InputController::new(ScriptedKeys::idle());
        assert_eq!(input.poll_action().unwrap(), Action::None);
    }

    #[test]
    fn test_poll_skips_unmapped_keys() {
        let mut input = InputController::new(ScriptedKeys::idle_after(vec![
            KeyEvent::from(KeyCode::Char('x')),
            KeyEvent::from(KeyCode::Down),
        ]));
        assert_eq!(input.poll_action().unwrap(), Action::MoveDown);
        assert_eq!(input.poll_action().unwrap(), Action::None);
    }

    #[test]
    fn test_wait_returns_first_action() {
        let mut input = InputController::new(ScriptedKeys::idle_after(vec![
            KeyEvent::from(KeyCode::Enter),
            KeyEvent::from(KeyCode::Esc),
        ]));
        let action = input.wait_for_action(Duration::from_millis(50)).unwrap();
        assert_eq!(action, Action::Confirm);
    }

    #[test]
    fn test_dismiss_ignores_navigation() {
        let mut input = InputController::new(ScriptedKeys::new(vec![
            KeyEvent::from(KeyCode::Down),
            KeyEvent::from(KeyCode::Enter),
            KeyEvent::from(KeyCode::Esc),
        ]));
        let shutdown = AtomicBool::new(false);
        assert_eq!(input.wait_for_dismiss(&shutdown).unwrap(), Action::Cancel);
    }

    proptest::proptest! {
        /// Only the bound letters map to actions.
        #[test]
        fn unbound_chars_decode_to_none(c in proptest::char::any()) {
            let bound = "wWsSqQ".contains(c);
            let action = decode_key(KeyEvent::from(KeyCode::Char(c)));
            proptest::prop_assert_eq!(action != Action::None, bound);
        }
    }

    fn stdin_keys(bytes: &[u8]) -> (StdinKeys, mpsc::Sender<u8>) {
        let (tx, rx) = mpsc::channel();
        for b in bytes {
            tx.send(*b).unwrap();
        }
        (StdinKeys::from_channel(rx), tx)
    }

    #[test]
    fn test_stdin_arrow_and_letters() {
        let (mut keys, _tx) = stdin_keys(b"\x1b[Bw\r");
        let now = Instant::now();
        let mut read = || decode_key(keys.read_key(now).unwrap().unwrap());
        assert_eq!(read(), Action::MoveDown);
        assert_eq!(read(), Action::MoveUp);
        assert_eq!(read(), Action::Confirm);
        assert_eq!(keys.read_key(Instant::now()).unwrap(), None);
    }

    #[test]
    fn test_incomplete_escape_cancels_within_timeout() {
        let (mut keys, _tx) = stdin_keys(b"\x1b[");
        let started = Instant::now();
        // Even a non-blocking read resolves the dangling sequence.
        let key = keys.read_key(started).unwrap().unwrap();
        let waited = started.elapsed();
        assert_eq!(decode_key(key), Action::Cancel);
        assert!(waited >= ESCAPE_TIMEOUT);
        assert!(waited < Duration::from_secs(1));
    }

    #[test]
    fn test_esc_after_incomplete_escape_is_kept() {
        let (mut keys, _tx) = stdin_keys(b"\x1b[\x1b");
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(decode_key(keys.read_key(deadline).unwrap().unwrap()), Action::Cancel);
        assert_eq!(decode_key(keys.read_key(deadline).unwrap().unwrap()), Action::Cancel);
        assert_eq!(keys.read_key(Instant::now()).unwrap(), None);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let (mut keys, tx) = stdin_keys(b"");
        drop(tx);
        assert!(matches!(
            keys.read_key(Instant::now()),
            Err(InputError::Read(_))
        ));
    }

    #[test]
    fn test_dismiss_observes_shutdown() {
        let mut input = InputController::new(ScriptedKeys::idle());
        let shutdown = AtomicBool::new(true);
        assert_eq!(input.wait_for_dismiss(&shutdown).unwrap(), Action::Quit);
    }
}
