//! Test doubles for the session: scripted keys, recording renderer, stub fetcher.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gpwatch_core::{ChartView, FetchError, Quote, QuoteFetcher, Symbol, TableView};

use crate::input::{InputError, KeySource};
use crate::render::Renderer;

/// Plays back a fixed list of keys without waiting.
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
    /// Sent once the script runs out; `None` means stay idle forever.
    then: Option<KeyEvent>,
}

impl ScriptedKeys {
    /// `keys`, then Ctrl+C so a session under test always ends.
    pub fn new(keys: Vec<KeyEvent>) -> Self {
        Self {
            keys: keys.into(),
            then: Some(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        }
    }

    /// `keys`, then nothing.
    pub fn idle_after(keys: Vec<KeyEvent>) -> Self {
        Self {
            keys: keys.into(),
            then: None,
        }
    }

    pub fn idle() -> Self {
        Self::idle_after(Vec::new())
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        Ok(self.keys.pop_front().or(self.then))
    }
}

pub fn keys(codes: &[KeyCode]) -> Vec<KeyEvent> {
    codes.iter().copied().map(KeyEvent::from).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Table(TableView),
    Chart(ChartView),
    Invalidate,
}

/// Keeps every frame it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Frame>,
}

impl RecordingRenderer {
    pub fn last_table(&self) -> Option<&TableView> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Table(view) => Some(view),
            _ => None,
        })
    }

    pub fn charts(&self) -> Vec<&ChartView> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Chart(view) => Some(view),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_table(&mut self, view: &TableView) -> io::Result<()> {
        self.frames.push(Frame::Table(view.clone()));
        Ok(())
    }

    fn draw_chart(&mut self, view: &ChartView) -> io::Result<()> {
        self.frames.push(Frame::Chart(view.clone()));
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.frames.push(Frame::Invalidate);
        Ok(())
    }
}

/// Serves prices from a table; symbols listed in `failing` error out.
#[derive(Default)]
pub struct StubFetcher {
    prices: Mutex<HashMap<Symbol, f64>>,
    failing: Mutex<Vec<Symbol>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn with_prices(prices: &[(&str, f64)]) -> Self {
        let stub = Self::default();
        for (symbol, price) in prices {
            stub.set_price(symbol, *price);
        }
        stub
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices
            .lock()
            .unwrap()
            .insert(Symbol::new(symbol), price);
    }

    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().push(Symbol::new(symbol));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuoteFetcher for StubFetcher {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(FetchError::NetworkUnreachable("stub offline".into()));
        }
        let price = self
            .prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(Quote {
            symbol: symbol.clone(),
            display_name: format!("{symbol} S.A."),
            price,
            currency: "PLN".into(),
        })
    }
}
