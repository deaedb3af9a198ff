//! Domain types: symbols, quotes and history points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker identifier, always upper-case.
///
/// The remote-side suffix (e.g. `.WA` for the Warsaw exchange) is not part of
/// the symbol; fetchers add it when they build requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Trim and upper-case `raw`.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A price snapshot for one symbol, produced by a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    /// Company name as reported by the provider, or the symbol when none is known.
    pub display_name: String,
    pub price: f64,
    pub currency: String,
}

/// One observed price, labelled with the wall-clock time of the refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// `HH:MM:SS` of the refresh cycle that produced the price.
    pub label: String,
    pub price: f64,
}

impl HistoryPoint {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}
