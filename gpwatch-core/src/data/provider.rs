//! Quote fetcher trait and structured error types.
//!
//! The QuoteFetcher trait abstracts over quote sources so the session can be
//! driven by Yahoo Finance in production and by stubs in tests.

use thiserror::Error;

use crate::domain::{Quote, Symbol};

/// Why a single symbol could not be fetched.
///
/// The session treats every variant the same way (inline error cell, cached
/// quote kept); the distinction only matters for logs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price available for {symbol}")]
    NoPrice { symbol: String },

    #[error("hard stop: quote provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("fetch cancelled by shutdown")]
    Cancelled,

    #[error("fetch error: {0}")]
    Other(String),
}

/// Synchronous quote source.
///
/// Implementations must be shareable across the refresh pool's threads.
pub trait QuoteFetcher: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the current quote for `symbol`.
    fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError>;
}

impl<F: QuoteFetcher + ?Sized> QuoteFetcher for std::sync::Arc<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        (**self).fetch(symbol)
    }
}
