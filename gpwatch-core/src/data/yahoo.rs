//! Yahoo Finance quote fetcher.
//!
//! Reads the `meta` block of Yahoo's v8 chart API, which carries the latest
//! market price, currency and company name. Retries back off exponentially
//! (stretched to a capped Retry-After on 429) and trip the shared circuit
//! breaker only on provider-wide signals.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; a changed payload surfaces as a per-symbol fetch error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{FetchError, QuoteFetcher};
use crate::domain::{Quote, Symbol};

/// Exchange suffix for Warsaw-listed symbols.
pub const WARSAW_SUFFIX: &str = ".WA";

/// Currency assumed when the provider omits one.
pub const DEFAULT_CURRENCY: &str = "PLN";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

/// Longest server-requested wait honoured between retries.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Reported in [`FetchError::RateLimited`] when a 429 carries no Retry-After.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Granularity of cancellable sleeps between retries.
const CANCEL_SLICE: Duration = Duration::from_millis(50);

/// Outcome of a failed attempt.
#[derive(Debug, PartialEq)]
enum Attempt {
    /// Try again after `wait`; `error` is reported if retries run out.
    Retry { error: FetchError, wait: Duration },
    /// Give up on this symbol now.
    Fail(FetchError),
}

pub struct YahooFetcher {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    cancel: Arc<AtomicBool>,
    suffix: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooFetcher {
    /// Fetcher for Warsaw-listed symbols.
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            cancel: Arc::new(AtomicBool::new(false)),
            suffix: WARSAW_SUFFIX.to_string(),
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        })
    }

    /// Abandon retries and pending fetches once `cancel` is raised.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Use a different exchange suffix (empty for US listings).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Provider-side ticker: `PKO` → `PKO.WA`.
    pub fn remote_symbol(&self, symbol: &Symbol) -> String {
        let raw = symbol.as_str();
        if self.suffix.is_empty() || raw.ends_with(&self.suffix) {
            raw.to_string()
        } else {
            format!("{raw}{}", self.suffix)
        }
    }

    fn chart_url(remote: &str) -> String {
        format!("https://query2.finance.yahoo.com/v8/finance/chart/{remote}?interval=1d&range=1d")
    }

    /// Turn a chart response into a quote.
    ///
    /// Price preference: live market price, then the previous session's close.
    fn parse_response(symbol: &Symbol, resp: ChartResponse) -> Result<Quote, FetchError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                FetchError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => FetchError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let meta = result
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("result array is empty".into()))?
            .meta;

        let price = meta
            .regular_market_price
            .filter(|p| *p > 0.0)
            .or_else(|| {
                let close = meta.previous_close.or(meta.chart_previous_close);
                if close.is_some() {
                    log::debug!("{symbol}: no live price, using previous close");
                }
                close
            })
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| FetchError::NoPrice {
                symbol: symbol.to_string(),
            })?;

        Ok(Quote {
            symbol: symbol.clone(),
            display_name: meta
                .long_name
                .or(meta.short_name)
                .unwrap_or_else(|| symbol.to_string()),
            price,
            currency: meta.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt)
    }

    /// Fail fast on shutdown or an open breaker.
    fn admit(&self, symbol: &Symbol) -> Result<(), FetchError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(FetchError::Cancelled);
        }
        if !self.circuit_breaker.is_allowed() {
            log::debug!(
                "{symbol}: skipped, provider cooldown {}s left",
                self.circuit_breaker.remaining_cooldown().as_secs()
            );
            return Err(FetchError::CircuitBreakerTripped);
        }
        Ok(())
    }

    /// Sleep for `wait`, waking early when cancelled.
    fn pause(&self, wait: Duration) -> Result<(), FetchError> {
        let deadline = Instant::now() + wait;
        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return Err(FetchError::Cancelled);
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(());
            }
            std::thread::sleep(left.min(CANCEL_SLICE));
        }
    }

    /// Map a non-success HTTP status to the next step.
    ///
    /// Only 403 and repeated 429s reach the shared breaker; anything else
    /// stays an error for this symbol alone.
    fn classify_status(
        &self,
        symbol: &Symbol,
        status: StatusCode,
        retry_after: Option<u64>,
        attempt: u32,
    ) -> Attempt {
        match status {
            StatusCode::FORBIDDEN => {
                log::warn!("{symbol}: provider answered 403, pausing requests");
                self.circuit_breaker.trip();
                Attempt::Fail(FetchError::CircuitBreakerTripped)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.circuit_breaker.record_rate_limited(symbol);
                let hint = retry_after
                    .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
                    .unwrap_or_default();
                Attempt::Retry {
                    error: FetchError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                    },
                    wait: self.backoff(attempt).max(hint),
                }
            }
            StatusCode::NOT_FOUND => Attempt::Fail(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            _ => Attempt::Retry {
                error: FetchError::Other(format!("HTTP {status} for {symbol}")),
                wait: self.backoff(attempt),
            },
        }
    }

    /// One HTTP request.
    fn send_once(&self, symbol: &Symbol, url: &str, attempt: u32) -> Result<Quote, Attempt> {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(Attempt::Retry {
                    error: FetchError::NetworkUnreachable(e.to_string()),
                    wait: self.backoff(attempt),
                });
            }
            Err(e) => return Err(Attempt::Fail(FetchError::NetworkUnreachable(e.to_string()))),
        };

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(self.classify_status(symbol, status, retry_after, attempt));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            Attempt::Fail(FetchError::ResponseFormatChanged(format!(
                "failed to parse response for {symbol}: {e}"
            )))
        })?;

        let quote = Self::parse_response(symbol, chart).map_err(Attempt::Fail)?;
        self.circuit_breaker.record_success();
        Ok(quote)
    }

    /// Drive `send` until it succeeds, fails for good, or retries run out.
    fn with_retries<T>(
        &self,
        symbol: &Symbol,
        mut send: impl FnMut(u32) -> Result<T, Attempt>,
    ) -> Result<T, FetchError> {
        self.admit(symbol)?;
        let mut attempt = 0;
        loop {
            match send(attempt) {
                Ok(value) => return Ok(value),
                Err(Attempt::Fail(error)) => return Err(error),
                Err(Attempt::Retry { error, .. }) if attempt >= self.max_retries => {
                    return Err(error)
                }
                Err(Attempt::Retry { error, wait }) => {
                    log::debug!(
                        "{symbol}: attempt {} failed ({error}), retrying in {}ms",
                        attempt + 1,
                        wait.as_millis()
                    );
                    self.pause(wait)?;
                    self.admit(symbol)?;
                    attempt += 1;
                }
            }
        }
    }

    fn fetch_with_retry(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let url = Self::chart_url(&self.remote_symbol(symbol));
        self.with_retries(symbol, |attempt| self.send_once(symbol, &url, attempt))
    }
}

impl QuoteFetcher for YahooFetcher {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        self.fetch_with_retry(symbol)
    }
}
