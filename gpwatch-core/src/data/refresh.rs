//! One refresh cycle: fetch every symbol, collect the outcomes as a batch.
//!
//! Symbols are fetched in parallel on a private rayon pool (never the global
//! one), so a cycle takes roughly as long as its slowest symbol. Nothing is
//! applied while fetching; the caller gets the whole batch at once.

use rayon::prelude::*;

use super::provider::{FetchError, QuoteFetcher};
use crate::domain::{Quote, Symbol};

/// Upper bound on concurrent requests.
const MAX_REFRESH_THREADS: usize = 8;

/// Outcome of one refresh cycle, in symbol order.
#[derive(Debug, Clone)]
pub struct RefreshBatch {
    /// `HH:MM:SS` label stamped on every history point of this cycle.
    pub label: String,
    pub results: Vec<(Symbol, Result<Quote, FetchError>)>,
}

impl RefreshBatch {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Runs refresh cycles on its own thread pool.
pub struct Refresher {
    pool: rayon::ThreadPool,
}

impl Refresher {
    /// Pool sized for `symbol_count` symbols.
    pub fn new(symbol_count: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(symbol_count.clamp(1, MAX_REFRESH_THREADS))
            .thread_name(|i| format!("gpwatch-fetch-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fetch all `symbols` and return the outcomes in the same order.
    pub fn run<F>(&self, fetcher: &F, symbols: &[Symbol], label: impl Into<String>) -> RefreshBatch
    where
        F: QuoteFetcher + ?Sized,
    {
        let results = self.pool.install(|| {
            symbols
                .par_iter()
                .map(|symbol| (symbol.clone(), fetcher.fetch(symbol)))
                .collect()
        });
        RefreshBatch {
            label: label.into(),
            results,
        }
    }
}
