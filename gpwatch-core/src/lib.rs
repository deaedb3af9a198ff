//! gpwatch core — everything the live dashboard needs except the terminal.
//!
//! This crate contains:
//! - Domain types (symbols, quotes, history points)
//! - Bounded per-symbol price history
//! - Wrap-around selection cursor
//! - Refresh scheduling
//! - Profit/loss against a purchase price
//! - Stock list and configuration loading
//! - The quote fetcher trait, a Yahoo Finance implementation and batch refresh
//! - View models handed to a renderer

pub mod config;
pub mod data;
pub mod domain;
pub mod history;
pub mod market;
pub mod navigation;
pub mod pnl;
pub mod portfolio;
pub mod schedule;
pub mod view;

pub use config::{Config, ConfigError};
pub use data::{CircuitBreaker, FetchError, QuoteFetcher, RefreshBatch, Refresher, YahooFetcher};
pub use domain::{HistoryPoint, Quote, Symbol};
pub use history::{PriceHistory, MIN_CHART_POINTS};
pub use market::MarketState;
pub use navigation::NavigationState;
pub use pnl::ProfitLoss;
pub use portfolio::{LoadError, Portfolio};
pub use schedule::RefreshScheduler;
pub use view::{ChartStats, ChartView, Notice, NoticeLevel, Progress, RowView, TableView};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the refresh pool touches is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Symbol>();
        require_sync::<Symbol>();
        require_send::<Quote>();
        require_sync::<Quote>();
        require_send::<FetchError>();
        require_sync::<FetchError>();
        require_send::<RefreshBatch>();
        require_sync::<RefreshBatch>();
        require_send::<YahooFetcher>();
        require_sync::<YahooFetcher>();
    }
}
