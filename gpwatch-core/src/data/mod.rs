//! Quote sources and refresh cycles.

pub mod circuit_breaker;
pub mod provider;
pub mod refresh;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{FetchError, QuoteFetcher};
pub use refresh::{RefreshBatch, Refresher};
pub use yahoo::YahooFetcher;
