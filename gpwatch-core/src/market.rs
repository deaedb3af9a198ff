//! Everything observed about the portfolio during a session.
//!
//! `MarketState` owns the last known quote per symbol, the bounded price
//! history and the set of symbols whose latest fetch failed. It only changes
//! when a whole [`RefreshBatch`] is applied, so a frame built from it never
//! shows a half-applied refresh.

use std::collections::{HashMap, HashSet};

use crate::data::yahoo::DEFAULT_CURRENCY;
use crate::data::RefreshBatch;
use crate::domain::{Quote, Symbol};
use crate::history::PriceHistory;
use crate::navigation::NavigationState;
use crate::pnl::ProfitLoss;
use crate::portfolio::Portfolio;
use crate::view::{ChartView, RowView};

#[derive(Debug, Clone)]
pub struct MarketState {
    portfolio: Portfolio,
    history: PriceHistory,
    last_known: HashMap<Symbol, Quote>,
    errored: HashSet<Symbol>,
    refreshes: u64,
}

impl MarketState {
    pub fn new(portfolio: Portfolio, max_history: usize) -> Self {
        Self {
            portfolio,
            history: PriceHistory::new(max_history),
            last_known: HashMap::new(),
            errored: HashSet::new(),
            refreshes: 0,
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn last_known(&self, symbol: &Symbol) -> Option<&Quote> {
        self.last_known.get(symbol)
    }

    pub fn is_errored(&self, symbol: &Symbol) -> bool {
        self.errored.contains(symbol)
    }

    /// Number of refresh batches applied so far.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Apply a refresh cycle.
    ///
    /// Successful quotes replace the cached quote and extend history. Failed
    /// symbols keep whatever was cached before and are flagged until the next
    /// batch.
    pub fn apply(&mut self, batch: RefreshBatch) {
        self.errored.clear();
        for (symbol, result) in batch.results {
            match result {
                Ok(quote) => {
                    self.history.add(&symbol, batch.label.as_str(), quote.price);
                    self.last_known.insert(symbol, quote);
                }
                Err(e) => {
                    log::warn!("fetch failed for {symbol}: {e}");
                    self.errored.insert(symbol);
                }
            }
        }
        self.refreshes += 1;
    }

    /// Table rows in portfolio order.
    pub fn rows(&self, navigation: &NavigationState) -> Vec<RowView> {
        self.portfolio
            .entries()
            .enumerate()
            .map(|(index, (symbol, purchase_price))| {
                let quote = self.last_known.get(symbol).cloned();
                let profit_loss = quote
                    .as_ref()
                    .and_then(|q| ProfitLoss::calculate(q.price, purchase_price));
                RowView {
                    symbol: symbol.clone(),
                    quote,
                    profit_loss,
                    selected: navigation.is_selected(index),
                    errored: self.errored.contains(symbol),
                }
            })
            .collect()
    }

    /// Chart for `symbol`, or `None` while it has fewer than two points.
    pub fn chart(&self, symbol: &Symbol, max_width: u16, max_height: u16) -> Option<ChartView> {
        let currency = self
            .last_known
            .get(symbol)
            .map_or(DEFAULT_CURRENCY, |q| q.currency.as_str());
        ChartView::new(
            symbol.clone(),
            currency,
            &self.history.get(symbol),
            max_width,
            max_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FetchError;
    use std::io::Cursor;

    fn portfolio() -> Portfolio {
        Portfolio::parse(Cursor::new("PKO,40\nKGHM\nCDR,200\n")).unwrap()
    }

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: Symbol::new(symbol),
            display_name: format!("{symbol} S.A."),
            price,
            currency: "PLN".into(),
        }
    }

    fn batch(label: &str, results: Vec<(&str, Result<f64, ()>)>) -> RefreshBatch {
        RefreshBatch {
            label: label.into(),
            results: results
                .into_iter()
                .map(|(s, r)| {
                    let outcome = r
                        .map(|p| quote(s, p))
                        .map_err(|_| FetchError::NetworkUnreachable("down".into()));
                    (Symbol::new(s), outcome)
                })
                .collect(),
        }
    }

    fn navigation(state: &MarketState) -> NavigationState {
        NavigationState::new(state.portfolio().symbols().to_vec()).unwrap()
    }

    #[test]
    fn never_fetched_rows_have_no_quote() {
        let state = MarketState::new(portfolio(), 10);
        let rows = state.rows(&navigation(&state));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.quote.is_none() && !r.errored));
        assert!(rows[0].selected);
    }

    #[test]
    fn failure_keeps_cached_quote_and_spares_others() {
        let mut state = MarketState::new(portfolio(), 10);
        state.apply(batch("10:00:00", vec![("PKO", Ok(44.0)), ("KGHM", Ok(120.0)), ("CDR", Ok(210.0))]));
        state.apply(batch("10:00:30", vec![("PKO", Ok(45.0)), ("KGHM", Err(())), ("CDR", Ok(220.0))]));

        let kghm = Symbol::new("KGHM");
        assert_eq!(state.last_known(&kghm).unwrap().price, 120.0);
        assert!(state.is_errored(&kghm));
        assert_eq!(state.history().len(&kghm), 1);

        assert_eq!(state.history().len(&Symbol::new("PKO")), 2);
        assert_eq!(state.history().len(&Symbol::new("CDR")), 2);
        assert!(!state.is_errored(&Symbol::new("PKO")));

        let rows = state.rows(&navigation(&state));
        assert!(rows[1].errored);
        assert_eq!(rows[1].quote.as_ref().unwrap().price, 120.0);
        assert!(!rows[0].errored && !rows[2].errored);
    }

    #[test]
    fn error_flag_clears_on_next_success() {
        let mut state = MarketState::new(portfolio(), 10);
        state.apply(batch("a", vec![("PKO", Err(()))]));
        assert!(state.is_errored(&Symbol::new("PKO")));
        state.apply(batch("b", vec![("PKO", Ok(41.0))]));
        assert!(!state.is_errored(&Symbol::new("PKO")));
        assert_eq!(state.refreshes(), 2);
    }

    #[test]
    fn rows_carry_profit_loss() {
        let mut state = MarketState::new(portfolio(), 10);
        state.apply(batch("a", vec![("PKO", Ok(44.0)), ("KGHM", Ok(120.0))]));
        let rows = state.rows(&navigation(&state));
        let pko = rows[0].profit_loss.unwrap();
        assert!((pko.amount - 4.0).abs() < 1e-9);
        // No purchase price, no P/L.
        assert!(rows[1].profit_loss.is_none());
    }

    #[test]
    fn chart_uses_cached_currency() {
        let mut state = MarketState::new(portfolio(), 10);
        let pko = Symbol::new("PKO");
        assert!(state.chart(&pko, 80, 20).is_none());
        state.apply(batch("a", vec![("PKO", Ok(44.0))]));
        assert!(state.chart(&pko, 80, 20).is_none());
        state.apply(batch("b", vec![("PKO", Ok(46.0))]));
        let chart = state.chart(&pko, 80, 20).unwrap();
        assert_eq!(chart.currency, "PLN");
        assert_eq!(chart.points, vec![("a".to_string(), 44.0), ("b".to_string(), 46.0)]);
    }
}
