//! Bounded per-symbol price history.
//!
//! Each symbol keeps at most `max_history` points, oldest first. Adding a point
//! beyond the cap evicts the oldest one (FIFO by insertion, reads never affect
//! eviction order). Reads return owned snapshots, so a caller holding a
//! sequence never sees it shrink under a later `add`.

use std::collections::{HashMap, VecDeque};

use crate::domain::{HistoryPoint, Symbol};

/// Minimum number of points needed to draw a chart.
pub const MIN_CHART_POINTS: usize = 2;

/// Default history window when no configuration overrides it.
pub const DEFAULT_MAX_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct PriceHistory {
    max_history: usize,
    series: HashMap<Symbol, VecDeque<HistoryPoint>>,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl PriceHistory {
    /// Create an empty history. A cap of zero is raised to one.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history: max_history.max(1),
            series: HashMap::new(),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Append a point for `symbol`, evicting the oldest one once the cap is hit.
    pub fn add(&mut self, symbol: &Symbol, label: impl Into<String>, price: f64) {
        let cap = self.max_history;
        let points = self
            .series
            .entry(symbol.clone())
            .or_insert_with(|| VecDeque::with_capacity(cap));

        if points.len() == cap {
            points.pop_front();
        }
        points.push_back(HistoryPoint::new(label, price));
    }

    /// Snapshot of the retained points for `symbol`, oldest first.
    ///
    /// Unknown symbols yield an empty vector.
    pub fn get(&self, symbol: &Symbol) -> Vec<HistoryPoint> {
        self.series
            .get(symbol)
            .map(|points| points.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, symbol: &Symbol) -> usize {
        self.series.get(symbol).map_or(0, VecDeque::len)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.series.contains_key(symbol)
    }

    /// Whether `symbol` has at least `min_points` retained points.
    pub fn has_enough_data(&self, symbol: &Symbol, min_points: usize) -> bool {
        self.len(symbol) >= min_points
    }

    /// Chart readiness with the default threshold.
    pub fn is_chartable(&self, symbol: &Symbol) -> bool {
        self.has_enough_data(symbol, MIN_CHART_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(history: &PriceHistory, symbol: &Symbol) -> Vec<f64> {
        history.get(symbol).iter().map(|p| p.price).collect()
    }

    #[test]
    fn evicts_oldest_once_full() {
        let x = Symbol::new("X");
        let mut history = PriceHistory::new(3);
        for (i, price) in [10.0, 11.0, 12.0, 13.0].into_iter().enumerate() {
            history.add(&x, format!("t{i}"), price);
        }
        assert_eq!(prices(&history, &x), vec![11.0, 12.0, 13.0]);
        assert_eq!(history.get(&x)[0].label, "t1");
    }

    #[test]
    fn unknown_symbol_is_empty() {
        let history = PriceHistory::new(5);
        let ghost = Symbol::new("GHOST");
        assert!(history.get(&ghost).is_empty());
        assert!(!history.contains(&ghost));
        assert!(!history.is_chartable(&ghost));
    }

    #[test]
    fn enough_data_threshold() {
        let pko = Symbol::new("PKO");
        let mut history = PriceHistory::new(10);
        history.add(&pko, "10:00:00", 45.0);
        assert!(!history.has_enough_data(&pko, 2));
        history.add(&pko, "10:00:30", 45.5);
        assert!(history.has_enough_data(&pko, 2));
        assert!(!history.has_enough_data(&pko, 3));
    }

    #[test]
    fn snapshot_is_detached_from_later_adds() {
        let pko = Symbol::new("PKO");
        let mut history = PriceHistory::new(2);
        history.add(&pko, "a", 1.0);
        history.add(&pko, "b", 2.0);
        let snapshot = history.get(&pko);
        history.add(&pko, "c", 3.0);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].price, 1.0);
        assert_eq!(prices(&history, &pko), vec![2.0, 3.0]);
    }

    #[test]
    fn zero_cap_is_raised_to_one() {
        let pko = Symbol::new("PKO");
        let mut history = PriceHistory::new(0);
        history.add(&pko, "a", 1.0);
        history.add(&pko, "b", 2.0);
        assert_eq!(history.max_history(), 1);
        assert_eq!(prices(&history, &pko), vec![2.0]);
    }

    #[test]
    fn symbols_are_independent() {
        let a = Symbol::new("A");
        let b = Symbol::new("B");
        let mut history = PriceHistory::new(2);
        history.add(&a, "1", 1.0);
        history.add(&a, "2", 2.0);
        history.add(&a, "3", 3.0);
        history.add(&b, "1", 9.0);
        assert_eq!(prices(&history, &a), vec![2.0, 3.0]);
        assert_eq!(prices(&history, &b), vec![9.0]);
    }
}
