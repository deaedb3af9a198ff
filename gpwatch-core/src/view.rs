//! View models handed to a renderer.
//!
//! These are plain data: everything a renderer needs to draw a frame, with no
//! access back into session state.

use crate::domain::{HistoryPoint, Quote, Symbol};
use crate::pnl::ProfitLoss;

/// One table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub symbol: Symbol,
    /// Last successfully fetched quote; `None` if the symbol never loaded.
    pub quote: Option<Quote>,
    pub profit_loss: Option<ProfitLoss>,
    pub selected: bool,
    /// The most recent refresh failed for this symbol.
    pub errored: bool,
}

impl RowView {
    /// Currency of the cached quote, if any.
    pub fn currency(&self) -> Option<&str> {
        self.quote.as_ref().map(|q| q.currency.as_str())
    }
}

/// Countdown to the next refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub remaining_secs: u64,
    /// Remaining share of the interval, `1.0` right after a refresh.
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Short-lived status line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Warning,
        }
    }
}

/// The whole table frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// `YYYY-MM-DD HH:MM:SS` of the last refresh, empty before the first one.
    pub updated_at: String,
    pub rows: Vec<RowView>,
    pub progress: Progress,
    pub notice: Option<Notice>,
}

/// Summary line under the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStats {
    pub current: f64,
    pub high: f64,
    pub low: f64,
    /// Last price minus first retained price.
    pub change: f64,
    /// `change` relative to the first retained price; 0 when that price is 0.
    pub change_pct: f64,
    pub count: usize,
}

impl ChartStats {
    /// `None` for an empty series.
    pub fn from_points(points: &[HistoryPoint]) -> Option<Self> {
        let first = points.first()?.price;
        let current = points.last()?.price;
        let high = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        let low = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let change = current - first;
        let change_pct = if first != 0.0 { change / first * 100.0 } else { 0.0 };
        Some(Self {
            current,
            high,
            low,
            change,
            change_pct,
            count: points.len(),
        })
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// Fullscreen chart for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub symbol: Symbol,
    pub currency: String,
    /// `(time label, price)` oldest first, already reduced to `max_width` columns.
    pub points: Vec<(String, f64)>,
    pub stats: ChartStats,
    /// Size hints from the configuration.
    pub max_width: u16,
    pub max_height: u16,
}

impl ChartView {
    /// Build a chart model; `None` when fewer than two points are retained.
    pub fn new(
        symbol: Symbol,
        currency: impl Into<String>,
        history: &[HistoryPoint],
        max_width: u16,
        max_height: u16,
    ) -> Option<Self> {
        if history.len() < crate::history::MIN_CHART_POINTS {
            return None;
        }
        let stats = ChartStats::from_points(history)?;
        let points = resample(history, usize::from(max_width.max(2)))
            .into_iter()
            .map(|p| (p.label.clone(), p.price))
            .collect();
        Some(Self {
            symbol,
            currency: currency.into(),
            points,
            stats,
            max_width,
            max_height,
        })
    }

    /// First, middle and last time labels for the x axis.
    pub fn axis_labels(&self) -> Vec<&str> {
        match self.points.len() {
            0 => Vec::new(),
            1 => vec![self.points[0].0.as_str()],
            n => vec![
                self.points[0].0.as_str(),
                self.points[n / 2].0.as_str(),
                self.points[n - 1].0.as_str(),
            ],
        }
    }
}

/// Keep at most `width` points by stepping through the series evenly.
///
/// The last point is always kept so the chart ends at the current price.
fn resample(points: &[HistoryPoint], width: usize) -> Vec<&HistoryPoint> {
    if points.len() <= width {
        return points.iter().collect();
    }
    let step = points.len() as f64 / width as f64;
    let mut sampled: Vec<&HistoryPoint> = (0..width)
        .map(|i| &points[((i as f64 * step) as usize).min(points.len() - 1)])
        .collect();
    if let (Some(slot), Some(last)) = (sampled.last_mut(), points.last()) {
        *slot = last;
    }
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> Vec<HistoryPoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| HistoryPoint::new(format!("10:00:{i:02}"), p))
            .collect()
    }

    #[test]
    fn stats_summarize_series() {
        let stats = ChartStats::from_points(&series(&[100.0, 120.0, 90.0, 110.0])).unwrap();
        assert_eq!(stats.current, 110.0);
        assert_eq!(stats.high, 120.0);
        assert_eq!(stats.low, 90.0);
        assert!((stats.change - 10.0).abs() < 1e-9);
        assert!((stats.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(stats.count, 4);
        assert!(stats.is_up());
    }

    #[test]
    fn stats_zero_first_price() {
        let stats = ChartStats::from_points(&series(&[0.0, 5.0])).unwrap();
        assert_eq!(stats.change_pct, 0.0);
    }

    #[test]
    fn stats_empty_is_none() {
        assert!(ChartStats::from_points(&[]).is_none());
    }

    #[test]
    fn chart_needs_two_points() {
        let one = series(&[1.0]);
        assert!(ChartView::new(Symbol::new("PKO"), "PLN", &one, 80, 20).is_none());
        let two = series(&[1.0, 2.0]);
        assert!(ChartView::new(Symbol::new("PKO"), "PLN", &two, 80, 20).is_some());
    }

    #[test]
    fn long_series_is_resampled_to_width() {
        let prices: Vec<f64> = (0..50).map(f64::from).collect();
        let chart = ChartView::new(Symbol::new("PKO"), "PLN", &series(&prices), 10, 20).unwrap();
        assert_eq!(chart.points.len(), 10);
        assert_eq!(chart.points[0].1, 0.0);
        assert_eq!(chart.points[9].1, 49.0);
        // Stats still cover the full series.
        assert_eq!(chart.stats.count, 50);
        assert_eq!(chart.stats.high, 49.0);
    }

    #[test]
    fn axis_labels_first_middle_last() {
        let chart =
            ChartView::new(Symbol::new("PKO"), "PLN", &series(&[1.0, 2.0, 3.0]), 80, 20).unwrap();
        assert_eq!(chart.axis_labels(), vec!["10:00:00", "10:00:01", "10:00:02"]);
    }
}
