//! Renderer seam between the session and the terminal.

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use gpwatch_core::{ChartView, TableView};

use crate::ui;

/// Draws view models. The session owns exactly one.
pub trait Renderer {
    fn draw_table(&mut self, view: &TableView) -> io::Result<()>;

    fn draw_chart(&mut self, view: &ChartView) -> io::Result<()>;

    /// Force the next draw to repaint every cell, e.g. after keys typed
    /// outside raw mode were echoed over the dashboard.
    fn invalidate(&mut self) -> io::Result<()>;
}

/// ratatui renderer on the alternate screen.
///
/// Leaves the alternate screen when dropped.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TerminalRenderer {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Leave the alternate screen and show the cursor again.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Renderer for TerminalRenderer {
    fn draw_table(&mut self, view: &TableView) -> io::Result<()> {
        self.terminal.draw(|f| ui::draw_table(f, view))?;
        Ok(())
    }

    fn draw_chart(&mut self, view: &ChartView) -> io::Result<()> {
        self.terminal.draw(|f| ui::draw_chart(f, view))?;
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.terminal.clear()
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpwatch_core::{
        HistoryPoint, Notice, ProfitLoss, Progress, Quote, RowView, Symbol,
    };
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn row(symbol: &str, price: Option<f64>, errored: bool, selected: bool) -> RowView {
        let quote = price.map(|p| Quote {
            symbol: Symbol::new(symbol),
            display_name: format!("{symbol} S.A."),
            price: p,
            currency: "PLN".into(),
        });
        RowView {
            symbol: Symbol::new(symbol),
            profit_loss: price.and_then(|p| ProfitLoss::calculate(p, 40.0)),
            quote,
            selected,
            errored,
        }
    }

    #[test]
    fn test_table_screen_shows_rows_and_notice() {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let view = TableView {
            updated_at: "2024-05-01 10:00:00".into(),
            rows: vec![
                row("PKO", Some(44.0), false, true),
                row("KGHM", Some(120.0), true, false),
                row("CDR", None, true, false),
            ],
            progress: Progress {
                remaining_secs: 12,
                fraction: 0.4,
            },
            notice: Some(Notice::warning("Not enough data to show chart yet.")),
        };
        terminal.draw(|f| ui::draw_table(f, &view)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("2024-05-01 10:00:00"));
        assert!(text.contains("PKO S.A."));
        assert!(text.contains("+10.00%"));
        assert!(text.contains("(stale)"));
        assert!(text.contains("Error fetching data"));
        assert!(text.contains("Next refresh in 12s"));
        assert!(text.contains("Not enough data to show chart yet."));
    }

    #[test]
    fn test_chart_screen_shows_stats() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let history = vec![
            HistoryPoint::new("10:00:00", 40.0),
            HistoryPoint::new("10:00:30", 42.0),
            HistoryPoint::new("10:01:00", 41.0),
        ];
        let view = ChartView::new(Symbol::new("PKO"), "PLN", &history, 60, 15).unwrap();
        terminal.draw(|f| ui::draw_chart(f, &view)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("PKO (PLN)"));
        assert!(text.contains("High"));
        assert!(text.contains("42.00"));
        assert!(text.contains("+2.50%"));
        assert!(text.contains("Points 3"));
        assert!(text.contains("Esc"));
    }
}
