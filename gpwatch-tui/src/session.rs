//! The live session: one loop multiplexing refresh timer, fetches and keys.
//!
//! ```text
//!            Confirm (>= 2 points)
//!   Table ───────────────────────────▶ Chart(symbol)
//!     ▲                                   │
//!     └──────────── Cancel ───────────────┘  (refresh countdown restarts)
//! ```
//!
//! Each table iteration: refresh if due, draw, poll keys, then a bounded key
//! wait instead of a sleep. Chart mode blocks on dismiss and suspends refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;

use gpwatch_core::{
    Config, MarketState, NavigationState, Notice, Portfolio, Progress, QuoteFetcher,
    RefreshScheduler, Refresher, Symbol, TableView,
};

use crate::input::{Action, InputController, KeySource};
use crate::render::Renderer;

/// Bounded key wait at the end of each table iteration.
pub const INPUT_WAIT: Duration = Duration::from_millis(50);

/// How long a notice stays on the status line once drawn.
pub const NOTICE_TTL: Duration = Duration::from_secs(2);

pub const NOT_ENOUGH_DATA: &str = "Not enough data to show chart yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Table,
    Chart(Symbol),
}

/// Whether the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SessionController<F, R, S> {
    fetcher: F,
    refresher: Refresher,
    renderer: R,
    input: InputController<S>,
    market: MarketState,
    navigation: NavigationState,
    scheduler: RefreshScheduler,
    plot_width: u16,
    plot_height: u16,
    mode: Mode,
    /// Expiry starts counting at the first frame that shows the notice.
    notice: Option<(Notice, Option<Instant>)>,
    updated_at: String,
    shutdown: Arc<AtomicBool>,
}

impl<F, R, S> SessionController<F, R, S>
where
    F: QuoteFetcher,
    R: Renderer,
    S: KeySource,
{
    pub fn new(
        fetcher: F,
        renderer: R,
        input: InputController<S>,
        portfolio: Portfolio,
        config: &Config,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        let navigation = NavigationState::new(portfolio.symbols().to_vec())
            .context("stock list has no symbols")?;
        let refresher =
            Refresher::new(portfolio.len()).context("failed to start the refresh pool")?;
        log::info!(
            "session: {} symbols, refresh every {}s, history {} points, fetcher {}",
            portfolio.len(),
            config.refresh_period().as_secs(),
            config.max_history,
            fetcher.name(),
        );
        Ok(Self {
            fetcher,
            refresher,
            renderer,
            input,
            market: MarketState::new(portfolio, config.max_history),
            navigation,
            scheduler: RefreshScheduler::new(config.refresh_period(), Instant::now()),
            plot_width: config.plot_width,
            plot_height: config.plot_height,
            mode: Mode::Table,
            notice: None,
            updated_at: String::new(),
            shutdown,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The notice still visible at `now`, if any.
    pub fn notice(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|(_, expires_at)| expires_at.map_or(true, |at| now < at))
            .map(|(notice, _)| notice)
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some((notice, None));
    }

    /// Run until Quit or the shutdown flag.
    pub fn run(&mut self) -> Result<()> {
        while self.tick(Instant::now())? == Flow::Continue {}
        log::info!("session ended after {} refreshes", self.market.refreshes());
        Ok(())
    }

    /// One table iteration.
    pub fn tick(&mut self, now: Instant) -> Result<Flow> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(Flow::Quit);
        }

        if self.scheduler.is_due(now) {
            self.refresh()?;
        }
        self.draw_table(now)?;

        let action = match self.input.poll_action()? {
            Action::None => self.input.wait_for_action(INPUT_WAIT)?,
            action => action,
        };
        self.handle_action(action, now)
    }

    /// Fetch every symbol and apply the batch in one step.
    pub fn refresh(&mut self) -> Result<()> {
        let label = Local::now().format("%H:%M:%S").to_string();
        let batch = self
            .refresher
            .run(&self.fetcher, self.navigation.symbols(), label);
        log::info!(
            "refresh: {} ok, {} failed",
            batch.succeeded(),
            batch.failed()
        );
        self.market.apply(batch);
        self.updated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        // Slow fetches push the schedule back; no drift correction.
        self.scheduler.complete(Instant::now());
        // Keys typed during the fetch may have been echoed.
        self.renderer.invalidate()?;
        Ok(())
    }

    pub fn table_view(&self, now: Instant) -> TableView {
        TableView {
            updated_at: self.updated_at.clone(),
            rows: self.market.rows(&self.navigation),
            progress: Progress {
                remaining_secs: self.scheduler.remaining(now).as_secs(),
                fraction: self.scheduler.fraction_remaining(now),
            },
            notice: self.notice(now).cloned(),
        }
    }

    fn draw_table(&mut self, now: Instant) -> Result<()> {
        if let Some((_, expires_at @ None)) = &mut self.notice {
            *expires_at = Some(now + NOTICE_TTL);
        }
        let view = self.table_view(now);
        self.renderer.draw_table(&view)?;
        Ok(())
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) -> Result<Flow> {
        match action {
            Action::MoveUp => {
                self.navigation.move_up();
                self.draw_table(now)?;
            }
            Action::MoveDown => {
                self.navigation.move_down();
                self.draw_table(now)?;
            }
            Action::Confirm => {
                let symbol = self.navigation.selected().clone();
                if self.market.history().is_chartable(&symbol) {
                    return self.show_chart(symbol);
                }
                self.set_notice(Notice::warning(NOT_ENOUGH_DATA));
                self.draw_table(now)?;
            }
            Action::Quit => return Ok(Flow::Quit),
            Action::Cancel | Action::None => {}
        }
        Ok(Flow::Continue)
    }

    /// Chart mode: draw once, block until dismissed, back to the table.
    fn show_chart(&mut self, symbol: Symbol) -> Result<Flow> {
        let Some(view) = self.market.chart(&symbol, self.plot_width, self.plot_height) else {
            return Ok(Flow::Continue);
        };
        log::debug!("chart: {symbol} ({} points)", view.stats.count);
        self.mode = Mode::Chart(symbol);
        self.renderer.draw_chart(&view)?;

        let action = self.input.wait_for_dismiss(&self.shutdown)?;

        self.mode = Mode::Table;
        self.scheduler.restart(Instant::now());
        self.renderer.invalidate()?;
        log::debug!("chart: back to table");
        Ok(match action {
            Action::Quit => Flow::Quit,
            _ => Flow::Continue,
        })
    }
}
