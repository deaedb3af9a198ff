//! gpwatch — live terminal monitor for Warsaw Stock Exchange prices.
//!
//! Usage: `gpwatch <STOCKS_FILE> [--config PATH] [--log-file PATH]`

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};
use log::LevelFilter;

use gpwatch_core::{CircuitBreaker, Config, Notice, Portfolio, YahooFetcher};
use gpwatch_tui::{InputController, SessionController, TerminalRenderer};

/// Log file used when `--log-file` is not given.
const LOG_FILE_ENV: &str = "GPWATCH_LOG_FILE";

#[derive(Parser)]
#[command(
    name = "gpwatch",
    about = "Live terminal monitor for GPW (Warsaw) stock prices"
)]
struct Args {
    /// Stock list: one `SYMBOL` or `SYMBOL,PURCHASE_PRICE` per line.
    stocks_file: PathBuf,

    /// Settings file. Defaults to ./config.toml, ./config.ini, then the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append logs to this file (also $GPWATCH_LOG_FILE). No logging otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .or_else(|| std::env::var_os(LOG_FILE_ENV).map(PathBuf::from));
    if let Some(path) = &log_file {
        init_logger(path)?;
    }

    let (config, config_error) = Config::load_or_default(args.config.as_deref());
    log::info!("config: {config:?}");

    let portfolio = match Portfolio::from_file(&args.stocks_file) {
        Ok(portfolio) => portfolio,
        Err(e) => {
            log::error!("{e}");
            eprintln!("gpwatch: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "loaded {} symbols from {}",
        portfolio.len(),
        args.stocks_file.display()
    );
    println!("Loading data for {} stocks...", portfolio.len());

    let input = InputController::terminal().context("terminal does not support raw mode")?;

    // Ctrl+C outside raw mode arrives as a signal, not a key.
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install the interrupt handler")?;

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let breaker = Arc::new(CircuitBreaker::default_provider());
    let fetcher = YahooFetcher::new(breaker)
        .context("failed to build the HTTP client")?
        .with_cancel(shutdown.clone());

    let renderer = TerminalRenderer::new().context("failed to set up the terminal")?;
    let mut session =
        SessionController::new(fetcher, renderer, input, portfolio, &config, shutdown)?;
    if let Some(e) = config_error {
        session.set_notice(Notice::warning(format!("{e}; using default settings")));
    }

    let result = session.run();

    // Restores the terminal.
    drop(session);
    println!("Goodbye!");
    log::info!("shutdown");
    result
}

/// Route `log` output to `path`. Default level info; `RUST_LOG` overrides.
fn init_logger(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
