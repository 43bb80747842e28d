//! CoveLab CLI: run, sweep, and inspect commands.
//!
//! Commands:
//! - `run`: backtest a portfolio from a price table and write CSV/JSON artifacts
//! - `sweep`: rank short/long window combinations by delta
//! - `tickers`: list the tickers in a price table with their date ranges
//!
//! Settings come from an optional TOML config; command-line flags override it.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use covelab_core::data::{PriceTable, Universe};
use covelab_runner::export::{save_artifacts, sweep_csv};
use covelab_runner::{run_backtest, run_sweep, BacktestConfig, BacktestRun, SweepGrid};

#[derive(Parser)]
#[command(
    name = "covelab",
    about = "CoveLab CLI: moving-average crossover portfolio backtester"
)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a portfolio and save signals, ledgers and the portfolio aggregate.
    Run {
        #[command(flatten)]
        backtest: BacktestArgs,

        /// Print the trade list and final ledger row for one ticker.
        #[arg(long)]
        detail: Option<String>,

        /// Output directory for CSV and JSON artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run a grid of short/long windows and rank them by delta.
    Sweep {
        #[command(flatten)]
        backtest: BacktestArgs,

        /// Short windows to try (comma-separated).
        #[arg(long, value_delimiter = ',', default_values_t = [10, 20, 30])]
        short_windows: Vec<usize>,

        /// Long windows to try (comma-separated).
        #[arg(long, value_delimiter = ',', default_values_t = [50, 90, 200])]
        long_windows: Vec<usize>,

        /// Write the ranked grid as CSV to this file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Number of rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// List tickers in a price table with observation counts and date ranges.
    Tickers {
        /// Price table (CSV with ticker, date, price columns).
        #[arg(long)]
        prices: PathBuf,

        /// Universe TOML; adds each ticker's sector to the listing.
        #[arg(long)]
        universe: Option<PathBuf>,
    },
}

/// Inputs shared by `run` and `sweep`.
#[derive(Args, Debug, Clone, Default)]
struct BacktestArgs {
    /// Price table (CSV with ticker, date, price columns).
    #[arg(long)]
    prices: PathBuf,

    /// TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tickers to trade (comma-separated). Defaults to every ticker.
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Sectors to trade (comma-separated); requires a universe.
    #[arg(long, value_delimiter = ',')]
    sectors: Vec<String>,

    /// Universe TOML mapping sectors to tickers.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Start date (YYYY-MM-DD). Defaults to 2020-01-01.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long)]
    starting_cash: Option<f64>,

    #[arg(long)]
    num_shares: Option<i64>,

    #[arg(long)]
    short_window: Option<usize>,

    #[arg(long)]
    long_window: Option<usize>,
}

impl BacktestArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => BacktestConfig::from_file(path)?,
            None => BacktestConfig::default(),
        };

        let bt = &mut config.backtest;
        if let Some(start) = self.start {
            bt.start_date = Some(start);
        }
        if let Some(end) = self.end {
            bt.end_date = Some(end);
        }
        if bt.end_date.is_none() {
            bt.end_date = Some(chrono::Local::now().date_naive());
        }
        if let Some(cash) = self.starting_cash {
            bt.starting_cash = cash;
        }
        if let Some(n) = self.num_shares {
            bt.num_shares = n;
        }
        if let Some(w) = self.short_window {
            bt.short_window = w;
        }
        if let Some(w) = self.long_window {
            bt.long_window = w;
        }

        let pf = &mut config.portfolio;
        if !self.tickers.is_empty() {
            pf.tickers = self.tickers.clone();
        }
        if !self.sectors.is_empty() {
            pf.sectors = self.sectors.clone();
        }
        if self.universe.is_some() {
            pf.universe = self.universe.clone();
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            backtest,
            detail,
            output_dir,
        } => cmd_run(&backtest, detail.as_deref(), &output_dir),
        Commands::Sweep {
            backtest,
            short_windows,
            long_windows,
            output,
            top,
        } => {
            let grid = SweepGrid {
                short_windows,
                long_windows,
            };
            cmd_sweep(&backtest, &grid, output.as_deref(), top)
        }
        Commands::Tickers { prices, universe } => cmd_tickers(&prices, universe.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "covelab=debug" } else { "covelab=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_prices(path: &Path) -> Result<PriceTable> {
    let table = PriceTable::from_csv_path(path)
        .with_context(|| format!("failed to load price table {}", path.display()))?;
    tracing::info!(
        tickers = table.ticker_count(),
        observations = table.observation_count(),
        dropped = table.dropped_rows(),
        "price table loaded"
    );
    Ok(table)
}

fn cmd_run(args: &BacktestArgs, detail: Option<&str>, output_dir: &Path) -> Result<()> {
    let config = args.resolve_config()?;
    let table = load_prices(&args.prices)?;
    let selection = config.selection()?;

    let run = run_backtest(&table, &config.params(), &config.date_range(), &selection)?;
    print_summary(&run);

    if let Some(ticker) = detail {
        print_detail(&run, ticker)?;
    }

    let written = save_artifacts(&run, output_dir)?;
    println!("Artifacts saved to: {}", output_dir.display());
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}

fn cmd_sweep(
    args: &BacktestArgs,
    grid: &SweepGrid,
    output: Option<&Path>,
    top: usize,
) -> Result<()> {
    if grid.size() == 0 {
        bail!("sweep grid is empty: pass at least one short and one long window");
    }

    let config = args.resolve_config()?;
    let table = load_prices(&args.prices)?;
    let selection = config.selection()?;

    let points = run_sweep(
        &table,
        &config.params(),
        &config.date_range(),
        &selection,
        grid,
    )?;

    println!();
    println!("=== Sweep ({} combinations) ===", points.len());
    println!(
        "{:>6} {:>6} {:>14} {:>10} {:>8}",
        "Short", "Long", "Ending Total", "Delta", "Trades"
    );
    println!("{}", "-".repeat(48));
    for p in points.iter().take(top) {
        println!(
            "{:>6} {:>6} {:>14} {:>10} {:>8}",
            p.short_window,
            p.long_window,
            fmt_money(p.ending_total),
            p.delta.map_or_else(|| "-".to_string(), |d| format!("{d:.4}")),
            p.trade_count
        );
    }

    if let Some(path) = output {
        std::fs::write(path, sweep_csv(&points)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Sweep saved to: {}", path.display());
    }

    Ok(())
}

fn cmd_tickers(prices: &Path, universe: Option<&Path>) -> Result<()> {
    let table = load_prices(prices)?;
    let universe = universe
        .map(|path| {
            Universe::from_file(path)
                .with_context(|| format!("failed to load universe {}", path.display()))
        })
        .transpose()?;

    if table.is_empty() {
        println!("Price table is empty: {}", prices.display());
        return Ok(());
    }

    println!("Tickers: {}", table.ticker_count());
    println!("Observations: {}", table.observation_count());
    if table.dropped_rows() > 0 {
        println!("Dropped rows (missing price): {}", table.dropped_rows());
    }
    println!();
    println!(
        "{:<8} {:<24} {:>8}  {}",
        "Ticker", "Date Range", "Obs", "Sector"
    );
    println!("{}", "-".repeat(60));
    for s in table.stats() {
        let sector = universe
            .as_ref()
            .and_then(|u| u.sector_of(&s.ticker))
            .unwrap_or("");
        println!(
            "{:<8} {:<24} {:>8}  {}",
            s.ticker,
            format!("{} to {}", s.first_date, s.last_date),
            s.observations,
            sector
        );
    }

    if let Some(universe) = &universe {
        println!();
        println!("{:<28} {:>8} {:>8}", "Sector", "Members", "Priced");
        println!("{}", "-".repeat(46));
        for name in universe.sector_names() {
            let members = universe.sector(name).unwrap_or_default();
            let priced = members.iter().filter(|t| table.contains(t)).count();
            println!("{:<28} {:>8} {:>8}", name, members.len(), priced);
        }
    }

    Ok(())
}

fn fmt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_summary(run: &BacktestRun) {
    let s = &run.summary;
    let p = &run.params;
    println!();
    println!("=== Backtest Result ===");
    match (run.portfolio.first(), run.portfolio.last()) {
        (Some(first), Some(last)) => {
            println!("Period:           {} to {}", first.date, last.date)
        }
        _ => println!("Period:           (no observations)"),
    }
    println!(
        "Windows:          short {} / long {}",
        p.short_window, p.long_window
    );
    println!("Shares per buy:   {}", p.num_shares);
    println!("Tickers:          {}", s.ticker_count);
    println!("Trades:           {}", run.trade_count());
    println!();
    println!("--- Portfolio ---");
    println!("Total Investment: {:.2}", s.total_investment);
    println!("Ending Total:     {}", fmt_money(s.ending_total));
    match s.delta {
        Some(d) => println!("Delta:            {d:.4} ({:+.2}%)", (d - 1.0) * 100.0),
        None => println!("Delta:            -"),
    }
    for skipped in &run.skipped {
        println!("WARNING: skipped {} ({})", skipped.ticker, skipped.reason);
    }
    println!();
}

fn print_detail(run: &BacktestRun, ticker: &str) -> Result<()> {
    let Some(detail) = run.ticker(ticker) else {
        bail!("ticker '{ticker}' was not part of this run");
    };

    println!("=== {} ===", detail.ticker);
    println!("Observations: {}", detail.prices.len());
    if let Some(last) = detail.ledger.last() {
        println!(
            "Last row:     {} shares {} cash {:.2} holdings {:.2} total {:.2}",
            last.date, last.shares, last.cash, last.holdings, last.total
        );
    }
    println!();
    println!(
        "{:<12} {:<5} {:>8} {:>12} {:>14}",
        "Date", "Side", "Shares", "Price", "Notional"
    );
    println!("{}", "-".repeat(55));
    for t in &detail.trades {
        println!(
            "{:<12} {:<5} {:>8} {:>12.4} {:>14.2}",
            t.date,
            format!("{:?}", t.side),
            t.shares,
            t.price,
            t.notional()
        );
    }
    println!();
    Ok(())
}
