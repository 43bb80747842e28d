//! Export: delimited text and JSON artifacts for a backtest run.
//!
//! - **CSV**: signal series, ledger series and the portfolio aggregate, one
//!   row per point, undefined values as empty fields
//! - **JSON**: run summary with parameters and skipped tickers
//!
//! Serializers return UTF-8 bytes ready to write. Output depends only on the
//! run, so identical runs export byte-identical files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use covelab_core::domain::{LedgerPoint, PortfolioPoint, PortfolioSummary, SignalPoint};
use covelab_core::{DateRange, StrategyParams};

use crate::runner::{BacktestRun, SkippedTicker};
use crate::sweep::SweepPoint;

pub const SCHEMA_VERSION: u32 = 1;

pub const SIGNALS_FILE: &str = "quant_trading_signals.csv";
pub const PORTFOLIO_FILE: &str = "quant_trading_backtest.csv";
pub const LEDGER_FILE: &str = "quant_trading_ledger.csv";
pub const SUMMARY_FILE: &str = "summary.json";

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner().context("failed to flush CSV writer")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: ticker, date, short_ma, long_ma, signal, position
pub fn signals_csv<'a>(
    signals: impl IntoIterator<Item = &'a SignalPoint>,
) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "date", "short_ma", "long_ma", "signal", "position"])?;

    for s in signals {
        wtr.write_record([
            s.ticker.as_str(),
            &s.date.format("%Y-%m-%d").to_string(),
            &opt(s.short_ma, 6),
            &opt(s.long_ma, 6),
            &s.signal.to_string(),
            &s.position.to_string(),
        ])?;
    }

    finish(wtr)
}

/// Columns: ticker, date, shares, holdings, cash, total, returns
pub fn ledger_csv<'a>(
    ledger: impl IntoIterator<Item = &'a LedgerPoint>,
) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker", "date", "shares", "holdings", "cash", "total", "returns",
    ])?;

    for row in ledger {
        wtr.write_record([
            row.ticker.as_str(),
            &row.date.format("%Y-%m-%d").to_string(),
            &row.shares.to_string(),
            &format!("{:.2}", row.holdings),
            &format!("{:.2}", row.cash),
            &format!("{:.2}", row.total),
            &opt(row.returns, 6),
        ])?;
    }

    finish(wtr)
}

/// Columns: date, holdings, cash, total
pub fn portfolio_csv(points: &[PortfolioPoint]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "holdings", "cash", "total"])?;

    for p in points {
        wtr.write_record([
            p.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", p.holdings),
            format!("{:.2}", p.cash),
            format!("{:.2}", p.total),
        ])?;
    }

    finish(wtr)
}

/// Columns: short_window, long_window, ending_total, delta, trades
pub fn sweep_csv(points: &[SweepPoint]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "short_window",
        "long_window",
        "ending_total",
        "delta",
        "trades",
    ])?;

    for p in points {
        wtr.write_record([
            p.short_window.to_string(),
            p.long_window.to_string(),
            opt(p.ending_total, 2),
            opt(p.delta, 6),
            p.trade_count.to_string(),
        ])?;
    }

    finish(wtr)
}

// ─── JSON summary ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    schema_version: u32,
    params: &'a StrategyParams,
    range: &'a DateRange,
    first_date: Option<String>,
    last_date: Option<String>,
    summary: &'a PortfolioSummary,
    trades: usize,
    skipped: &'a [SkippedTicker],
}

/// Pretty JSON with the summary scalars, parameters and skipped tickers.
pub fn summary_json(run: &BacktestRun) -> Result<Vec<u8>> {
    let doc = SummaryDocument {
        schema_version: SCHEMA_VERSION,
        params: &run.params,
        range: &run.range,
        first_date: run.portfolio.first().map(|p| p.date.to_string()),
        last_date: run.portfolio.last().map(|p| p.date.to_string()),
        summary: &run.summary,
        trades: run.trade_count(),
        skipped: &run.skipped,
    };
    serde_json::to_vec_pretty(&doc).context("failed to serialize run summary to JSON")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the full artifact set for a run into `output_dir`:
/// - `quant_trading_signals.csv`: every ticker's signal series
/// - `quant_trading_backtest.csv`: the portfolio aggregate
/// - `quant_trading_ledger.csv`: every ticker's ledger
/// - `summary.json`
///
/// Returns the paths written, in that order.
pub fn save_artifacts(run: &BacktestRun, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let artifacts = [
        (SIGNALS_FILE, signals_csv(run.signals())?),
        (PORTFOLIO_FILE, portfolio_csv(&run.portfolio)?),
        (LEDGER_FILE, ledger_csv(run.ledgers())?),
        (SUMMARY_FILE, summary_json(run)?),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    tracing::info!(dir = %output_dir.display(), files = written.len(), "artifacts saved");
    Ok(written)
}
