//! CoveLab Runner: backtest orchestration on top of `covelab-core`.
//!
//! This crate provides:
//! - TOML run configuration with portfolio selection by ticker or sector
//! - A runner that fans per-ticker work out over rayon and aggregates by date
//! - Per-ticker result memoization keyed by parameters and price fingerprint
//! - CSV and JSON export of signals, ledgers, and the portfolio aggregate
//! - Window-grid parameter sweeps

pub mod config;
pub mod export;
pub mod memo;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError};
pub use export::{
    ledger_csv, portfolio_csv, save_artifacts, signals_csv, summary_json, sweep_csv,
};
pub use memo::LedgerMemo;
pub use runner::{
    run_backtest, BacktestRun, Backtester, RunError, Selection, SkipReason, SkippedTicker,
    TickerRun,
};
pub use sweep::{run_sweep, SweepGrid, SweepPoint};
