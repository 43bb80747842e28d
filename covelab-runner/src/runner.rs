//! Backtest runner: wires price table, per-ticker pipeline, memo and
//! aggregation.
//!
//! A run has three phases:
//! 1. Resolve the ticker selection and slice each history to the date range
//!    (single-threaded; memo lookups happen here).
//! 2. Run signals → ledger for every remaining ticker in parallel. Workers
//!    share only the read-only parameters and their own price slice.
//! 3. Join, record new results in the memo, aggregate by date.
//!
//! A run either returns a complete `BacktestRun` or an error; nothing partial
//! escapes and nothing is written to the memo before the join.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use covelab_core::data::PriceTable;
use covelab_core::domain::{
    LedgerPoint, PortfolioPoint, PortfolioSummary, PricePoint, SignalPoint, Trade,
};
use covelab_core::engine::{aggregate, build_ledger, extract_trades, generate_signals, summarize};
use covelab_core::fingerprint::RunKey;
use covelab_core::{DateRange, ParamError, StrategyParams};

use crate::memo::LedgerMemo;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid parameter: {0}")]
    Param(#[from] ParamError),
}

/// Which tickers a run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every ticker in the price table.
    #[default]
    All,
    /// An explicit list, deduplicated, in first-seen order.
    Tickers(Vec<String>),
}

impl Selection {
    /// An empty list selects everything.
    pub fn from_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = tickers
            .into_iter()
            .map(Into::into)
            .filter(|t| seen.insert(t.clone()))
            .collect();
        if unique.is_empty() {
            Selection::All
        } else {
            Selection::Tickers(unique)
        }
    }

    pub fn resolve(&self, table: &PriceTable) -> Vec<String> {
        match self {
            Selection::All => table.tickers().into_iter().map(String::from).collect(),
            Selection::Tickers(tickers) => tickers.clone(),
        }
    }
}

/// Why a requested ticker produced no ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The ticker does not appear in the price table at all.
    UnknownTicker,
    /// The ticker exists but has no observations inside the date range.
    NoObservationsInRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownTicker => write!(f, "not in price table"),
            SkipReason::NoObservationsInRange => write!(f, "no prices in date range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

/// Everything computed for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerRun {
    pub ticker: String,
    pub prices: Vec<PricePoint>,
    pub signals: Vec<SignalPoint>,
    pub ledger: Vec<LedgerPoint>,
    pub trades: Vec<Trade>,
}

impl TickerRun {
    /// Signals → ledger → trades for one ticker's price slice.
    pub fn compute(
        ticker: &str,
        prices: &[PricePoint],
        params: &StrategyParams,
    ) -> Result<Self, ParamError> {
        let signals = generate_signals(prices, params.short_window, params.long_window)?;
        let ledger = build_ledger(&signals, prices, params.starting_cash, params.num_shares)?;
        let trades = extract_trades(&ledger, prices);

        Ok(Self {
            ticker: ticker.to_string(),
            prices: prices.to_vec(),
            signals,
            ledger,
            trades,
        })
    }

    pub fn ending_total(&self) -> Option<f64> {
        self.ledger.last().map(|row| row.total)
    }
}

/// Complete result of one backtest run.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub params: StrategyParams,
    pub range: DateRange,
    /// Per-ticker results, sorted by ticker.
    pub runs: BTreeMap<String, Arc<TickerRun>>,
    pub skipped: Vec<SkippedTicker>,
    pub portfolio: Vec<PortfolioPoint>,
    pub summary: PortfolioSummary,
}

impl BacktestRun {
    /// All signal points, ticker by ticker.
    pub fn signals(&self) -> impl Iterator<Item = &SignalPoint> {
        self.runs.values().flat_map(|r| r.signals.iter())
    }

    /// All ledger rows, ticker by ticker.
    pub fn ledgers(&self) -> impl Iterator<Item = &LedgerPoint> {
        self.runs.values().flat_map(|r| r.ledger.iter())
    }

    pub fn trade_count(&self) -> usize {
        self.runs.values().map(|r| r.trades.len()).sum()
    }

    pub fn ticker(&self, ticker: &str) -> Option<&TickerRun> {
        self.runs.get(ticker).map(Arc::as_ref)
    }
}

/// One ticker waiting for the parallel phase.
struct Job<'a> {
    ticker: String,
    prices: &'a [PricePoint],
    key: Option<RunKey>,
}

/// Runs backtests against one price table, optionally memoizing per-ticker
/// results across runs.
pub struct Backtester<'a> {
    table: &'a PriceTable,
    memo: Option<LedgerMemo>,
}

impl<'a> Backtester<'a> {
    pub fn new(table: &'a PriceTable) -> Self {
        Self { table, memo: None }
    }

    /// Keep per-ticker results keyed by (ticker, params, price data) and reuse
    /// them on later runs.
    pub fn with_memo(mut self) -> Self {
        self.memo = Some(LedgerMemo::new());
        self
    }

    pub fn memo(&self) -> Option<&LedgerMemo> {
        self.memo.as_ref()
    }

    pub fn table(&self) -> &'a PriceTable {
        self.table
    }

    pub fn run(
        &mut self,
        params: &StrategyParams,
        range: &DateRange,
        selection: &Selection,
    ) -> Result<BacktestRun, RunError> {
        params.validate()?;
        range.validate()?;

        let table = self.table;
        let tickers = selection.resolve(table);
        info!(
            tickers = tickers.len(),
            short_window = params.short_window,
            long_window = params.long_window,
            starting_cash = params.starting_cash,
            num_shares = params.num_shares,
            "starting backtest"
        );

        let mut runs: BTreeMap<String, Arc<TickerRun>> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut jobs = Vec::new();

        for ticker in tickers {
            if !table.contains(&ticker) {
                warn!(%ticker, "skipping ticker: not in price table");
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::UnknownTicker,
                });
                continue;
            }
            let prices = table.series_in(&ticker, range);
            if prices.is_empty() {
                warn!(%ticker, "skipping ticker: no observations in date range");
                skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::NoObservationsInRange,
                });
                continue;
            }

            let key = match self.memo.as_mut() {
                Some(memo) => {
                    let key = RunKey::new(&ticker, params, prices);
                    if let Some(hit) = memo.get(&key) {
                        debug!(%key, "memo hit");
                        runs.insert(ticker, hit);
                        continue;
                    }
                    Some(key)
                }
                None => None,
            };
            jobs.push(Job {
                ticker,
                prices,
                key,
            });
        }

        let computed: Vec<(Job<'_>, Result<TickerRun, ParamError>)> = jobs
            .into_par_iter()
            .map(|job| {
                let run = TickerRun::compute(&job.ticker, job.prices, params);
                (job, run)
            })
            .collect();

        for (job, run) in computed {
            let run = Arc::new(run?);
            debug!(
                ticker = %run.ticker,
                rows = run.ledger.len(),
                trades = run.trades.len(),
                "ledger built"
            );
            if let (Some(memo), Some(key)) = (self.memo.as_mut(), job.key) {
                memo.insert(key, Arc::clone(&run));
            }
            runs.insert(job.ticker, run);
        }

        let ledgers: BTreeMap<&str, &[LedgerPoint]> = runs
            .iter()
            .map(|(ticker, run)| (ticker.as_str(), run.ledger.as_slice()))
            .collect();
        let portfolio = aggregate(&ledgers);
        let summary = summarize(&portfolio, params.starting_cash, runs.len());

        info!(
            tickers = summary.ticker_count,
            skipped = skipped.len(),
            ending_total = ?summary.ending_total,
            delta = ?summary.delta,
            "backtest complete"
        );

        Ok(BacktestRun {
            params: *params,
            range: *range,
            runs,
            skipped,
            portfolio,
            summary,
        })
    }
}

/// One-shot run without memoization.
pub fn run_backtest(
    table: &PriceTable,
    params: &StrategyParams,
    range: &DateRange,
    selection: &Selection,
) -> Result<BacktestRun, RunError> {
    Backtester::new(table).run(params, range, selection)
}
