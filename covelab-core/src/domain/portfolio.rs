//! Portfolio-level aggregate rows and summary scalars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Same-date sum of every ticker's ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    pub holdings: f64,
    pub cash: f64,
    pub total: f64,
}

/// Headline numbers for a finished run.
///
/// `ending_total` is taken from the last aggregated date. When tickers cover
/// different date ranges that date may not include every ticker, so it is an
/// approximation of the portfolio's closing value rather than a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub ticker_count: usize,
    pub total_investment: f64,
    pub ending_total: Option<f64>,
    pub delta: Option<f64>,
}
