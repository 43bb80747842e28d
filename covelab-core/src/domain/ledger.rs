//! LedgerPoint: one row of a ticker's running account.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cash, holdings and total value of one ticker's account on one date.
///
/// `returns` is `None` on the first row and whenever the previous total was
/// zero; it is never reported as a numeric zero in those cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub shares: i64,
    pub holdings: f64,
    pub cash: f64,
    pub total: f64,
    pub returns: Option<f64>,
}
