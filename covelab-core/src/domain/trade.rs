//! Trade: a share-count change on a crossover, for drill-down views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A simulated fill at the observation's price. No fees or slippage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,
    pub date: NaiveDate,
    pub side: TradeSide,
    pub shares: i64,
    pub price: f64,
}

impl Trade {
    /// Cash moved by the trade (always positive).
    pub fn notional(&self) -> f64 {
        self.shares as f64 * self.price
    }
}
