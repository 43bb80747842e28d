//! SignalPoint: moving averages and the long/flat stance for one observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived signal state for one `(ticker, date)` observation.
///
/// `signal` is the stance: 1 = long, 0 = flat. `position` is the change in
/// stance from the previous observation: +1 on a buy crossover, -1 on a sell
/// crossover, 0 otherwise (always 0 on the first observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub signal: u8,
    pub position: i8,
}

impl SignalPoint {
    pub fn is_long(&self) -> bool {
        self.signal == 1
    }

    pub fn is_buy(&self) -> bool {
        self.position > 0
    }

    pub fn is_sell(&self) -> bool {
        self.position < 0
    }
}
