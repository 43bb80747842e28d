//! PricePoint: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed price for a single ticker on a single day.
///
/// A ticker's history is a slice of these, ascending by date. Dates need not
/// be contiguous; weekends, holidays and gaps are all fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            price,
        }
    }

    /// A usable price is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}
