//! Per-ticker pipeline and cross-ticker aggregation.
//!
//! - `signals`: prices → moving averages and long/flat stance
//! - `accounting`: signals + prices → cash/holdings/total ledger (single fold)
//! - `trades`: ledger share changes → buy/sell list for drill-down
//! - `aggregate`: per-ticker ledgers → date-indexed portfolio + summary
//!
//! Every stage is a pure function of its inputs; nothing is cached here.

pub mod accounting;
pub mod aggregate;
pub mod signals;
pub mod trades;

pub use accounting::build_ledger;
pub use aggregate::{aggregate, summarize};
pub use signals::generate_signals;
pub use trades::extract_trades;

/// Build consecutive-day price points for tests.
#[cfg(test)]
pub(crate) fn make_prices(ticker: &str, prices: &[f64]) -> Vec<crate::domain::PricePoint> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            crate::domain::PricePoint::new(ticker, base + chrono::Duration::days(i as i64), p)
        })
        .collect()
}
