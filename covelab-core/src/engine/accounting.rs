//! Ledger accounting: turns a ticker's signal series into a running account.
//!
//! One forward pass carrying `(cash, shares, total)` from the previous row.
//! Cash only moves when the share count changes, by the cost of the change at
//! that row's price:
//!
//! ```text
//! cash[t] = starting_cash - Σ_{i<=t} (shares[i] - shares[i-1]) * price[i]
//! ```

use crate::domain::{LedgerPoint, PricePoint, SignalPoint};
use crate::params::{validate_account, ParamError};

/// Carried state between ledger rows.
#[derive(Debug, Clone, Copy)]
struct Account {
    cash: f64,
    shares: i64,
    total: Option<f64>,
}

impl Account {
    fn open(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            shares: 0,
            total: None,
        }
    }

    fn post(&mut self, signal: &SignalPoint, price: f64, num_shares: i64) -> LedgerPoint {
        let shares = num_shares * i64::from(signal.signal);
        self.cash -= (shares - self.shares) as f64 * price;

        let holdings = shares as f64 * price;
        let total = self.cash + holdings;
        let returns = match self.total {
            Some(prev) if prev != 0.0 => Some(total / prev - 1.0),
            _ => None,
        };

        self.shares = shares;
        self.total = Some(total);

        LedgerPoint {
            ticker: signal.ticker.clone(),
            date: signal.date,
            shares,
            holdings,
            cash: self.cash,
            total,
            returns,
        }
    }
}

/// Build a ticker's ledger from its signals and the prices they were
/// generated from.
///
/// # Panics
///
/// Panics if `signals` and `prices` disagree on length or on any
/// `(ticker, date)` key. Signals are always derived from the same prices, so a
/// mismatch is a programming error rather than bad input.
pub fn build_ledger(
    signals: &[SignalPoint],
    prices: &[PricePoint],
    starting_cash: f64,
    num_shares: i64,
) -> Result<Vec<LedgerPoint>, ParamError> {
    validate_account(starting_cash, num_shares)?;
    assert_aligned(signals, prices);

    let ledger = signals
        .iter()
        .zip(prices)
        .scan(Account::open(starting_cash), |account, (signal, price)| {
            Some(account.post(signal, price.price, num_shares))
        })
        .collect();

    Ok(ledger)
}

fn assert_aligned(signals: &[SignalPoint], prices: &[PricePoint]) {
    assert_eq!(
        signals.len(),
        prices.len(),
        "signal/price length mismatch: {} signals vs {} prices",
        signals.len(),
        prices.len()
    );
    for (i, (s, p)) in signals.iter().zip(prices).enumerate() {
        assert!(
            s.ticker == p.ticker && s.date == p.date,
            "signal/price misaligned at index {i}: signal ({}, {}) vs price ({}, {})",
            s.ticker,
            s.date,
            p.ticker,
            p.date
        );
    }
}
