//! Trade extraction: share-count changes as discrete buys and sells.
//!
//! Post-processes a finished ledger. Pure function: ledger + prices → trades.

use crate::domain::{LedgerPoint, PricePoint, Trade, TradeSide};

/// One trade per row where the share count differs from the previous row.
///
/// With `num_shares = 0` the share count never moves, so no trades are
/// produced even though the signal may cross.
pub fn extract_trades(ledger: &[LedgerPoint], prices: &[PricePoint]) -> Vec<Trade> {
    let mut prev_shares = 0i64;
    let mut trades = Vec::new();

    for (row, price) in ledger.iter().zip(prices) {
        let change = row.shares - prev_shares;
        prev_shares = row.shares;
        if change == 0 {
            continue;
        }

        let side = if change > 0 {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        trades.push(Trade {
            ticker: row.ticker.clone(),
            date: row.date,
            side,
            shares: change.abs(),
            price: price.price,
        });
    }

    trades
}
