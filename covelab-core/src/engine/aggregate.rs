//! Portfolio aggregation: group-by-date sum across tickers.
//!
//! Runs once, after every ticker's ledger is complete. Tickers are visited in
//! sorted order so floating-point sums come out identical on every run.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{LedgerPoint, PortfolioPoint, PortfolioSummary};

/// Sum `holdings`, `cash` and `total` over every ledger row sharing a date.
///
/// A date present for only some tickers aggregates just those tickers; the
/// rest contribute nothing. Output is ascending by date. Ledgers may be
/// owned vectors or borrowed slices.
pub fn aggregate<K, L>(ledgers: &BTreeMap<K, L>) -> Vec<PortfolioPoint>
where
    L: AsRef<[LedgerPoint]>,
{
    let mut by_date: BTreeMap<NaiveDate, PortfolioPoint> = BTreeMap::new();

    for row in ledgers.values().flat_map(|l| l.as_ref()) {
        let point = by_date.entry(row.date).or_insert(PortfolioPoint {
            date: row.date,
            holdings: 0.0,
            cash: 0.0,
            total: 0.0,
        });
        point.holdings += row.holdings;
        point.cash += row.cash;
        point.total += row.total;
    }

    by_date.into_values().collect()
}

/// Headline scalars for an aggregated run.
///
/// `delta = ending_total / (starting_cash * ticker_count)`. Both `ending_total`
/// and `delta` are `None` when there is nothing to report.
pub fn summarize(
    points: &[PortfolioPoint],
    starting_cash: f64,
    ticker_count: usize,
) -> PortfolioSummary {
    let total_investment = starting_cash * ticker_count as f64;
    let ending_total = points.last().map(|p| p.total);
    let delta = match ending_total {
        Some(total) if ticker_count > 0 && total_investment != 0.0 => {
            Some(total / total_investment)
        }
        _ => None,
    };

    PortfolioSummary {
        ticker_count,
        total_investment,
        ending_total,
        delta,
    }
}
