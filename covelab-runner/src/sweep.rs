//! Parameter sweep over short/long window grids.
//!
//! Every combination is run, including orderings where the short window is
//! not shorter than the long one. Those still produce a valid (if odd)
//! signal and are ranked like any other point.

use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

use covelab_core::data::PriceTable;
use covelab_core::{DateRange, StrategyParams};

use crate::runner::{run_backtest, RunError, Selection};

/// Windows to cross in a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
}

impl Default for SweepGrid {
    /// Short 10/20/30 against long 50/90/200.
    fn default() -> Self {
        Self {
            short_windows: vec![10, 20, 30],
            long_windows: vec![50, 90, 200],
        }
    }
}

impl SweepGrid {
    pub fn size(&self) -> usize {
        self.short_windows.len() * self.long_windows.len()
    }

    /// All (short, long) pairs, short-major.
    pub fn combinations(&self) -> Vec<(usize, usize)> {
        self.short_windows
            .iter()
            .flat_map(|&s| self.long_windows.iter().map(move |&l| (s, l)))
            .collect()
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub short_window: usize,
    pub long_window: usize,
    pub ending_total: Option<f64>,
    pub delta: Option<f64>,
    pub trade_count: usize,
}

/// Run every grid point with the account settings from `base`, ranked by
/// delta descending. Points without a delta sort last; ties keep grid order.
pub fn run_sweep(
    table: &PriceTable,
    base: &StrategyParams,
    range: &DateRange,
    selection: &Selection,
    grid: &SweepGrid,
) -> Result<Vec<SweepPoint>, RunError> {
    let combos = grid.combinations();
    tracing::info!(points = combos.len(), "starting sweep");

    let mut points = combos
        .par_iter()
        .map(|&(short_window, long_window)| {
            let params = StrategyParams {
                short_window,
                long_window,
                ..*base
            };
            let run = run_backtest(table, &params, range, selection)?;
            Ok(SweepPoint {
                short_window,
                long_window,
                ending_total: run.summary.ending_total,
                delta: run.summary.delta,
                trade_count: run.trade_count(),
            })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    points.sort_by(|a, b| rank(a.delta, b.delta));
    Ok(points)
}

fn rank(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_degenerate_orderings() {
        let grid = SweepGrid {
            short_windows: vec![5, 50],
            long_windows: vec![20],
        };
        assert_eq!(grid.size(), 2);
        assert_eq!(grid.combinations(), vec![(5, 20), (50, 20)]);
    }

    #[test]
    fn rank_puts_missing_delta_last() {
        let mut deltas = vec![None, Some(0.9), Some(1.2), None, Some(1.0)];
        deltas.sort_by(|a, b| rank(*a, *b));
        assert_eq!(deltas, vec![Some(1.2), Some(1.0), Some(0.9), None, None]);
    }

    #[test]
    fn empty_grid_is_empty() {
        let grid = SweepGrid {
            short_windows: vec![],
            long_windows: vec![10],
        };
        let table = PriceTable::default();
        let points = run_sweep(
            &table,
            &StrategyParams::default(),
            &DateRange::default(),
            &Selection::All,
            &grid,
        )
        .unwrap();
        assert!(points.is_empty());
    }
}
