//! In-memory memoization of per-ticker results.
//!
//! Keyed by `RunKey` (ticker + parameter hash + price-data hash), so an entry
//! is only ever reused for byte-identical inputs. The memo is owned by the
//! caller and passed explicitly; there is no global cache.

use std::collections::HashMap;
use std::sync::Arc;

use covelab_core::fingerprint::RunKey;

use crate::runner::TickerRun;

#[derive(Debug, Default)]
pub struct LedgerMemo {
    entries: HashMap<RunKey, Arc<TickerRun>>,
    hits: u64,
    misses: u64,
}

impl LedgerMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a result, counting the hit or miss.
    pub fn get(&mut self, key: &RunKey) -> Option<Arc<TickerRun>> {
        match self.entries.get(key) {
            Some(run) => {
                self.hits += 1;
                Some(Arc::clone(run))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: RunKey, run: Arc<TickerRun>) {
        self.entries.insert(key, run);
    }

    pub fn contains(&self, key: &RunKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covelab_core::domain::PricePoint;
    use covelab_core::StrategyParams;

    fn run_for(ticker: &str) -> (RunKey, Arc<TickerRun>) {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let prices = vec![PricePoint::new(ticker, date, 10.0)];
        let params = StrategyParams::default();
        let key = RunKey::new(ticker, &params, &prices);
        let run = TickerRun::compute(ticker, &prices, &params).unwrap();
        (key, Arc::new(run))
    }

    #[test]
    fn get_counts_hits_and_misses() {
        let mut memo = LedgerMemo::new();
        let (key, run) = run_for("AAA");

        assert!(memo.get(&key).is_none());
        memo.insert(key.clone(), run);
        assert!(memo.get(&key).is_some());
        assert_eq!(memo.hits(), 1);
        assert_eq!(memo.misses(), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut memo = LedgerMemo::new();
        let (key, run) = run_for("AAA");
        memo.insert(key.clone(), run);
        let _ = memo.get(&key);
        memo.clear();
        assert!(memo.is_empty());
        assert!(!memo.contains(&key));
        assert_eq!(memo.hits(), 0);
    }
}
