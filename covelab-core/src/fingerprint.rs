//! Deterministic identification of inputs, for memoization.
//!
//! - `DatasetHash`: BLAKE3 over one ticker's price points
//! - `RunKey`: ticker + parameter hash + dataset hash
//!
//! Two runs with equal keys produce identical ledgers, so a caller may reuse
//! the earlier result instead of recomputing it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::PricePoint;
use crate::params::StrategyParams;

/// Content hash of a ticker's (date-restricted) price history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of(prices: &[PricePoint]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for p in prices {
            hasher.update(p.ticker.as_bytes());
            hasher.update(p.date.to_string().as_bytes());
            hasher.update(&p.price.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memo key for one ticker's signal + ledger computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    pub ticker: String,
    pub params_hash: String,
    pub dataset_hash: DatasetHash,
}

impl RunKey {
    pub fn new(ticker: &str, params: &StrategyParams, prices: &[PricePoint]) -> Self {
        Self {
            ticker: ticker.to_string(),
            params_hash: params.full_hash(),
            dataset_hash: DatasetHash::of(prices),
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.ticker,
            &self.params_hash[..12.min(self.params_hash.len())],
            &self.dataset_hash.0[..12.min(self.dataset_hash.0.len())]
        )
    }
}
