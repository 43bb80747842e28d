//! Strategy parameters and their validation.
//!
//! Every run validates its parameters once, up front. A bad parameter rejects
//! the whole run before any ticker is touched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid-parameter errors. Raised before any computation begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("short_window must be >= 1 (got {0})")]
    ShortWindow(usize),

    #[error("long_window must be >= 1 (got {0})")]
    LongWindow(usize),

    #[error("starting_cash must be a positive finite amount (got {0})")]
    StartingCash(f64),

    #[error("num_shares must be >= 0 (got {0})")]
    NumShares(i64),

    #[error("end date {end} is before start date {start}")]
    DateRange { start: NaiveDate, end: NaiveDate },
}

/// Moving-average crossover parameters shared by every ticker in a run.
///
/// `long_window` is not required to exceed `short_window`. A degenerate
/// ordering is accepted and simply produces a different (possibly always
/// long) signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub starting_cash: f64,
    pub num_shares: i64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            short_window: 30,
            long_window: 90,
            starting_cash: 10_000.0,
            num_shares: 100,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        validate_windows(self.short_window, self.long_window)?;
        validate_account(self.starting_cash, self.num_shares)
    }

    /// Exact identity of the parameter set, used as part of memo keys.
    ///
    /// Serialized through serde_json with a fixed field order, so equal
    /// parameters always hash identically.
    pub fn full_hash(&self) -> String {
        let json = serde_json::json!({
            "short_window": self.short_window,
            "long_window": self.long_window,
            "starting_cash": self.starting_cash.to_bits(),
            "num_shares": self.num_shares,
        });
        blake3::hash(json.to_string().as_bytes()).to_hex().to_string()
    }
}

pub(crate) fn validate_windows(short_window: usize, long_window: usize) -> Result<(), ParamError> {
    if short_window < 1 {
        return Err(ParamError::ShortWindow(short_window));
    }
    if long_window < 1 {
        return Err(ParamError::LongWindow(long_window));
    }
    Ok(())
}

pub(crate) fn validate_account(starting_cash: f64, num_shares: i64) -> Result<(), ParamError> {
    if !(starting_cash.is_finite() && starting_cash > 0.0) {
        return Err(ParamError::StartingCash(starting_cash));
    }
    if num_shares < 0 {
        return Err(ParamError::NumShares(num_shares));
    }
    Ok(())
}

/// Inclusive date window applied to every ticker's history. Either bound may
/// be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(ParamError::DateRange { start, end }),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}
