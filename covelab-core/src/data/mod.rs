//! Price Store and portfolio selection.
//!
//! - `price_table`: per-ticker ordered price histories, loaded from delimited text
//! - `universe`: sector → ticker lists for selecting a portfolio by sector

pub mod price_table;
pub mod universe;

pub use price_table::{PriceTable, TickerStats};
pub use universe::Universe;

use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("price table is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid price '{value}' for {ticker} (must be a positive number)")]
    InvalidPrice {
        line: u64,
        ticker: String,
        value: String,
    },

    #[error("line {line}: empty ticker")]
    EmptyTicker { line: u64 },

    #[error("duplicate observation for {ticker} on {date}")]
    DuplicateObservation { ticker: String, date: NaiveDate },

    #[error("parse universe TOML: {0}")]
    Universe(String),

    #[error("unknown sector '{0}'")]
    UnknownSector(String),
}
