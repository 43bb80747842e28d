//! CoveLab Core: price store, moving-average signals, ledger accounting,
//! portfolio aggregation.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (price, signal, ledger, portfolio points; trades)
//! - Growing-window SMA indicator
//! - Signal generation with the warm-up rule
//! - Single-pass ledger accounting per ticker
//! - Group-by-date portfolio aggregation and summary scalars
//! - Price table ingest and sector universes
//!
//! Every stage takes its predecessor's output by reference and returns a new
//! value. Nothing here holds state between calls.

pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod params;

pub use params::{DateRange, ParamError, StrategyParams};
