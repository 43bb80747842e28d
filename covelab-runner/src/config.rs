//! Serializable backtest configuration.
//!
//! A config file is TOML with a `[backtest]` table and a `[portfolio]`
//! table, both optional:
//!
//! ```toml
//! [backtest]
//! start_date = "2020-01-01"
//! end_date = "2024-12-31"
//! starting_cash = 10000.0
//! num_shares = 100
//! short_window = 30
//! long_window = 90
//!
//! [portfolio]
//! tickers = ["AAPL", "MSFT"]
//! sectors = ["Energy"]
//! universe = "universe.toml"
//! ```
//!
//! Omitted fields fall back to the defaults below. An empty portfolio means
//! every ticker in the price table.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use covelab_core::data::{DataError, Universe};
use covelab_core::{DateRange, StrategyParams};

use crate::runner::Selection;

/// Errors from loading or resolving a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("portfolio lists sectors but no universe file")]
    MissingUniverse,
    #[error("universe: {0}")]
    Universe(#[from] DataError),
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub portfolio: PortfolioSection,
}

/// `[backtest]`: dates and strategy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub starting_cash: f64,
    pub num_shares: i64,
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for BacktestSection {
    fn default() -> Self {
        let params = StrategyParams::default();
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: None,
            starting_cash: params.starting_cash,
            num_shares: params.num_shares,
            short_window: params.short_window,
            long_window: params.long_window,
        }
    }
}

/// `[portfolio]`: which tickers to trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSection {
    pub tickers: Vec<String>,
    pub sectors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universe: Option<PathBuf>,
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams {
            short_window: self.backtest.short_window,
            long_window: self.backtest.long_window,
            starting_cash: self.backtest.starting_cash,
            num_shares: self.backtest.num_shares,
        }
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.backtest.start_date, self.backtest.end_date)
    }

    /// Resolve the portfolio section into a ticker selection.
    ///
    /// Explicit tickers come first, then sector members in the order the
    /// sectors are listed. Sectors require a universe file.
    pub fn selection(&self) -> Result<Selection, ConfigError> {
        let portfolio = &self.portfolio;
        let mut tickers = portfolio.tickers.clone();

        if !portfolio.sectors.is_empty() {
            let path = portfolio
                .universe
                .as_deref()
                .ok_or(ConfigError::MissingUniverse)?;
            let universe = Universe::from_file(path)?;
            tickers.extend(universe.select(&portfolio.sectors)?);
        }

        Ok(Selection::from_tickers(tickers))
    }
}
