//! Sector universes: named groups of tickers for picking a portfolio.
//!
//! Stored as TOML, one array per sector:
//!
//! ```toml
//! [sectors]
//! "Information Technology" = ["AAPL", "MSFT"]
//! Energy = ["XOM", "CVX"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::DataError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        toml::from_str(content).map_err(|e| DataError::Universe(e.to_string()))
    }

    pub fn sector(&self, name: &str) -> Option<&[String]> {
        self.sectors.get(name).map(Vec::as_slice)
    }

    /// Sector names, sorted.
    pub fn sector_names(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    /// First sector (by name) listing `ticker`.
    pub fn sector_of(&self, ticker: &str) -> Option<&str> {
        self.sectors
            .iter()
            .find(|(_, members)| members.iter().any(|t| t == ticker))
            .map(|(name, _)| name.as_str())
    }

    /// Members of the named sectors, concatenated in the order the sectors
    /// are given. Duplicates are left for the caller to collapse.
    pub fn select(&self, names: &[String]) -> Result<Vec<String>, DataError> {
        names.iter().try_fold(Vec::new(), |mut picked, name| {
            let members = self
                .sector(name)
                .ok_or_else(|| DataError::UnknownSector(name.clone()))?;
            picked.extend_from_slice(members);
            Ok(picked)
        })
    }
}
