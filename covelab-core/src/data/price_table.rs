//! Per-ticker price histories.
//!
//! Input is a delimited-text table with at least `ticker`, `date` and `price`
//! columns, in any order, header names matched case-insensitively. Extra
//! columns (an exported row index, for instance) are ignored. Rows with an
//! empty or `NaN` price are missing observations and are dropped; any other
//! unparseable or non-positive price is an error.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use super::DataError;
use crate::domain::PricePoint;
use crate::params::DateRange;

/// Read-only store of price histories, one ascending series per ticker.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    series: BTreeMap<String, Vec<PricePoint>>,
    dropped_rows: usize,
}

/// Observation count and date coverage for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerStats {
    pub ticker: String,
    pub observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl PriceTable {
    /// Build a table from loose points. Points are grouped by ticker and
    /// sorted by date.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Result<Self, DataError> {
        let mut series: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
        for point in points {
            if point.ticker.is_empty() {
                return Err(DataError::EmptyTicker { line: 0 });
            }
            if !point.is_valid() {
                return Err(DataError::InvalidPrice {
                    line: 0,
                    ticker: point.ticker.clone(),
                    value: point.price.to_string(),
                });
            }
            series.entry(point.ticker.clone()).or_default().push(point);
        }
        Self::finish(series, 0)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(DataError::MissingColumn(name))
        };
        let ticker_col = column("ticker")?;
        let date_col = column("date")?;
        let price_col = column("price")?;

        let mut series: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
        let mut dropped = 0usize;

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let field = |i: usize| record.get(i).unwrap_or("");

            let ticker = field(ticker_col);
            if ticker.is_empty() {
                return Err(DataError::EmptyTicker { line });
            }

            let raw_price = field(price_col);
            if raw_price.is_empty() || raw_price.eq_ignore_ascii_case("nan") {
                dropped += 1;
                continue;
            }
            let price = match raw_price.parse::<f64>() {
                Ok(p) if p.is_finite() && p > 0.0 => p,
                _ => {
                    return Err(DataError::InvalidPrice {
                        line,
                        ticker: ticker.to_string(),
                        value: raw_price.to_string(),
                    })
                }
            };

            let date = parse_date(field(date_col)).ok_or_else(|| DataError::InvalidDate {
                line,
                value: field(date_col).to_string(),
            })?;

            series
                .entry(ticker.to_string())
                .or_default()
                .push(PricePoint::new(ticker, date, price));
        }

        if dropped > 0 {
            tracing::debug!(dropped, "dropped rows with missing prices");
        }
        Self::finish(series, dropped)
    }

    fn finish(
        mut series: BTreeMap<String, Vec<PricePoint>>,
        dropped_rows: usize,
    ) -> Result<Self, DataError> {
        for (ticker, points) in series.iter_mut() {
            points.sort_by_key(|p| p.date);
            if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(DataError::DuplicateObservation {
                    ticker: ticker.clone(),
                    date: w[0].date,
                });
            }
        }
        Ok(Self {
            series,
            dropped_rows,
        })
    }

    /// All tickers, sorted.
    pub fn tickers(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.series.contains_key(ticker)
    }

    /// Full history for a ticker, ascending by date.
    pub fn series(&self, ticker: &str) -> Option<&[PricePoint]> {
        self.series.get(ticker).map(Vec::as_slice)
    }

    /// History restricted to an inclusive date range. Unknown tickers and
    /// ranges with no observations both yield an empty slice.
    pub fn series_in(&self, ticker: &str, range: &DateRange) -> &[PricePoint] {
        let Some(points) = self.series(ticker) else {
            return &[];
        };
        let lo = range
            .start
            .map_or(0, |s| points.partition_point(|p| p.date < s));
        let hi = range
            .end
            .map_or(points.len(), |e| points.partition_point(|p| p.date <= e));
        if lo >= hi {
            &[]
        } else {
            &points[lo..hi]
        }
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }

    pub fn observation_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Rows skipped at load time because the price was missing.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn stats(&self) -> Vec<TickerStats> {
        self.series
            .iter()
            .filter_map(|(ticker, points)| {
                Some(TickerStats {
                    ticker: ticker.clone(),
                    observations: points.len(),
                    first_date: points.first()?.date,
                    last_date: points.last()?.date,
                })
            })
            .collect()
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component
/// (`2020-01-02 00:00:00`, `2020-01-02T00:00:00`).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}
