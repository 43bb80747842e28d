//! Domain types for CoveLab

pub mod ledger;
pub mod portfolio;
pub mod price;
pub mod signal;
pub mod trade;

pub use ledger::LedgerPoint;
pub use portfolio::{PortfolioPoint, PortfolioSummary};
pub use price::PricePoint;
pub use signal::SignalPoint;
pub use trade::{Trade, TradeSide};
