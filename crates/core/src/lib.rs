//! Tallyfolio Core - portfolio valuation engine.
//!
//! Rebuilds holdings, weighted-average cost basis and profit/loss from a
//! user's full ledger on every request, then values them with live prices
//! and FX rates. Upstream providers live in `tallyfolio-market-data`; the
//! ledger store is reached through [`ledger::LedgerStoreTrait`].

pub mod cache;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod ledger;
pub mod portfolio;
pub mod quotes;
pub mod utils;

pub use config::{build_valuation_service, EngineConfig};
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
