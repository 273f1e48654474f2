//! Market data models
//!
//! This module contains the core data types shared by providers and callers:
//! - `types` - Type alias for provider identifiers (ProviderId)
//! - `asset_class` - The ledger-facing asset classification (AssetClass)
//! - `candidate` - A single quoted match returned by a price provider (PriceCandidate)
//! - `fx` - A spot FX quote (FxQuote)

mod asset_class;
mod candidate;
mod fx;
mod types;

pub use asset_class::AssetClass;
pub use candidate::PriceCandidate;
pub use fx::FxQuote;
pub use types::ProviderId;
