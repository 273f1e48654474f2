use tallyfolio_market_data::{AssetClass, MarketDataError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Asset identifier is empty")]
    EmptyIdentifier,

    #[error("No price provider supports {0}")]
    NoProvider(AssetClass),

    #[error("No provider could price '{identifier}' ({asset_class})")]
    Unresolved {
        identifier: String,
        asset_class: AssetClass,
    },

    #[error("Price lookup failed: {0}")]
    MarketData(#[from] MarketDataError),
}
