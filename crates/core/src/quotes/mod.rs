//! Quotes module - live price resolution for ledger asset identifiers.

mod price_oracle;
mod quotes_errors;
mod quotes_model;
mod quotes_traits;


pub use price_oracle::{PriceCacheKey, PriceOracle};
pub use quotes_errors::QuoteError;
pub use quotes_model::{PriceLookup, PriceStatus, ResolvedPrice};
pub use quotes_traits::PriceOracleTrait;
