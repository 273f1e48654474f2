use async_trait::async_trait;
use log::warn;
use tallyfolio_market_data::AssetClass;

use super::quotes_errors::QuoteError;
use super::quotes_model::{PriceLookup, ResolvedPrice};

/// Trait defining the contract for the Price Oracle.
#[async_trait]
pub trait PriceOracleTrait: Send + Sync {
    /// Resolve a current price for `identifier`.
    ///
    /// `vs_currency` is the preferred quote currency; the returned price states
    /// the currency it is actually denominated in.
    async fn resolve_price(
        &self,
        identifier: &str,
        asset_class: AssetClass,
        vs_currency: &str,
    ) -> Result<ResolvedPrice, QuoteError>;

    /// Like [`resolve_price`](Self::resolve_price) but never fails: unresolved
    /// identifiers come back with a zero price and the reason.
    async fn find_price(
        &self,
        identifier: &str,
        asset_class: AssetClass,
        vs_currency: &str,
    ) -> PriceLookup {
        match self.resolve_price(identifier, asset_class, vs_currency).await {
            Ok(resolved) => PriceLookup::from_resolved(identifier, asset_class, resolved),
            Err(e) => {
                warn!("Unresolved price for '{}' ({}): {}", identifier, asset_class, e);
                PriceLookup::unresolved(
                    identifier,
                    asset_class,
                    &vs_currency.to_ascii_uppercase(),
                    e.to_string(),
                )
            }
        }
    }
}
