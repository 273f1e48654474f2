//! Provider trait definitions.
//!
//! This module defines the `PriceProvider` and `FxRateProvider` traits that all
//! upstream adapters implement.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::PriceCandidate;

use super::capabilities::ProviderCapabilities;

/// Trait for live price providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tallyfolio_market_data::provider::{LookupMode, PriceProvider, ProviderCapabilities};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl PriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             asset_classes: &[AssetClass::Crypto],
///             lookup_mode: LookupMode::PerQuery,
///         }
///     }
///
///     // ... implement search
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "COINGECKO", "DEXSCREENER", etc.
    /// Used for logging and as part of cache keys.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Return every candidate the provider knows for `query`.
    ///
    /// # Arguments
    ///
    /// * `query` - The search query (e.g., "BTC", "Bitcoin", "AAPL"). Ignored by
    ///   market-list providers.
    /// * `vs_currency` - Preferred quote currency. Providers that cannot price in
    ///   it report their native currency on each candidate instead.
    async fn search(
        &self,
        query: &str,
        vs_currency: &str,
    ) -> Result<Vec<PriceCandidate>, MarketDataError>;
}

/// Trait for spot FX rate providers.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    /// Unique identifier for this provider.
    fn id(&self) -> &'static str;

    /// Current-day spot rate: one unit of `from` in units of `to`.
    async fn latest_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError>;
}
