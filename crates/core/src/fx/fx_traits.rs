use async_trait::async_trait;
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use super::fx_model::{FxCacheKey, FxRateMap};

/// Trait defining the contract for the Currency Conversion Layer.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    /// Rate for one unit of `from` in `to`.
    ///
    /// Identity pairs return 1 without touching the cache or the provider.
    async fn get_rate(&self, from: &str, to: &str) -> Result<Decimal, FxError>;

    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal, FxError> {
        let rate = self.get_rate(from, to).await?;
        amount
            .checked_mul(rate)
            .ok_or_else(|| FxError::ConversionOverflow(format!("of {} {}->{}", amount, from, to)))
    }

    /// Resolve every pair into a map for a synchronous calculation pass.
    ///
    /// Pairs that cannot be resolved are logged and left out; the calculators
    /// see them as missing rates.
    async fn build_rate_map(&self, pairs: &[FxCacheKey]) -> FxRateMap;
}
