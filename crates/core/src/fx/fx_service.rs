use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;
use tallyfolio_market_data::{FxQuote, FxRateProvider, MarketDataError};

use super::currency::normalize_currency_code;
use super::fx_errors::FxError;
use super::fx_model::{FxCacheKey, FxRateMap};
use super::fx_traits::FxServiceTrait;
use crate::cache::TtlCache;

/// Currency Conversion Layer.
///
/// Order of resolution: identity, fresh cache entry, provider call (bounded by
/// `timeout`), then any stale cache entry. Each fetched rate is cached in
/// both directions.
#[derive(Clone)]
pub struct FxService {
    provider: Arc<dyn FxRateProvider>,
    cache: TtlCache<FxCacheKey, FxQuote>,
    timeout: Duration,
}

impl FxService {
    pub fn new(
        provider: Arc<dyn FxRateProvider>,
        cache: TtlCache<FxCacheKey, FxQuote>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            timeout,
        }
    }

    async fn fetch_from_provider(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError> {
        let rate = tokio::time::timeout(self.timeout, self.provider.latest_rate(from, to))
            .await
            .map_err(|_| MarketDataError::Timeout {
                provider: self.provider.id().to_string(),
            })??;

        if rate <= Decimal::ZERO {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Non-positive rate {} for {}->{}", rate, from, to),
            });
        }
        Ok(rate)
    }

    fn store_rate(&self, from: &str, to: &str, rate: Decimal) {
        let source = self.provider.id().to_string();
        let timestamp = Utc::now();

        self.cache.insert(
            (from.to_string(), to.to_string()),
            FxQuote {
                from: from.to_string(),
                to: to.to_string(),
                rate,
                timestamp,
                source: source.clone(),
            },
        );
        self.cache.insert(
            (to.to_string(), from.to_string()),
            FxQuote {
                from: to.to_string(),
                to: from.to_string(),
                rate: Decimal::ONE / rate,
                timestamp,
                source,
            },
        );
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    async fn get_rate(&self, from: &str, to: &str) -> Result<Decimal, FxError> {
        if from.trim().eq_ignore_ascii_case(to.trim()) {
            return Ok(Decimal::ONE);
        }

        let from = normalize_currency_code(from)?;
        let to = normalize_currency_code(to)?;

        let key = (from.clone(), to.clone());
        if let Some(quote) = self.cache.get_fresh(&key) {
            return Ok(quote.rate);
        }

        match self.fetch_from_provider(&from, &to).await {
            Ok(rate) => {
                debug!("Fetched FX rate {}->{}: {}", from, to, rate);
                self.store_rate(&from, &to, rate);
                Ok(rate)
            }
            Err(e) => match self.cache.get_any(&key) {
                Some(stale) => {
                    warn!(
                        "FX provider failed for {}->{} ({}). Serving cached rate {} fetched {}s ago.",
                        from,
                        to,
                        e,
                        stale.value.rate,
                        stale.age.num_seconds()
                    );
                    Ok(stale.value.rate)
                }
                None => {
                    warn!(
                        "FX provider failed for {}->{} and no cached rate exists: {}",
                        from, to, e
                    );
                    Err(FxError::ProviderUnavailable {
                        from,
                        to,
                        message: e.to_string(),
                    })
                }
            },
        }
    }

    async fn build_rate_map(&self, pairs: &[FxCacheKey]) -> FxRateMap {
        let results = join_all(pairs.iter().map(|(from, to)| async move {
            (from, to, self.get_rate(from, to).await)
        }))
        .await;

        let mut map = FxRateMap::new();
        for (from, to, result) in results {
            match result {
                Ok(rate) => map.insert(from, to, rate),
                Err(e) => warn!("Leaving {}->{} out of the rate map: {}", from, to, e),
            }
        }
        map
    }
}
