use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tallyfolio_market_data::{
    best_match, identifier_variants, AssetClass, LookupMode, MarketDataError, PriceCandidate,
    PriceProvider, ProviderId, RetryClass,
};

use super::quotes_errors::QuoteError;
use super::quotes_model::ResolvedPrice;
use super::quotes_traits::PriceOracleTrait;
use crate::cache::TtlCache;

/// Cache key of one provider answer.
///
/// Market-list providers answer the same list for every query, so their
/// entries are keyed by quote currency only (`query: None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceCacheKey {
    pub provider: ProviderId,
    pub query: Option<String>,
    pub vs_currency: String,
}

type CandidateList = Arc<Vec<PriceCandidate>>;

/// Price Oracle Adapter.
///
/// Providers are tried in priority order, skipping those that cannot price
/// the asset class. Per-query providers are searched with each spelling of
/// the identifier in turn; market-list providers are fetched once per quote
/// currency. Answers (including "nothing found") are cached per key, and a
/// failing provider falls back to its last cached answer.
#[derive(Clone)]
pub struct PriceOracle {
    providers: Vec<Arc<dyn PriceProvider>>,
    cache: TtlCache<PriceCacheKey, CandidateList>,
    timeout: Duration,
}

impl PriceOracle {
    pub fn new(
        mut providers: Vec<Arc<dyn PriceProvider>>,
        cache: TtlCache<PriceCacheKey, CandidateList>,
        timeout: Duration,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            cache,
            timeout,
        }
    }

    /// Provider answer for `query`, from cache when fresh.
    ///
    /// Returns the candidates and whether they came from an expired entry.
    async fn candidates(
        &self,
        provider: &Arc<dyn PriceProvider>,
        query: Option<&str>,
        vs_currency: &str,
    ) -> Result<(CandidateList, bool), MarketDataError> {
        let key = PriceCacheKey {
            provider: Cow::Borrowed(provider.id()),
            query: query.map(|q| q.to_lowercase()),
            vs_currency: vs_currency.to_string(),
        };

        if let Some(list) = self.cache.get_fresh(&key) {
            return Ok((list, false));
        }

        let fetched = tokio::time::timeout(
            self.timeout,
            provider.search(query.unwrap_or_default(), vs_currency),
        )
        .await
        .map_err(|_| MarketDataError::Timeout {
            provider: provider.id().to_string(),
        })
        .and_then(|result| result);

        match fetched {
            Ok(list) => {
                let list = Arc::new(list);
                self.cache.insert(key, Arc::clone(&list));
                Ok((list, false))
            }
            Err(MarketDataError::SymbolNotFound(_)) => {
                let empty: CandidateList = Arc::new(Vec::new());
                self.cache.insert(key, Arc::clone(&empty));
                Ok((empty, false))
            }
            Err(e) => match self.cache.get_any(&key) {
                Some(stale) => {
                    warn!(
                        "{} failed ({}). Serving cached answer from {}s ago.",
                        provider.id(),
                        e,
                        stale.age.num_seconds()
                    );
                    Ok((stale.value, true))
                }
                None => Err(e),
            },
        }
    }
}

#[async_trait]
impl PriceOracleTrait for PriceOracle {
    async fn resolve_price(
        &self,
        identifier: &str,
        asset_class: AssetClass,
        vs_currency: &str,
    ) -> Result<ResolvedPrice, QuoteError> {
        let variants = identifier_variants(identifier);
        if variants.is_empty() {
            return Err(QuoteError::EmptyIdentifier);
        }
        let vs_currency = vs_currency.trim().to_ascii_uppercase();

        let providers: Vec<&Arc<dyn PriceProvider>> = self
            .providers
            .iter()
            .filter(|p| p.capabilities().supports(asset_class))
            .collect();
        if providers.is_empty() {
            return Err(QuoteError::NoProvider(asset_class));
        }

        let mut last_error: Option<MarketDataError> = None;

        for provider in providers {
            let queries: Vec<Option<&str>> = match provider.capabilities().lookup_mode {
                LookupMode::MarketList => vec![None],
                LookupMode::PerQuery => variants.iter().map(|v| Some(v.as_str())).collect(),
            };

            for query in queries {
                match self.candidates(provider, query, &vs_currency).await {
                    Ok((list, stale)) => {
                        if let Some(found) = best_match(identifier, &list) {
                            debug!(
                                "Resolved '{}' via {} as {} ({:?} on '{}')",
                                identifier,
                                provider.id(),
                                found.candidate.symbol,
                                found.tier,
                                found.variant
                            );
                            return Ok(ResolvedPrice {
                                price: found.candidate.price,
                                currency: found.candidate.currency.clone(),
                                provider: provider.id().to_string(),
                                symbol: found.candidate.symbol.clone(),
                                name: found.candidate.name.clone(),
                                stale,
                            });
                        }
                    }
                    Err(e) => {
                        let give_up_on_provider = e.retry_class() != RetryClass::Never;
                        debug!("{} lookup for '{}' failed: {}", provider.id(), identifier, e);
                        last_error = Some(e);
                        if give_up_on_provider {
                            break;
                        }
                    }
                }
            }
        }

        Err(match last_error {
            Some(e) => QuoteError::MarketData(e),
            None => QuoteError::Unresolved {
                identifier: identifier.to_string(),
                asset_class,
            },
        })
    }
}
