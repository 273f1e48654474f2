//! Engine configuration and default wiring.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use log::{info, warn};
use tallyfolio_market_data::{
    CoinGeckoProvider, DexScreenerProvider, FrankfurterProvider, FxQuote, PriceCandidate,
    PriceProvider, YahooProvider,
};

use crate::cache::{InMemoryCacheStore, SystemClock, TtlCache};
use crate::constants::{
    DEFAULT_BASE_CURRENCY, DEFAULT_FX_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_PRICE_CACHE_TTL_SECS,
};
use crate::errors::{Error, Result};
use crate::fx::{normalize_currency_code, FxCacheKey, FxService};
use crate::ledger::HttpLedgerStore;
use crate::portfolio::valuation::ValuationService;
use crate::quotes::{PriceCacheKey, PriceOracle};

pub const ENV_DEFAULT_BASE_CURRENCY: &str = "TALLY_DEFAULT_BASE_CURRENCY";
pub const ENV_FX_CACHE_TTL_SECS: &str = "TALLY_FX_CACHE_TTL_SECS";
pub const ENV_PRICE_CACHE_TTL_SECS: &str = "TALLY_PRICE_CACHE_TTL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TALLY_HTTP_TIMEOUT_SECS";
pub const ENV_LEDGER_API_URL: &str = "TALLY_LEDGER_API_URL";
pub const ENV_LEDGER_API_KEY: &str = "TALLY_LEDGER_API_KEY";
pub const ENV_COINGECKO_API_KEY: &str = "TALLY_COINGECKO_API_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub default_base_currency: String,
    pub fx_cache_ttl: Duration,
    pub price_cache_ttl: Duration,
    /// Deadline for one upstream call.
    pub http_timeout: Duration,
    pub ledger_api_url: Option<String>,
    pub ledger_api_key: Option<String>,
    pub coingecko_api_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            fx_cache_ttl: Duration::from_secs(DEFAULT_FX_CACHE_TTL_SECS),
            price_cache_ttl: Duration::from_secs(DEFAULT_PRICE_CACHE_TTL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            ledger_api_url: None,
            ledger_api_key: None,
            coingecko_api_key: None,
        }
    }
}

impl EngineConfig {
    /// Read `TALLY_*` variables from the process environment. Unset or blank
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get(ENV_DEFAULT_BASE_CURRENCY) {
            config.default_base_currency = normalize_currency_code(&raw).map_err(|_| {
                Error::InvalidConfigValue(format!("{}={}", ENV_DEFAULT_BASE_CURRENCY, raw))
            })?;
        }
        if let Some(raw) = get(ENV_FX_CACHE_TTL_SECS) {
            config.fx_cache_ttl = parse_secs(ENV_FX_CACHE_TTL_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_PRICE_CACHE_TTL_SECS) {
            config.price_cache_ttl = parse_secs(ENV_PRICE_CACHE_TTL_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout = parse_secs(ENV_HTTP_TIMEOUT_SECS, &raw)?;
            if config.http_timeout.is_zero() {
                return Err(Error::InvalidConfigValue(format!(
                    "{} must be greater than zero",
                    ENV_HTTP_TIMEOUT_SECS
                )));
            }
        }
        config.ledger_api_url = get(ENV_LEDGER_API_URL);
        config.ledger_api_key = get(ENV_LEDGER_API_KEY);
        config.coingecko_api_key = get(ENV_COINGECKO_API_KEY);

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::InvalidConfigValue(format!("{}={}", key, raw)))
}

fn chrono_ttl(ttl: Duration) -> Result<ChronoDuration> {
    ChronoDuration::from_std(ttl)
        .map_err(|e| Error::InvalidConfigValue(format!("cache ttl {:?}: {}", ttl, e)))
}

/// Wire the default HTTP providers, caches and ledger store.
pub fn build_valuation_service(config: &EngineConfig) -> Result<ValuationService> {
    let ledger_url = config
        .ledger_api_url
        .clone()
        .ok_or_else(|| Error::MissingConfigKey(ENV_LEDGER_API_URL.to_string()))?;

    let clock = Arc::new(SystemClock);

    let fx_cache = TtlCache::new(
        Arc::new(InMemoryCacheStore::<FxCacheKey, FxQuote>::new()),
        clock.clone(),
        chrono_ttl(config.fx_cache_ttl)?,
    );
    let fx_service = FxService::new(
        Arc::new(FrankfurterProvider::with_timeout(config.http_timeout)),
        fx_cache,
        config.http_timeout,
    );

    let mut providers: Vec<Arc<dyn PriceProvider>> = vec![
        Arc::new(CoinGeckoProvider::with_timeout(
            config.coingecko_api_key.clone(),
            config.http_timeout,
        )),
        Arc::new(DexScreenerProvider::with_timeout(config.http_timeout)),
    ];
    match YahooProvider::new() {
        Ok(yahoo) => providers.push(Arc::new(yahoo.with_timeout(config.http_timeout))),
        Err(e) => warn!("Stock prices unavailable, Yahoo provider failed to start: {}", e),
    }

    let price_cache = TtlCache::new(
        Arc::new(InMemoryCacheStore::<PriceCacheKey, Arc<Vec<PriceCandidate>>>::new()),
        clock,
        chrono_ttl(config.price_cache_ttl)?,
    );
    let price_oracle = PriceOracle::new(providers, price_cache, config.http_timeout);

    let ledger = HttpLedgerStore::new(
        ledger_url,
        config.ledger_api_key.clone(),
        config.http_timeout,
    )?;

    info!(
        "Valuation service ready (base currency {}, fx ttl {:?}, price ttl {:?})",
        config.default_base_currency, config.fx_cache_ttl, config.price_cache_ttl
    );

    Ok(ValuationService::new(
        Arc::new(ledger),
        Arc::new(fx_service),
        Arc::new(price_oracle),
        config.default_base_currency.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_base_currency, "EUR");
        assert_eq!(config.fx_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.price_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_values_are_read_and_trimmed() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_DEFAULT_BASE_CURRENCY, " usd "),
            (ENV_FX_CACHE_TTL_SECS, "600"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
            (ENV_LEDGER_API_URL, "https://ledger.example.com/api/"),
            (ENV_LEDGER_API_KEY, "   "),
        ]))
        .unwrap();

        assert_eq!(config.default_base_currency, "USD");
        assert_eq!(config.fx_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(
            config.ledger_api_url.as_deref(),
            Some("https://ledger.example.com/api/")
        );
        assert_eq!(config.ledger_api_key, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_PRICE_CACHE_TTL_SECS, "five")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));

        let err = EngineConfig::from_lookup(lookup(&[(ENV_DEFAULT_BASE_CURRENCY, "EURO")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));

        let err = EngineConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }

    #[test]
    fn test_building_requires_ledger_url() {
        let err = build_valuation_service(&EngineConfig::default()).err().unwrap();
        assert!(matches!(err, Error::MissingConfigKey(key) if key == ENV_LEDGER_API_URL));
    }

    #[tokio::test]
    async fn test_builds_with_ledger_url() {
        let config = EngineConfig {
            ledger_api_url: Some("http://127.0.0.1:9".to_string()),
            ..EngineConfig::default()
        };
        assert!(build_valuation_service(&config).is_ok());
    }
}
