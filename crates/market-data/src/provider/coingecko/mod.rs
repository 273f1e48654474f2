//! CoinGecko price provider.
//!
//! Uses the bulk `/coins/markets` endpoint: one call returns the top coins
//! priced in the requested `vs_currency`, so answers are cached per currency
//! bucket rather than per query.
//!
//! API documentation: https://docs.coingecko.com/

use std::time::Duration;

use async_trait::async_trait;
use num_traits::FromPrimitive;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{AssetClass, PriceCandidate};
use crate::provider::{
    http_client, map_send_error, read_success_body, LookupMode, PriceProvider,
    ProviderCapabilities, DEFAULT_HTTP_TIMEOUT,
};

const PUBLIC_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";
const PER_PAGE: u32 = 250;
const DEFAULT_PAGES: u32 = 2;

/// Single row of the `/coins/markets` response.
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    total_volume: Option<f64>,
}

/// CoinGecko market-list provider.
pub struct CoinGeckoProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    pages: u32,
}

impl CoinGeckoProvider {
    /// Create a provider for the public (or demo-key) API.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_timeout(api_key, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a provider with a custom request timeout.
    pub fn with_timeout(api_key: Option<String>, timeout: Duration) -> Self {
        // Demo keys ("CG-...") use the public host, anything else is a pro key.
        let base_url = match api_key.as_deref() {
            Some(key) if !key.starts_with("CG-") => PRO_BASE_URL,
            _ => PUBLIC_BASE_URL,
        };

        Self {
            client: http_client(timeout),
            api_key,
            base_url: base_url.to_string(),
            pages: DEFAULT_PAGES,
        }
    }

    /// Override the API host (used against local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Number of 250-row pages fetched per currency bucket.
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages.max(1);
        self
    }

    async fn fetch_page(&self, vs_currency: &str, page: u32) -> Result<Vec<MarketRow>, MarketDataError> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = PER_PAGE.to_string();
        let page = page.to_string();

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("vs_currency", vs_currency),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ]);

        if let Some(key) = &self.api_key {
            let header = if key.starts_with("CG-") {
                "x-cg-demo-api-key"
            } else {
                "x-cg-pro-api-key"
            };
            request = request.header(header, key);
        }

        debug!("CoinGecko markets request: vs_currency={} page={}", vs_currency, page);

        let response = request
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER_ID, e))?;
        let body = read_success_body(PROVIDER_ID, response).await?;

        serde_json::from_str(&body).map_err(|e| MarketDataError::ValidationFailed {
            message: format!("Unexpected CoinGecko markets payload: {}", e),
        })
    }
}

fn row_to_candidate(row: MarketRow, currency: &str) -> Option<PriceCandidate> {
    let price = row.current_price.and_then(Decimal::from_f64)?;
    Some(
        PriceCandidate::new(row.symbol.to_uppercase(), row.name, price, currency, PROVIDER_ID)
            .with_id(row.id)
            .with_volume(row.total_volume.and_then(Decimal::from_f64)),
    )
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_classes: &[AssetClass::Crypto],
            lookup_mode: LookupMode::MarketList,
        }
    }

    async fn search(
        &self,
        _query: &str,
        vs_currency: &str,
    ) -> Result<Vec<PriceCandidate>, MarketDataError> {
        let vs_lower = vs_currency.to_lowercase();
        let mut candidates = Vec::new();

        for page in 1..=self.pages {
            let rows = self.fetch_page(&vs_lower, page).await?;
            let row_count = rows.len();
            candidates.extend(rows.into_iter().filter_map(|row| row_to_candidate(row, vs_currency)));
            if row_count < PER_PAGE as usize {
                break;
            }
        }

        if candidates.is_empty() {
            warn!("CoinGecko returned an empty market list for {}", vs_currency);
            return Err(MarketDataError::SymbolNotFound(format!(
                "markets/{}",
                vs_lower
            )));
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provider_id_and_mode() {
        let provider = CoinGeckoProvider::new(None);
        assert_eq!(provider.id(), "COINGECKO");
        assert_eq!(provider.capabilities().lookup_mode, LookupMode::MarketList);
        assert!(provider.capabilities().supports(AssetClass::Crypto));
        assert!(!provider.capabilities().supports(AssetClass::Stock));
    }

    #[test]
    fn test_pro_key_switches_host() {
        assert_eq!(CoinGeckoProvider::new(None).base_url, PUBLIC_BASE_URL);
        assert_eq!(
            CoinGeckoProvider::new(Some("CG-demo".to_string())).base_url,
            PUBLIC_BASE_URL
        );
        assert_eq!(
            CoinGeckoProvider::new(Some("pro-key".to_string())).base_url,
            PRO_BASE_URL
        );
    }

    #[test]
    fn test_markets_response_parsing() {
        let json = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 61234.5, "total_volume": 2.5e10, "market_cap": 1.2e12},
            {"id": "dead-coin", "symbol": "dead", "name": "Dead", "current_price": null, "total_volume": null}
        ]"#;
        let rows: Vec<MarketRow> = serde_json::from_str(json).unwrap();
        let candidates: Vec<_> = rows
            .into_iter()
            .filter_map(|row| row_to_candidate(row, "EUR"))
            .collect();

        assert_eq!(candidates.len(), 1);
        let btc = &candidates[0];
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.id.as_deref(), Some("bitcoin"));
        assert_eq!(btc.price, dec!(61234.5));
        assert_eq!(btc.currency, "EUR");
        assert_eq!(btc.volume, Some(dec!(25000000000)));
    }
}
