//! DexScreener price provider.
//!
//! Uses the `/latest/dex/search` endpoint. A search returns one entry per
//! trading pair, so a popular token shows up many times with different quote
//! tokens and liquidity; picking the right pair is left to the resolver's
//! ranking.
//!
//! API documentation: https://docs.dexscreener.com/api/reference

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use num_traits::FromPrimitive;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, PriceCandidate};
use crate::provider::{
    http_client, map_send_error, read_success_body, LookupMode, PriceProvider,
    ProviderCapabilities, DEFAULT_HTTP_TIMEOUT,
};

const BASE_URL: &str = "https://api.dexscreener.com";
const PROVIDER_ID: &str = "DEXSCREENER";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    base_token: Token,
    quote_token: Token,
    price_usd: Option<String>,
    liquidity: Option<Liquidity>,
    volume: Option<Volume>,
}

#[derive(Debug, Deserialize)]
struct Token {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    h24: Option<f64>,
}

/// DexScreener pair-search provider.
pub struct DexScreenerProvider {
    client: Client,
    base_url: String,
}

impl Default for DexScreenerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DexScreenerProvider {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the API host (used against local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn pair_to_candidate(pair: Pair) -> Option<PriceCandidate> {
    let price = pair
        .price_usd
        .as_deref()
        .and_then(|p| Decimal::from_str(p.trim()).ok())?;

    let mut candidate = PriceCandidate::new(
        pair.base_token.symbol.to_uppercase(),
        pair.base_token.name,
        price,
        "USD",
        PROVIDER_ID,
    )
    .with_quote_symbol(pair.quote_token.symbol.to_uppercase())
    .with_liquidity(pair.liquidity.and_then(|l| l.usd).and_then(Decimal::from_f64))
    .with_volume(pair.volume.and_then(|v| v.h24).and_then(Decimal::from_f64));

    if let Some(address) = pair.base_token.address {
        candidate = candidate.with_id(address);
    }

    Some(candidate)
}

fn parse_search_response(body: &str) -> Result<Vec<PriceCandidate>, MarketDataError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ValidationFailed {
            message: format!("Unexpected DexScreener payload: {}", e),
        })?;

    Ok(response
        .pairs
        .unwrap_or_default()
        .into_iter()
        .filter_map(pair_to_candidate)
        .collect())
}

#[async_trait]
impl PriceProvider for DexScreenerProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        5
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_classes: &[AssetClass::Crypto],
            lookup_mode: LookupMode::PerQuery,
        }
    }

    async fn search(
        &self,
        query: &str,
        _vs_currency: &str,
    ) -> Result<Vec<PriceCandidate>, MarketDataError> {
        let url = format!("{}/latest/dex/search", self.base_url);
        debug!("DexScreener search for '{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER_ID, e))?;
        let body = read_success_body(PROVIDER_ID, response).await?;

        let candidates = parse_search_response(&body)?;
        if candidates.is_empty() {
            return Err(MarketDataError::SymbolNotFound(query.to_string()));
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
        let provider = DexScreenerProvider::new();
        assert_eq!(provider.id(), "DEXSCREENER");
        assert_eq!(provider.capabilities().lookup_mode, LookupMode::PerQuery);
    }

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "chainId": "ethereum",
                    "baseToken": {"address": "0xabc", "name": "Pepe", "symbol": "PEPE"},
                    "quoteToken": {"address": "0xdef", "name": "Wrapped Ether", "symbol": "WETH"},
                    "priceNative": "0.0000000004",
                    "priceUsd": "0.000001234",
                    "liquidity": {"usd": 15000000.5, "base": 1, "quote": 2},
                    "volume": {"h24": 3200000, "h6": 100}
                },
                {
                    "chainId": "bsc",
                    "baseToken": {"address": "0x123", "name": "Pepe", "symbol": "pepe"},
                    "quoteToken": {"address": "0x456", "name": "Tether", "symbol": "USDT"}
                }
            ]
        }"#;

        let candidates = parse_search_response(json).unwrap();
        assert_eq!(candidates.len(), 1);

        let pepe = &candidates[0];
        assert_eq!(pepe.symbol, "PEPE");
        assert_eq!(pepe.price, dec!(0.000001234));
        assert_eq!(pepe.currency, "USD");
        assert_eq!(pepe.quote_symbol.as_deref(), Some("WETH"));
        assert_eq!(pepe.liquidity, Some(dec!(15000000.5)));
        assert_eq!(pepe.volume, Some(dec!(3200000)));
        assert_eq!(pepe.id.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_null_pairs_parse_as_empty() {
        let candidates = parse_search_response(r#"{"schemaVersion": "1.0.0", "pairs": null}"#).unwrap();
        assert!(candidates.is_empty());
    }
}
