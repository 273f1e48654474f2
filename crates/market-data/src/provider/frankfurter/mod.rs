//! Frankfurter FX rate provider.
//!
//! Frankfurter publishes the ECB reference rates, refreshed once per working
//! day. No API key is required.
//!
//! API documentation: https://www.frankfurter.app/docs/

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use num_traits::FromPrimitive;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::provider::{
    http_client, map_send_error, read_success_body, FxRateProvider, DEFAULT_HTTP_TIMEOUT,
};

const BASE_URL: &str = "https://api.frankfurter.app";
const PROVIDER_ID: &str = "FRANKFURTER";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[allow(dead_code)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Frankfurter spot-rate provider.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the API host (self-hosted Frankfurter instances).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_latest_response(body: &str, to: &str) -> Result<Decimal, MarketDataError> {
    let response: LatestResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::ValidationFailed {
            message: format!("Unexpected Frankfurter payload: {}", e),
        })?;

    let rate = response
        .rates
        .get(to)
        .copied()
        .ok_or_else(|| MarketDataError::SymbolNotFound(to.to_string()))?;

    let rate = Decimal::from_f64(rate).ok_or_else(|| MarketDataError::ValidationFailed {
        message: format!("Rate for {} is not representable: {}", to, rate),
    })?;

    if rate <= Decimal::ZERO {
        return Err(MarketDataError::ValidationFailed {
            message: format!("Non-positive rate for {}: {}", to, rate),
        });
    }

    Ok(rate)
}

#[async_trait]
impl FxRateProvider for FrankfurterProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn latest_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError> {
        let url = format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            encode(from),
            encode(to)
        );
        debug!("Frankfurter latest rate {}->{}", from, to);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER_ID, e))?;
        let body = read_success_body(PROVIDER_ID, response).await?;

        parse_latest_response(&body, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_latest_response_parsing() {
        let json = r#"{"amount":1.0,"base":"USD","date":"2024-05-10","rates":{"EUR":0.928}}"#;
        assert_eq!(parse_latest_response(json, "EUR").unwrap(), dec!(0.928));
    }

    #[test]
    fn test_missing_target_currency() {
        let json = r#"{"amount":1.0,"base":"USD","date":"2024-05-10","rates":{"GBP":0.8}}"#;
        let err = parse_latest_response(json, "EUR").unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(ref c) if c == "EUR"));
    }

    #[test]
    fn test_garbage_payload_fails_validation() {
        let err = parse_latest_response("<html>oops</html>", "EUR").unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
    }
}
