//! Upstream provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` and `FxRateProvider` traits that all adapters implement
//! - Provider capabilities (asset classes, lookup mode)
//! - Concrete provider implementations (CoinGecko, DexScreener, Yahoo, Frankfurter)
//!
//! # Architecture
//!
//! The provider system is designed to be:
//! - **Provider-agnostic**: Callers only see `PriceCandidate` lists and `Decimal` rates
//! - **Extensible**: New providers can be added by implementing one of the traits
//! - **Stateless**: Caching and fallback live in the caller, not in the providers

mod capabilities;
mod traits;

pub mod coingecko;
pub mod dexscreener;
pub mod frankfurter;
pub mod yahoo;

pub use capabilities::{LookupMode, ProviderCapabilities};
pub use traits::{FxRateProvider, PriceProvider};

use std::time::Duration;

use reqwest::Client;

use crate::errors::MarketDataError;

/// Default per-request deadline for provider HTTP clients.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with the given request timeout.
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport error to the provider-tagged error variant.
pub(crate) fn map_send_error(provider: &str, error: reqwest::Error) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::provider(provider, format!("Request failed: {}", error))
    }
}

/// Reject rate limiting and non-2xx statuses, returning the body otherwise.
pub(crate) async fn read_success_body(
    provider: &str,
    response: reqwest::Response,
) -> Result<String, MarketDataError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::RateLimited {
            provider: provider.to_string(),
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MarketDataError::provider(
            provider,
            format!("HTTP {} - {}", status, body),
        ));
    }

    response.text().await.map_err(|e| {
        MarketDataError::provider(provider, format!("Failed to read response: {}", e))
    })
}
