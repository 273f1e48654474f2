//! Yahoo Finance stock price provider.
//!
//! Looks up the latest daily bar for a ticker (e.g., AAPL, SHOP.TO). Prices are
//! labelled with the listing currency from the chart metadata; the caller's
//! `vs_currency` is only a hint for tickers whose metadata has none.

use std::time::Duration;

use async_trait::async_trait;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, PriceCandidate};
use crate::provider::{LookupMode, PriceProvider, ProviderCapabilities, DEFAULT_HTTP_TIMEOUT};

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance latest-quote provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    timeout: Duration,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        Ok(Self {
            connector,
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Currency of a quote: API response > caller hint.
    fn quote_currency(reported: Option<&str>, hint: &str) -> String {
        match reported.map(str::trim).filter(|ccy| !ccy.is_empty()) {
            Some(ccy) => ccy.to_uppercase(),
            None => hint.trim().to_uppercase(),
        }
    }

    fn bar_to_candidate(
        symbol: &str,
        close: f64,
        volume: u64,
        currency: &str,
    ) -> Result<PriceCandidate, MarketDataError> {
        let price = Decimal::from_f64(close).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Failed to convert close price for {}: {}", symbol, close),
        })?;

        Ok(
            PriceCandidate::new(symbol, symbol, price, currency, PROVIDER_ID)
                .with_volume(Decimal::from_u64(volume)),
        )
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_classes: &[AssetClass::Stock],
            lookup_mode: LookupMode::PerQuery,
        }
    }

    async fn search(
        &self,
        query: &str,
        vs_currency: &str,
    ) -> Result<Vec<PriceCandidate>, MarketDataError> {
        let symbol = query.trim().to_uppercase();
        if symbol.is_empty() || symbol.contains(char::is_whitespace) {
            return Err(MarketDataError::SymbolNotFound(query.to_string()));
        }
        debug!("Yahoo latest quote for '{}'", symbol);

        let response = tokio::time::timeout(
            self.timeout,
            self.connector.get_latest_quotes(&symbol, "1d"),
        )
        .await
        .map_err(|_| MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        })?
        .map_err(|e| {
            if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                MarketDataError::SymbolNotFound(symbol.clone())
            } else {
                MarketDataError::provider(PROVIDER_ID, e.to_string())
            }
        })?;

        let bar = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.clone())
        })?;

        let reported = response.metadata().ok().and_then(|meta| meta.currency);
        if reported.is_none() {
            debug!("No listing currency for {}, assuming {}", symbol, vs_currency);
        }
        let currency = Self::quote_currency(reported.as_deref(), vs_currency);

        Ok(vec![Self::bar_to_candidate(
            &symbol,
            bar.close,
            bar.volume,
            &currency,
        )?])
    }
}
