//! Price candidate returned by a provider search or market list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One quoted instrument that might be the asset the caller asked for.
///
/// DEX-style providers return one candidate per trading pair, so the same
/// base symbol can appear many times with different quote currencies and
/// liquidity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCandidate {
    /// Ticker symbol (e.g., "BTC", "AAPL")
    pub symbol: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,

    /// Provider-specific id (e.g., CoinGecko "bitcoin", a token address)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Last price, denominated in `currency`
    pub price: Decimal,

    /// Currency of `price` (upper-case)
    pub currency: String,

    /// Quote side of a trading pair (e.g., "USDT", "WETH")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_symbol: Option<String>,

    /// Pool liquidity, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Decimal>,

    /// Trading volume, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Provider that produced the candidate
    pub source: String,
}

impl PriceCandidate {
    /// Create a new candidate with required fields.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            id: None,
            price,
            currency: currency.into().to_uppercase(),
            quote_symbol: None,
            liquidity: None,
            volume: None,
            source: source.into(),
        }
    }

    /// Set the provider id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the quote symbol of the trading pair.
    pub fn with_quote_symbol(mut self, quote_symbol: impl Into<String>) -> Self {
        self.quote_symbol = Some(quote_symbol.into());
        self
    }

    /// Set the reported liquidity.
    pub fn with_liquidity(mut self, liquidity: Option<Decimal>) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// Set the reported volume.
    pub fn with_volume(mut self, volume: Option<Decimal>) -> Self {
        self.volume = volume;
        self
    }

    /// A candidate is only usable when it carries a positive price.
    pub fn has_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}
