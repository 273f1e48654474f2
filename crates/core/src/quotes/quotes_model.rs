use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallyfolio_market_data::AssetClass;

/// A price matched to an asset identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub price: Decimal,
    /// Currency of `price`, upper-case.
    pub currency: String,
    pub provider: String,
    pub symbol: String,
    pub name: String,
    /// Served from an expired cache entry after an upstream failure.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PriceStatus {
    Resolved {
        provider: String,
        symbol: String,
        stale: bool,
    },
    Unresolved {
        reason: String,
    },
}

/// Outcome of a lenient price lookup. Unresolved lookups carry a zero price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLookup {
    pub identifier: String,
    pub asset_class: AssetClass,
    pub price: Decimal,
    pub currency: String,
    #[serde(flatten)]
    pub status: PriceStatus,
}

impl PriceLookup {
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, PriceStatus::Resolved { .. })
    }

    pub fn from_resolved(identifier: &str, asset_class: AssetClass, resolved: ResolvedPrice) -> Self {
        Self {
            identifier: identifier.to_string(),
            asset_class,
            price: resolved.price,
            currency: resolved.currency,
            status: PriceStatus::Resolved {
                provider: resolved.provider,
                symbol: resolved.symbol,
                stale: resolved.stale,
            },
        }
    }

    pub fn unresolved(
        identifier: &str,
        asset_class: AssetClass,
        currency: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            asset_class,
            price: Decimal::ZERO,
            currency: currency.to_string(),
            status: PriceStatus::Unresolved {
                reason: reason.into(),
            },
        }
    }
}
