use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spot FX quote: one unit of `from` buys `rate` units of `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxQuote {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}
