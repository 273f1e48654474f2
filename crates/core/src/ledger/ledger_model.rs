use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tallyfolio_market_data::AssetClass;

/// A ledger row exactly as the store returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLedgerRecord(pub Map<String, Value>);

impl RawLedgerRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value; anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value of the first key that holds something other than null or a blank string.
    pub fn first_value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().filter_map(|key| self.0.get(*key)).find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
    }

    /// Like [`first_value`](Self::first_value), rendered as trimmed text.
    pub fn first_str(&self, keys: &[&str]) -> Option<String> {
        self.first_value(keys).and_then(|value| match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }
}

impl From<Map<String, Value>> for RawLedgerRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Unit a transfer fee is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeeUnit {
    /// Fee is deducted from the transferred quantity.
    Asset,
    /// Fee is a cash cost in the transaction currency.
    Currency,
}

/// Canonical operation of an asset transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum AssetTransactionKind {
    Buy {
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    },
    Sell {
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        quantity: Decimal,
        fee: Decimal,
        fee_unit: FeeUnit,
    },
}

impl AssetTransactionKind {
    pub fn quantity(&self) -> Decimal {
        match self {
            Self::Buy { quantity, .. } | Self::Sell { quantity, .. } | Self::Transfer { quantity, .. } => {
                *quantity
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Transfer { .. } => "transfer",
        }
    }
}

/// A crypto or stock transaction after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransaction {
    pub id: String,
    pub asset_key: String,
    pub asset_class: AssetClass,
    #[serde(flatten)]
    pub kind: AssetTransactionKind,
    /// Currency of price and (non-asset) fee, upper-case.
    pub currency: String,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    /// `None` when the row carried no parsable timestamp; such rows sort first.
    pub timestamp: Option<NaiveDateTime>,
    /// Position of the row in the store's answer, used to break timestamp ties.
    pub ledger_index: usize,
    /// Fields that were present but malformed and fell back to a default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub malformed_fields: Vec<String>,
}

impl AssetTransaction {
    pub fn is_degraded(&self) -> bool {
        !self.malformed_fields.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FiatTransactionKind {
    Income,
    Expense,
    Transfer,
}

/// A cash movement after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatTransaction {
    pub id: String,
    pub kind: FiatTransactionKind,
    pub amount: Decimal,
    pub fee: Decimal,
    /// Upper-case currency, or `None` when the row did not say.
    pub currency: Option<String>,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub ledger_index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub malformed_fields: Vec<String>,
}

impl FiatTransaction {
    pub fn is_degraded(&self) -> bool {
        !self.malformed_fields.is_empty()
    }
}

/// A wallet as known to the ledger store.
///
/// Stored balances are ignored; balances are always recomputed from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub wallet_type: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanKind {
    /// Money owed by the user.
    Borrow,
    /// Money owed to the user.
    Lend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanAction {
    New,
    Repay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: String,
    pub kind: LoanKind,
    pub action: LoanAction,
    pub amount: Decimal,
    /// Upper-case currency, or `None` when the row did not say.
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub malformed_fields: Vec<String>,
}

/// A row that could not be turned into a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerIssue {
    pub record_id: Option<String>,
    pub ledger_index: usize,
    pub message: String,
}

impl fmt::Display for LedgerIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row {} (id: {}): {}",
            self.ledger_index,
            self.record_id.as_deref().unwrap_or("-"),
            self.message
        )
    }
}

/// Output of a normalization pass: usable records plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub skipped: Vec<LedgerIssue>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}
