use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallyfolio_market_data::AssetClass;

use crate::errors::CalculatorError;
use crate::utils::{checked_mul, checked_sub};

/// Identity of a traded instrument across the ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub asset_class: AssetClass,
    pub asset_key: String,
}

impl AssetRef {
    pub fn new(asset_class: AssetClass, asset_key: impl Into<String>) -> Self {
        Self {
            asset_class,
            asset_key: asset_key.into(),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.asset_key, self.asset_class)
    }
}

/// Running totals for one asset after replaying its transactions.
///
/// Monetary fields are in the base currency of the pass. `quantity_held` may
/// be negative (short). While `quantity_held > 0`, `cost_basis / quantity_held`
/// is the weighted-average unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    pub asset_key: String,
    pub asset_class: AssetClass,
    pub base_currency: String,
    pub quantity_held: Decimal,
    pub cost_basis: Decimal,
    pub total_fees_paid: Decimal,
    pub total_invested: Decimal,
    pub total_proceeds: Decimal,
    pub transaction_count: usize,
    /// Transactions replayed with at least one field defaulted to zero, or
    /// whose amounts overflowed.
    pub degraded_transactions: usize,
    /// Some monetary effect was left out because an FX rate was missing.
    pub fx_degraded: bool,
}

impl AssetPosition {
    pub fn new(asset: &AssetRef, base_currency: &str) -> Self {
        Self {
            asset_key: asset.asset_key.clone(),
            asset_class: asset.asset_class,
            base_currency: base_currency.to_string(),
            quantity_held: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            total_fees_paid: Decimal::ZERO,
            total_invested: Decimal::ZERO,
            total_proceeds: Decimal::ZERO,
            transaction_count: 0,
            degraded_transactions: 0,
            fx_degraded: false,
        }
    }

    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::new(self.asset_class, self.asset_key.clone())
    }

    /// Weighted-average unit cost, defined only for a long position.
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.quantity_held > Decimal::ZERO {
            self.cost_basis.checked_div(self.quantity_held)
        } else {
            None
        }
    }

    /// Take `quantity` out of the position at the current average cost.
    ///
    /// Only the covered part reduces cost basis; any excess deepens a short
    /// position without touching it. Nothing changes on overflow.
    pub(crate) fn remove_at_average_cost(&mut self, quantity: Decimal) -> Result<(), CalculatorError> {
        if quantity <= Decimal::ZERO {
            return Ok(());
        }
        let quantity_held = checked_sub(self.quantity_held, quantity, "quantity held")?;
        let cost_basis = if self.quantity_held <= Decimal::ZERO {
            self.cost_basis
        } else if quantity >= self.quantity_held {
            Decimal::ZERO
        } else {
            let avg_cost = self
                .average_cost()
                .ok_or_else(|| CalculatorError::Overflow("average cost".to_string()))?;
            let removed_cost = checked_mul(quantity, avg_cost, "cost of removed quantity")?;
            checked_sub(self.cost_basis, removed_cost, "cost basis")?
        };

        self.quantity_held = quantity_held;
        self.cost_basis = cost_basis;
        Ok(())
    }
}

/// A transaction whose effect could only be partly applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingWarning {
    pub transaction_id: String,
    pub asset_key: String,
    pub message: String,
}

impl fmt::Display for AccountingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction {} (asset: {}): {}",
            self.transaction_id, self.asset_key, self.message
        )
    }
}

/// Replay output: the position is always returned, warnings say what was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountingResult {
    pub position: AssetPosition,
    pub warnings: Vec<AccountingWarning>,
}

impl AccountingResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
