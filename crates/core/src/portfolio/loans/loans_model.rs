use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::round_amount;

/// Outstanding loan totals in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub currency: String,
    /// Owed to the user.
    pub receive_total: Decimal,
    /// Owed by the user.
    pub owe_total: Decimal,
    /// Loans left out because their currency could not be converted.
    pub excluded_loans: usize,
    pub fx_degraded: bool,
}

impl LoanSummary {
    pub fn empty(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            receive_total: Decimal::ZERO,
            owe_total: Decimal::ZERO,
            excluded_loans: 0,
            fx_degraded: false,
        }
    }

    /// Receivable minus owed; `None` when the difference does not fit.
    pub fn net(&self) -> Option<Decimal> {
        self.receive_total.checked_sub(self.owe_total)
    }

    pub fn rounded(&self) -> Self {
        Self {
            receive_total: round_amount(self.receive_total),
            owe_total: round_amount(self.owe_total),
            ..self.clone()
        }
    }
}
