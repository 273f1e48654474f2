use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallyfolio_market_data::AssetClass;

use crate::portfolio::loans::LoanSummary;
use crate::quotes::PriceStatus;
use crate::utils::{round_amount, round_price, round_quantity};

/// Per-asset totals. Monetary fields are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetValuation {
    pub asset_key: String,
    pub asset_class: AssetClass,
    pub quantity_held: Decimal,
    pub cost_basis: Decimal,
    pub average_cost: Option<Decimal>,
    pub total_invested: Decimal,
    pub total_proceeds: Decimal,
    pub total_fees_paid: Decimal,
    /// Zero when the price could not be resolved or converted.
    pub latest_price: Decimal,
    pub market_value: Decimal,
    pub total_current_worth: Decimal,
    pub gain_loss_amount: Decimal,
    /// `None` when nothing was invested.
    pub gain_loss_percent: Option<Decimal>,
    pub price_status: PriceStatus,
    pub fx_degraded: bool,
    pub degraded_transactions: usize,
    /// Market value did not fit in a Decimal; the derived figures are zero.
    pub overflowed: bool,
}

impl AssetValuation {
    /// Presentation copy with display rounding applied.
    pub fn rounded(&self) -> Self {
        Self {
            quantity_held: round_quantity(self.quantity_held, self.asset_class),
            cost_basis: round_amount(self.cost_basis),
            average_cost: self.average_cost.map(round_price),
            total_invested: round_amount(self.total_invested),
            total_proceeds: round_amount(self.total_proceeds),
            total_fees_paid: round_amount(self.total_fees_paid),
            latest_price: round_price(self.latest_price),
            market_value: round_amount(self.market_value),
            total_current_worth: round_amount(self.total_current_worth),
            gain_loss_amount: round_amount(self.gain_loss_amount),
            gain_loss_percent: self.gain_loss_percent.map(round_amount),
            ..self.clone()
        }
    }
}

/// One asset inside a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAssetValuation {
    pub asset_key: String,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    pub market_value: Decimal,
}

/// Per-wallet totals in the base currency, plus the wallet's own currency
/// when it is known and convertible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletValuation {
    pub wallet_id: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub cash_balance: Decimal,
    pub asset_market_value: Decimal,
    pub total_valuation: Decimal,
    pub total_valuation_native: Option<Decimal>,
    /// Cash per currency, unconverted.
    pub cash_by_currency: BTreeMap<String, Decimal>,
    pub assets: Vec<WalletAssetValuation>,
    pub fx_degraded: bool,
    /// Some amount did not fit in a Decimal and was left out of the totals.
    pub overflowed: bool,
}

impl WalletValuation {
    pub fn rounded(&self) -> Self {
        Self {
            cash_balance: round_amount(self.cash_balance),
            asset_market_value: round_amount(self.asset_market_value),
            total_valuation: round_amount(self.total_valuation),
            total_valuation_native: self.total_valuation_native.map(round_amount),
            cash_by_currency: self
                .cash_by_currency
                .iter()
                .map(|(ccy, amount)| (ccy.clone(), round_amount(*amount)))
                .collect(),
            assets: self
                .assets
                .iter()
                .map(|a| WalletAssetValuation {
                    quantity: round_quantity(a.quantity, a.asset_class),
                    market_value: round_amount(a.market_value),
                    ..a.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Portfolio-level sums over all assets and wallets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: Decimal,
    pub total_proceeds: Decimal,
    pub total_fees_paid: Decimal,
    pub market_value: Decimal,
    pub total_current_worth: Decimal,
    pub gain_loss_amount: Decimal,
    pub gain_loss_percent: Option<Decimal>,
    pub cash_balance: Decimal,
    pub overflowed: bool,
}

impl PortfolioSummary {
    pub fn rounded(&self) -> Self {
        Self {
            total_invested: round_amount(self.total_invested),
            total_proceeds: round_amount(self.total_proceeds),
            total_fees_paid: round_amount(self.total_fees_paid),
            market_value: round_amount(self.market_value),
            total_current_worth: round_amount(self.total_current_worth),
            gain_loss_amount: round_amount(self.gain_loss_amount),
            gain_loss_percent: self.gain_loss_percent.map(round_amount),
            cash_balance: round_amount(self.cash_balance),
            overflowed: self.overflowed,
        }
    }
}

/// Whether the ledger answered, and with anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LedgerStatus {
    Available,
    Empty,
    /// Listed resources could not be read and contributed no rows.
    Unreachable { sources: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub base_currency: String,
    pub assets: Vec<AssetValuation>,
    pub wallets: Vec<WalletValuation>,
    pub summary: PortfolioSummary,
    pub loans: LoanSummary,
    pub ledger_status: LedgerStatus,
    pub warnings: Vec<String>,
    pub fx_degraded: bool,
}

impl PortfolioValuation {
    pub fn rounded(&self) -> Self {
        Self {
            assets: self.assets.iter().map(AssetValuation::rounded).collect(),
            wallets: self.wallets.iter().map(WalletValuation::rounded).collect(),
            summary: self.summary.rounded(),
            loans: self.loans.rounded(),
            ..self.clone()
        }
    }
}
