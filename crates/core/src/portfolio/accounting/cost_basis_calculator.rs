use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::accounting_model::{AccountingResult, AccountingWarning, AssetPosition, AssetRef};
use crate::errors::CalculatorError;
use crate::fx::FxRateMap;
use crate::ledger::{AssetTransaction, AssetTransactionKind, FeeUnit};
use crate::utils::{checked_add, checked_mul, checked_sub};

/// Weighted-average-cost replay of asset transactions.
///
/// Synchronous: every FX pair the replay needs must already be in the
/// [`FxRateMap`]. A missing rate or an overflowing amount never stops the
/// replay; the quantity effect is still applied where it fits and the rest
/// of the row is dropped with a warning.
#[derive(Debug, Clone)]
pub struct CostBasisCalculator {
    base_currency: String,
}

impl CostBasisCalculator {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into().to_ascii_uppercase(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Replay every asset found in `transactions`, one result per asset,
    /// ordered by asset class then key.
    pub fn calculate_all(
        &self,
        transactions: &[AssetTransaction],
        rates: &FxRateMap,
    ) -> Vec<AccountingResult> {
        let mut by_asset: BTreeMap<AssetRef, Vec<&AssetTransaction>> = BTreeMap::new();
        for tx in transactions {
            by_asset
                .entry(AssetRef::new(tx.asset_class, tx.asset_key.clone()))
                .or_default()
                .push(tx);
        }

        by_asset
            .into_iter()
            .map(|(asset, txs)| self.replay(&asset, txs, rates))
            .collect()
    }

    /// Replay the transactions of one asset.
    ///
    /// Rows are put in chronological order first (timestamp, then ledger
    /// order), so the result does not depend on the order they were passed in.
    pub fn calculate(
        &self,
        asset: &AssetRef,
        transactions: &[AssetTransaction],
        rates: &FxRateMap,
    ) -> AccountingResult {
        self.replay(asset, transactions.iter().collect(), rates)
    }

    fn replay(
        &self,
        asset: &AssetRef,
        mut transactions: Vec<&AssetTransaction>,
        rates: &FxRateMap,
    ) -> AccountingResult {
        transactions.sort_by_key(|tx| (tx.timestamp, tx.ledger_index));

        let mut position = AssetPosition::new(asset, &self.base_currency);
        let mut warnings = Vec::new();

        for tx in transactions {
            position.transaction_count += 1;
            if tx.is_degraded() {
                position.degraded_transactions += 1;
                debug!(
                    "Replaying degraded transaction {} ({}) with defaulted fields: {}",
                    tx.id,
                    asset,
                    tx.malformed_fields.join(", ")
                );
            }

            let outcome = match &tx.kind {
                AssetTransactionKind::Buy {
                    quantity,
                    price,
                    fee,
                } => self.handle_buy(tx, *quantity, *price, *fee, &mut position, rates),
                AssetTransactionKind::Sell {
                    quantity,
                    price,
                    fee,
                } => self.handle_sell(tx, *quantity, *price, *fee, &mut position, rates),
                AssetTransactionKind::Transfer {
                    quantity,
                    fee,
                    fee_unit,
                } => self.handle_transfer(tx, *quantity, *fee, *fee_unit, &mut position, rates),
            };

            if let Err(e) = outcome {
                let message = match &e {
                    CalculatorError::MissingFxRate(..) => {
                        position.fx_degraded = true;
                        format!(
                            "{} applied to quantity only, monetary effect skipped: {}",
                            tx.kind.name(),
                            e
                        )
                    }
                    CalculatorError::Overflow(_) => {
                        if !tx.is_degraded() {
                            position.degraded_transactions += 1;
                        }
                        format!("{} not fully applied: {}", tx.kind.name(), e)
                    }
                };
                let warning = AccountingWarning {
                    transaction_id: tx.id.clone(),
                    asset_key: asset.asset_key.clone(),
                    message,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        AccountingResult { position, warnings }
    }

    fn rate_to_base(&self, currency: &str, rates: &FxRateMap) -> Result<Decimal, CalculatorError> {
        rates
            .rate(currency, &self.base_currency)
            .map_err(|_| CalculatorError::MissingFxRate(currency.to_string(), self.base_currency.clone()))
    }

    // --- Operation handlers ---
    //
    // Quantity is applied first. Each monetary step is computed in full before
    // any field is written, so a failed step leaves those fields untouched.

    fn handle_buy(
        &self,
        tx: &AssetTransaction,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
        position: &mut AssetPosition,
        rates: &FxRateMap,
    ) -> Result<(), CalculatorError> {
        position.quantity_held = checked_add(position.quantity_held, quantity, "quantity held")?;

        let fx_rate = self.rate_to_base(&tx.currency, rates)?;
        let trade_value = checked_mul(quantity, price, "trade value")?;
        let total_cost = checked_mul(
            checked_add(trade_value, fee, "trade value")?,
            fx_rate,
            "cost in base currency",
        )?;
        let fee_in_base = checked_mul(fee, fx_rate, "fee in base currency")?;

        let cost_basis = checked_add(position.cost_basis, total_cost, "cost basis")?;
        let total_invested = checked_add(position.total_invested, total_cost, "total invested")?;
        let total_fees_paid = checked_add(position.total_fees_paid, fee_in_base, "fees paid")?;

        position.cost_basis = cost_basis;
        position.total_invested = total_invested;
        position.total_fees_paid = total_fees_paid;
        Ok(())
    }

    /// Full sale revenue is booked even when the sell exceeds holdings; the
    /// uncovered part becomes a short position at no cost.
    fn handle_sell(
        &self,
        tx: &AssetTransaction,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
        position: &mut AssetPosition,
        rates: &FxRateMap,
    ) -> Result<(), CalculatorError> {
        position.remove_at_average_cost(quantity)?;

        let fx_rate = self.rate_to_base(&tx.currency, rates)?;
        let trade_value = checked_mul(quantity, price, "trade value")?;
        let revenue = checked_mul(trade_value, fx_rate, "proceeds in base currency")?;
        let fee_in_base = checked_mul(fee, fx_rate, "fee in base currency")?;

        let total_proceeds = checked_add(position.total_proceeds, revenue, "total proceeds")?;
        let total_fees_paid = checked_add(position.total_fees_paid, fee_in_base, "fees paid")?;

        position.total_proceeds = total_proceeds;
        position.total_fees_paid = total_fees_paid;
        Ok(())
    }

    /// A transfer has no price. Only the side of it that leaves the tracked
    /// wallets moves the asset-level quantity.
    fn handle_transfer(
        &self,
        tx: &AssetTransaction,
        quantity: Decimal,
        fee: Decimal,
        fee_unit: FeeUnit,
        position: &mut AssetPosition,
        rates: &FxRateMap,
    ) -> Result<(), CalculatorError> {
        let net = match fee_unit {
            FeeUnit::Asset => checked_sub(quantity, fee, "net transfer quantity")?.max(Decimal::ZERO),
            FeeUnit::Currency => quantity,
        };

        let inflow = if tx.to_wallet.is_some() { net } else { Decimal::ZERO };
        let outflow = if tx.from_wallet.is_some() {
            quantity
        } else {
            Decimal::ZERO
        };
        let delta = checked_sub(inflow, outflow, "transfer quantity")?;

        if delta > Decimal::ZERO {
            position.quantity_held = checked_add(position.quantity_held, delta, "quantity held")?;
        } else if delta < Decimal::ZERO {
            position.remove_at_average_cost(-delta)?;
        }

        if fee_unit == FeeUnit::Currency && !fee.is_zero() {
            let fx_rate = self.rate_to_base(&tx.currency, rates)?;
            let fee_in_base = checked_mul(fee, fx_rate, "fee in base currency")?;
            position.total_fees_paid = checked_add(position.total_fees_paid, fee_in_base, "fees paid")?;
        }
        Ok(())
    }
}
