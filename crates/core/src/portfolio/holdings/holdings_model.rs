use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use rust_decimal::Decimal;

use crate::portfolio::accounting::AssetRef;
use crate::utils::checked_add;

/// Per-wallet quantities and cash, rebuilt from the ledger on every pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletHoldings {
    /// wallet id -> asset -> signed quantity
    pub quantities: BTreeMap<String, BTreeMap<AssetRef, Decimal>>,
    /// wallet id -> currency -> balance in that currency
    pub cash: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl WalletHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a wallet's quantity by `delta`. A move that would overflow is
    /// dropped with a warning.
    pub(crate) fn add_quantity(&mut self, wallet_id: &str, asset: &AssetRef, delta: Decimal) {
        let held = self
            .quantities
            .entry(wallet_id.to_string())
            .or_default()
            .entry(asset.clone())
            .or_insert(Decimal::ZERO);
        match checked_add(*held, delta, "wallet quantity") {
            Ok(sum) => *held = sum,
            Err(e) => warn!("{} in wallet {} unchanged: {}", asset, wallet_id, e),
        }
    }

    pub(crate) fn add_cash(&mut self, wallet_id: &str, currency: &str, delta: Decimal) {
        let balance = self
            .cash
            .entry(wallet_id.to_string())
            .or_default()
            .entry(currency.to_string())
            .or_insert(Decimal::ZERO);
        match checked_add(*balance, delta, "cash balance") {
            Ok(sum) => *balance = sum,
            Err(e) => warn!("{} cash of wallet {} unchanged: {}", currency, wallet_id, e),
        }
    }

    pub fn quantity(&self, wallet_id: &str, asset: &AssetRef) -> Decimal {
        self.quantities
            .get(wallet_id)
            .and_then(|assets| assets.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn cash_balance(&self, wallet_id: &str, currency: &str) -> Decimal {
        self.cash
            .get(wallet_id)
            .and_then(|balances| balances.get(currency))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Every wallet that holds a quantity or a cash balance, sorted.
    pub fn wallet_ids(&self) -> BTreeSet<String> {
        self.quantities
            .keys()
            .chain(self.cash.keys())
            .cloned()
            .collect()
    }

    /// Sum of one asset across all wallets.
    /// `None` if the sum overflows.
    pub fn total_quantity(&self, asset: &AssetRef) -> Option<Decimal> {
        self.quantities
            .values()
            .filter_map(|assets| assets.get(asset))
            .try_fold(Decimal::ZERO, |total, quantity| total.checked_add(*quantity))
    }
}
