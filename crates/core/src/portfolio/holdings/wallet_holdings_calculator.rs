use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::holdings_model::WalletHoldings;
use crate::constants::UNASSIGNED_WALLET_ID;
use crate::ledger::{
    AssetTransaction, AssetTransactionKind, FeeUnit, FiatTransaction, FiatTransactionKind,
};
use crate::portfolio::accounting::AssetRef;
use crate::utils::{checked_add, checked_sub};

/// Replays the ledger per wallet.
///
/// Asset trades move quantities; fiat movements move cash in their own
/// currency. No prices or FX rates are involved.
#[derive(Debug, Clone)]
pub struct WalletHoldingsCalculator {
    /// wallet id -> wallet currency, used for fiat rows that name none
    wallet_currencies: HashMap<String, String>,
    default_currency: String,
}

impl WalletHoldingsCalculator {
    pub fn new(wallet_currencies: HashMap<String, String>, default_currency: impl Into<String>) -> Self {
        Self {
            wallet_currencies,
            default_currency: default_currency.into().to_ascii_uppercase(),
        }
    }

    pub fn calculate(
        &self,
        asset_transactions: &[AssetTransaction],
        fiat_transactions: &[FiatTransaction],
    ) -> WalletHoldings {
        let mut holdings = WalletHoldings::new();

        let mut assets: Vec<&AssetTransaction> = asset_transactions.iter().collect();
        assets.sort_by_key(|tx| (tx.timestamp, tx.ledger_index));
        for tx in assets {
            self.apply_asset_transaction(tx, &mut holdings);
        }

        let mut fiat: Vec<&FiatTransaction> = fiat_transactions.iter().collect();
        fiat.sort_by_key(|tx| (tx.timestamp, tx.ledger_index));
        for tx in fiat {
            self.apply_fiat_transaction(tx, &mut holdings);
        }

        holdings
    }

    fn apply_asset_transaction(&self, tx: &AssetTransaction, holdings: &mut WalletHoldings) {
        let asset = AssetRef::new(tx.asset_class, tx.asset_key.clone());
        let from = tx.from_wallet.as_deref();
        let to = tx.to_wallet.as_deref();

        match &tx.kind {
            AssetTransactionKind::Buy { quantity, .. } => {
                let wallet = to.or(from).unwrap_or(UNASSIGNED_WALLET_ID);
                holdings.add_quantity(wallet, &asset, *quantity);
            }
            AssetTransactionKind::Sell { quantity, .. } => {
                let wallet = from.or(to).unwrap_or(UNASSIGNED_WALLET_ID);
                holdings.add_quantity(wallet, &asset, -*quantity);
            }
            AssetTransactionKind::Transfer {
                quantity,
                fee,
                fee_unit,
            } => {
                if from.is_none() && to.is_none() {
                    warn!(
                        "Transfer {} of {} names no wallet. Ignored for wallet holdings.",
                        tx.id, asset
                    );
                    return;
                }
                let net = match fee_unit {
                    FeeUnit::Asset => match checked_sub(*quantity, *fee, "net transfer") {
                        Ok(net) => net.max(Decimal::ZERO),
                        Err(e) => {
                            warn!("Transfer {} of {} ignored: {}", tx.id, asset, e);
                            return;
                        }
                    },
                    FeeUnit::Currency => *quantity,
                };
                if let Some(source) = from {
                    holdings.add_quantity(source, &asset, -*quantity);
                }
                if let Some(destination) = to {
                    holdings.add_quantity(destination, &asset, net);
                }
            }
        }
    }

    /// Currency of a fiat row: its own, else its wallet's, else the default.
    fn fiat_currency(&self, tx: &FiatTransaction, wallet_id: &str) -> String {
        tx.currency
            .clone()
            .or_else(|| self.wallet_currencies.get(wallet_id).cloned())
            .unwrap_or_else(|| self.default_currency.clone())
    }

    fn apply_fiat_transaction(&self, tx: &FiatTransaction, holdings: &mut WalletHoldings) {
        let from = tx.from_wallet.as_deref();
        let to = tx.to_wallet.as_deref();
        let (received, spent) = match (
            checked_sub(tx.amount, tx.fee, "cash received"),
            checked_add(tx.amount, tx.fee, "cash spent"),
        ) {
            (Ok(received), Ok(spent)) => (received, spent),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Cash movement {} ignored: {}", tx.id, e);
                return;
            }
        };

        match tx.kind {
            FiatTransactionKind::Income => {
                let wallet = to.or(from).unwrap_or(UNASSIGNED_WALLET_ID);
                let currency = self.fiat_currency(tx, wallet);
                holdings.add_cash(wallet, &currency, received);
            }
            FiatTransactionKind::Expense => {
                let wallet = from.or(to).unwrap_or(UNASSIGNED_WALLET_ID);
                let currency = self.fiat_currency(tx, wallet);
                holdings.add_cash(wallet, &currency, -spent);
            }
            FiatTransactionKind::Transfer => {
                match (from, to) {
                    (None, None) => {
                        warn!("Cash transfer {} names no wallet. Ignored.", tx.id);
                    }
                    (source, destination) => {
                        // One currency for both legs; the ledger records a single amount.
                        let currency = self.fiat_currency(tx, source.or(destination).unwrap_or_default());
                        if let Some(source) = source {
                            holdings.add_cash(source, &currency, -spent);
                        }
                        if let Some(destination) = destination {
                            holdings.add_cash(destination, &currency, tx.amount);
                        }
                    }
                }
            }
        }

        debug!("Applied cash movement {} ({:?})", tx.id, tx.kind);
    }
}
