use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use tallyfolio_market_data::AssetClass;

use super::valuation_calculator::ValuationCalculator;
use super::valuation_model::{LedgerStatus, PortfolioValuation};
use super::valuation_traits::ValuationServiceTrait;
use crate::errors::{Result, ValidationError};
use crate::fx::{FxCacheKey, FxServiceTrait};
use crate::ledger::{
    normalize_asset_transactions, normalize_fiat_transactions, normalize_loans,
    normalize_wallets, resolve_base_currency, sort_chronologically, LedgerError, LedgerIssue,
    LedgerStoreTrait, RawLedgerRecord,
};
use crate::portfolio::accounting::{AssetRef, CostBasisCalculator};
use crate::portfolio::holdings::WalletHoldingsCalculator;
use crate::portfolio::loans::calculate_loan_summary;
use crate::quotes::{PriceLookup, PriceOracleTrait, PriceStatus};

/// Runs one valuation pass per request: read the ledger, resolve prices and
/// FX rates up front, then hand everything to the synchronous calculators.
pub struct ValuationService {
    ledger: Arc<dyn LedgerStoreTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    price_oracle: Arc<dyn PriceOracleTrait>,
    default_base_currency: String,
}

/// Ledger reads of one pass; failed reads are recorded, not raised.
#[derive(Default)]
struct LedgerSnapshot {
    unreachable: Vec<String>,
    warnings: Vec<String>,
}

impl LedgerSnapshot {
    fn rows(&mut self, result: std::result::Result<Vec<RawLedgerRecord>, LedgerError>) -> Vec<RawLedgerRecord> {
        match result {
            Ok(rows) => rows,
            Err(e) => {
                self.note_unreachable(e);
                Vec::new()
            }
        }
    }

    fn note_unreachable(&mut self, error: LedgerError) {
        warn!("Ledger read failed, continuing without it: {}", error);
        self.warnings.push(error.to_string());
        let resource = error.resource().to_string();
        if !self.unreachable.contains(&resource) {
            self.unreachable.push(resource);
        }
    }

    fn note_skipped(&mut self, resource: &str, skipped: &[LedgerIssue]) {
        for issue in skipped {
            warn!("Skipped {} row: {}", resource, issue);
            self.warnings.push(format!("Skipped {} row: {}", resource, issue));
        }
    }
}

impl ValuationService {
    pub fn new(
        ledger: Arc<dyn LedgerStoreTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        price_oracle: Arc<dyn PriceOracleTrait>,
        default_base_currency: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            fx_service,
            price_oracle,
            default_base_currency: default_base_currency.into().to_ascii_uppercase(),
        }
    }

    /// One lookup per asset. Crypto is priced in the base currency, stocks in
    /// the currency of their latest transaction.
    async fn resolve_prices(
        &self,
        quote_currencies: &BTreeMap<AssetRef, String>,
    ) -> HashMap<AssetRef, PriceLookup> {
        let lookups = join_all(quote_currencies.iter().map(|(asset, vs_currency)| async move {
            let lookup = self
                .price_oracle
                .find_price(&asset.asset_key, asset.asset_class, vs_currency)
                .await;
            (asset.clone(), lookup)
        }))
        .await;

        lookups.into_iter().collect()
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn value_portfolio(&self, user_id: &str) -> Result<PortfolioValuation> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()).into());
        }
        debug!("Valuing portfolio for user {}", user_id);

        let (base_currency, crypto_rows, stock_rows, fiat_rows, wallet_rows, loan_rows) = futures::join!(
            self.ledger.get_base_currency(user_id),
            self.ledger.list_asset_transactions(user_id, AssetClass::Crypto),
            self.ledger.list_asset_transactions(user_id, AssetClass::Stock),
            self.ledger.list_fiat_transactions(user_id),
            self.ledger.list_wallets(user_id),
            self.ledger.list_loans(user_id),
        );

        let mut snapshot = LedgerSnapshot::default();
        let base_currency = match base_currency {
            Ok(stored) => resolve_base_currency(stored.as_deref(), &self.default_base_currency),
            Err(e) => {
                snapshot.note_unreachable(e);
                self.default_base_currency.clone()
            }
        };
        let crypto_rows = snapshot.rows(crypto_rows);
        let stock_rows = snapshot.rows(stock_rows);
        let fiat_rows = snapshot.rows(fiat_rows);
        let wallet_rows = snapshot.rows(wallet_rows);
        let loan_rows = snapshot.rows(loan_rows);

        let ledger_status = if !snapshot.unreachable.is_empty() {
            LedgerStatus::Unreachable {
                sources: snapshot.unreachable.clone(),
            }
        } else if crypto_rows.is_empty()
            && stock_rows.is_empty()
            && fiat_rows.is_empty()
            && wallet_rows.is_empty()
            && loan_rows.is_empty()
        {
            LedgerStatus::Empty
        } else {
            LedgerStatus::Available
        };

        // --- Normalize ---
        let crypto = normalize_asset_transactions(&crypto_rows, AssetClass::Crypto, &base_currency);
        let stocks = normalize_asset_transactions(&stock_rows, AssetClass::Stock, &base_currency);
        let fiat = normalize_fiat_transactions(&fiat_rows);
        let wallets = normalize_wallets(&wallet_rows);
        let loans = normalize_loans(&loan_rows);
        snapshot.note_skipped("cryptos", &crypto.skipped);
        snapshot.note_skipped("stocks", &stocks.skipped);
        snapshot.note_skipped("transactions", &fiat.skipped);
        snapshot.note_skipped("wallets", &wallets.skipped);
        snapshot.note_skipped("loans", &loans.skipped);

        let mut asset_transactions = crypto.records;
        asset_transactions.extend(stocks.records);
        sort_chronologically(&mut asset_transactions);

        // --- Wallet holdings (no prices needed) ---
        let wallet_currencies: HashMap<String, String> = wallets
            .records
            .iter()
            .filter_map(|w| w.currency.clone().map(|ccy| (w.id.clone(), ccy)))
            .collect();
        let holdings = WalletHoldingsCalculator::new(wallet_currencies, &base_currency)
            .calculate(&asset_transactions, &fiat.records);

        // --- Prices ---
        let mut quote_currencies: BTreeMap<AssetRef, String> = BTreeMap::new();
        for tx in &asset_transactions {
            let vs_currency = match tx.asset_class {
                AssetClass::Crypto => base_currency.clone(),
                AssetClass::Stock => tx.currency.clone(),
            };
            quote_currencies.insert(AssetRef::new(tx.asset_class, tx.asset_key.clone()), vs_currency);
        }
        let prices = self.resolve_prices(&quote_currencies).await;

        // --- FX rates for everything the calculators will convert ---
        let mut pairs: BTreeSet<FxCacheKey> = BTreeSet::new();
        let mut to_base = |currency: &str| {
            pairs.insert((currency.to_string(), base_currency.clone()));
        };
        for tx in &asset_transactions {
            to_base(&tx.currency);
        }
        for lookup in prices.values().filter(|l| l.is_resolved()) {
            to_base(&lookup.currency);
        }
        for balances in holdings.cash.values() {
            balances.keys().for_each(|ccy| to_base(ccy));
        }
        for loan in &loans.records {
            if let Some(ccy) = &loan.currency {
                to_base(ccy);
            }
        }
        for wallet in &wallets.records {
            if let Some(ccy) = &wallet.currency {
                pairs.insert((base_currency.clone(), ccy.clone()));
            }
        }
        let pairs: Vec<FxCacheKey> = pairs
            .into_iter()
            .filter(|(from, to)| !from.eq_ignore_ascii_case(to))
            .collect();
        let rates = self.fx_service.build_rate_map(&pairs).await;

        // --- Calculate ---
        let mut warnings = snapshot.warnings;

        let accounting = CostBasisCalculator::new(&base_currency).calculate_all(&asset_transactions, &rates);
        let valuation_calculator = ValuationCalculator::new(&base_currency);

        let mut assets = Vec::with_capacity(accounting.len());
        for result in &accounting {
            warnings.extend(result.warnings.iter().map(|w| w.to_string()));
            let position = &result.position;
            let valuation =
                valuation_calculator.value_asset(position, prices.get(&position.asset_ref()), &rates);
            if let PriceStatus::Unresolved { reason } = &valuation.price_status {
                warnings.push(format!("No price for {}: {}", position.asset_ref(), reason));
            }
            if valuation.overflowed {
                warnings.push(format!(
                    "Value of {} is out of range and reported as 0",
                    position.asset_ref()
                ));
            }
            assets.push(valuation);
        }

        let wallet_valuations =
            valuation_calculator.value_wallets(&holdings, &wallets.records, &assets, &rates);
        for wallet in wallet_valuations.iter().filter(|w| w.fx_degraded) {
            warnings.push(format!(
                "Wallet {} valuation is incomplete: missing FX rates",
                wallet.wallet_id
            ));
        }
        for wallet in wallet_valuations.iter().filter(|w| w.overflowed) {
            warnings.push(format!(
                "Wallet {} valuation is incomplete: amounts out of range",
                wallet.wallet_id
            ));
        }

        let loan_summary = calculate_loan_summary(&loans.records, &rates, &base_currency);
        if loan_summary.excluded_loans > 0 {
            warnings.push(format!(
                "{} loan(s) left out of totals: missing FX rates or amounts out of range",
                loan_summary.excluded_loans
            ));
        }

        let summary = valuation_calculator.summarize(&assets, &wallet_valuations);
        if summary.overflowed {
            warnings.push("Portfolio totals are incomplete: amounts out of range".to_string());
        }
        let fx_degraded = assets.iter().any(|a| a.fx_degraded)
            || wallet_valuations.iter().any(|w| w.fx_degraded)
            || loan_summary.fx_degraded;

        info!(
            "Valued {} assets and {} wallets for user {} in {} ({} warnings)",
            assets.len(),
            wallet_valuations.len(),
            user_id,
            base_currency,
            warnings.len()
        );

        Ok(PortfolioValuation {
            base_currency,
            assets,
            wallets: wallet_valuations,
            summary,
            loans: loan_summary,
            ledger_status,
            warnings,
            fx_degraded,
        })
    }
}
