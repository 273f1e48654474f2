use std::collections::{BTreeMap, HashMap};

use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::valuation_model::{
    AssetValuation, PortfolioSummary, WalletAssetValuation, WalletValuation,
};
use crate::errors::CalculatorError;
use crate::fx::{FxError, FxRateMap};
use crate::ledger::Wallet;
use crate::portfolio::accounting::{AssetPosition, AssetRef};
use crate::portfolio::holdings::WalletHoldings;
use crate::quotes::{PriceLookup, PriceStatus};
use crate::utils::{checked_add, checked_mul, checked_sub};

/// `gain / invested * 100`, or `None` when nothing was invested.
pub fn gain_loss_percent(gain_loss: Decimal, invested: Decimal) -> Option<Decimal> {
    if invested.is_zero() {
        return None;
    }
    gain_loss
        .checked_div(invested)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
}

/// Turns replay output and resolved prices into display totals.
///
/// Synchronous: prices and FX rates are resolved by the caller.
#[derive(Debug, Clone)]
pub struct ValuationCalculator {
    base_currency: String,
}

impl ValuationCalculator {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into().to_ascii_uppercase(),
        }
    }

    /// Unit price in the base currency. Unresolved prices are zero; a resolved
    /// price that cannot be converted is an error, not zero.
    fn unit_price_in_base(
        &self,
        lookup: &PriceLookup,
        rates: &FxRateMap,
    ) -> Result<Decimal, CalculatorError> {
        if !lookup.is_resolved() {
            return Ok(Decimal::ZERO);
        }
        rates
            .convert(lookup.price, &lookup.currency, &self.base_currency)
            .map_err(|e| match e {
                FxError::ConversionOverflow(detail) => {
                    CalculatorError::Overflow(format!("price conversion {}", detail))
                }
                _ => CalculatorError::MissingFxRate(
                    lookup.currency.clone(),
                    self.base_currency.clone(),
                ),
            })
    }

    pub fn value_asset(
        &self,
        position: &AssetPosition,
        lookup: Option<&PriceLookup>,
        rates: &FxRateMap,
    ) -> AssetValuation {
        let mut fx_degraded = position.fx_degraded;
        let mut price_overflowed = false;

        let (latest_price, price_status) = match lookup {
            Some(lookup) => match self.unit_price_in_base(lookup, rates) {
                Ok(price) => (price, lookup.status.clone()),
                Err(e) => {
                    warn!(
                        "Price of {} could not be converted to {}: {}",
                        position.asset_key, self.base_currency, e
                    );
                    match e {
                        CalculatorError::Overflow(_) => price_overflowed = true,
                        CalculatorError::MissingFxRate(..) => fx_degraded = true,
                    }
                    (Decimal::ZERO, lookup.status.clone())
                }
            },
            None => (
                Decimal::ZERO,
                PriceStatus::Unresolved {
                    reason: "price not requested".to_string(),
                },
            ),
        };

        let (market_value, total_current_worth, gain_loss_amount, overflowed) =
            match Self::performance(position, latest_price) {
                Ok((market_value, worth, gain_loss)) => (market_value, worth, gain_loss, false),
                Err(e) => {
                    warn!("Valuation of {} reported as zero: {}", position.asset_key, e);
                    (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, true)
                }
            };
        let overflowed = overflowed || price_overflowed;
        let gain_loss_percent = if overflowed {
            None
        } else {
            gain_loss_percent(gain_loss_amount, position.total_invested)
        };

        AssetValuation {
            asset_key: position.asset_key.clone(),
            asset_class: position.asset_class,
            quantity_held: position.quantity_held,
            cost_basis: position.cost_basis,
            average_cost: position.average_cost(),
            total_invested: position.total_invested,
            total_proceeds: position.total_proceeds,
            total_fees_paid: position.total_fees_paid,
            latest_price,
            market_value,
            total_current_worth,
            gain_loss_amount,
            gain_loss_percent,
            price_status,
            fx_degraded,
            degraded_transactions: position.degraded_transactions,
            overflowed,
        }
    }

    /// Market value, current worth and gain/loss of one position.
    fn performance(
        position: &AssetPosition,
        latest_price: Decimal,
    ) -> Result<(Decimal, Decimal, Decimal), CalculatorError> {
        let market_value = checked_mul(position.quantity_held, latest_price, "market value")?;
        let total_current_worth =
            checked_add(market_value, position.total_proceeds, "total current worth")?;
        let gain_loss_amount =
            checked_sub(total_current_worth, position.total_invested, "gain/loss amount")?;
        Ok((market_value, total_current_worth, gain_loss_amount))
    }

    /// One valuation per known wallet and per wallet that appears in the
    /// holdings, sorted by wallet id.
    pub fn value_wallets(
        &self,
        holdings: &WalletHoldings,
        wallets: &[Wallet],
        assets: &[AssetValuation],
        rates: &FxRateMap,
    ) -> Vec<WalletValuation> {
        let known: BTreeMap<&str, &Wallet> = wallets.iter().map(|w| (w.id.as_str(), w)).collect();
        let unit_prices: HashMap<AssetRef, (Decimal, bool)> = assets
            .iter()
            .map(|a| {
                (
                    AssetRef::new(a.asset_class, a.asset_key.clone()),
                    (a.latest_price, a.fx_degraded && a.latest_price.is_zero()),
                )
            })
            .collect();

        let mut ids: Vec<String> = holdings.wallet_ids().into_iter().collect();
        for wallet in wallets {
            if !ids.contains(&wallet.id) {
                ids.push(wallet.id.clone());
            }
        }
        ids.sort();

        ids.iter()
            .map(|id| self.value_wallet(id, known.get(id.as_str()).copied(), holdings, &unit_prices, rates))
            .collect()
    }

    fn value_wallet(
        &self,
        wallet_id: &str,
        wallet: Option<&Wallet>,
        holdings: &WalletHoldings,
        unit_prices: &HashMap<AssetRef, (Decimal, bool)>,
        rates: &FxRateMap,
    ) -> WalletValuation {
        let mut fx_degraded = false;
        let mut overflowed = false;

        let cash_by_currency = holdings.cash.get(wallet_id).cloned().unwrap_or_default();
        let mut cash_balance = Decimal::ZERO;
        for (currency, amount) in &cash_by_currency {
            let converted = match rates.convert(*amount, currency, &self.base_currency) {
                Ok(converted) => converted,
                Err(FxError::ConversionOverflow(detail)) => {
                    warn!("Cash of wallet {} left out: conversion {} overflowed", wallet_id, detail);
                    overflowed = true;
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Cash of wallet {} in {} left out of its valuation: {}",
                        wallet_id, currency, e
                    );
                    fx_degraded = true;
                    continue;
                }
            };
            overflowed |= !accumulate(&mut cash_balance, converted, wallet_id, "cash balance");
        }

        let mut wallet_assets = Vec::new();
        let mut asset_market_value = Decimal::ZERO;
        if let Some(quantities) = holdings.quantities.get(wallet_id) {
            for (asset, quantity) in quantities {
                let (price, price_fx_degraded) =
                    unit_prices.get(asset).copied().unwrap_or((Decimal::ZERO, false));
                fx_degraded |= price_fx_degraded;
                let market_value = match checked_mul(*quantity, price, "market value") {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("{} in wallet {} reported as zero: {}", asset, wallet_id, e);
                        overflowed = true;
                        Decimal::ZERO
                    }
                };
                overflowed |=
                    !accumulate(&mut asset_market_value, market_value, wallet_id, "asset market value");
                wallet_assets.push(WalletAssetValuation {
                    asset_key: asset.asset_key.clone(),
                    asset_class: asset.asset_class,
                    quantity: *quantity,
                    market_value,
                });
            }
        }

        let mut total_valuation = cash_balance;
        overflowed |= !accumulate(&mut total_valuation, asset_market_value, wallet_id, "total valuation");
        let currency = wallet.and_then(|w| w.currency.clone());
        let total_valuation_native = currency
            .as_deref()
            .and_then(|ccy| rates.convert(total_valuation, &self.base_currency, ccy).ok());

        WalletValuation {
            wallet_id: wallet_id.to_string(),
            name: wallet.map(|w| w.name.clone()),
            currency,
            cash_balance,
            asset_market_value,
            total_valuation,
            total_valuation_native,
            cash_by_currency,
            assets: wallet_assets,
            fx_degraded,
            overflowed,
        }
    }

    /// Sums over all assets and wallets. A term that would overflow a sum is
    /// left out of it and flags the summary.
    pub fn summarize(&self, assets: &[AssetValuation], wallets: &[WalletValuation]) -> PortfolioSummary {
        let mut summary = PortfolioSummary::default();
        let mut complete = true;
        for asset in assets {
            let key = asset.asset_key.as_str();
            complete &= accumulate(&mut summary.total_invested, asset.total_invested, key, "total invested");
            complete &= accumulate(&mut summary.total_proceeds, asset.total_proceeds, key, "total proceeds");
            complete &= accumulate(&mut summary.total_fees_paid, asset.total_fees_paid, key, "fees paid");
            complete &= accumulate(&mut summary.market_value, asset.market_value, key, "market value");
            complete &= accumulate(
                &mut summary.total_current_worth,
                asset.total_current_worth,
                key,
                "total current worth",
            );
        }
        for wallet in wallets {
            complete &= accumulate(
                &mut summary.cash_balance,
                wallet.cash_balance,
                &wallet.wallet_id,
                "cash balance",
            );
        }

        match checked_sub(summary.total_current_worth, summary.total_invested, "gain/loss amount") {
            Ok(gain_loss) => {
                summary.gain_loss_amount = gain_loss;
                summary.gain_loss_percent = gain_loss_percent(gain_loss, summary.total_invested);
            }
            Err(e) => {
                warn!("Portfolio gain/loss reported as zero: {}", e);
                complete = false;
            }
        }
        summary.overflowed = !complete || assets.iter().any(|a| a.overflowed);
        summary
    }
}

/// Add `amount` to `total` unless that overflows. Returns whether it was added.
fn accumulate(total: &mut Decimal, amount: Decimal, owner: &str, figure: &str) -> bool {
    match checked_add(*total, amount, figure) {
        Ok(sum) => {
            *total = sum;
            true
        }
        Err(e) => {
            warn!("{}: {}. Amount left out of the total.", owner, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallyfolio_market_data::AssetClass;

    fn position(quantity: Decimal, cost_basis: Decimal, invested: Decimal, proceeds: Decimal) -> AssetPosition {
        let mut p = AssetPosition::new(&AssetRef::new(AssetClass::Crypto, "BTC"), "EUR");
        p.quantity_held = quantity;
        p.cost_basis = cost_basis;
        p.total_invested = invested;
        p.total_proceeds = proceeds;
        p
    }

    fn resolved(price: Decimal, currency: &str) -> PriceLookup {
        PriceLookup {
            identifier: "BTC".to_string(),
            asset_class: AssetClass::Crypto,
            price,
            currency: currency.to_string(),
            status: PriceStatus::Resolved {
                provider: "COINGECKO".to_string(),
                symbol: "BTC".to_string(),
                stale: false,
            },
        }
    }

    #[test]
    fn test_gain_loss_for_scenario() {
        let calc = ValuationCalculator::new("EUR");
        let p = position(dec!(0.5), dec!(5005), dec!(10010), dec!(10000));

        let v = calc.value_asset(&p, Some(&resolved(dec!(30000), "EUR")), &FxRateMap::new());

        assert_eq!(v.market_value, dec!(15000));
        assert_eq!(v.total_current_worth, dec!(25000));
        assert_eq!(v.gain_loss_amount, dec!(14990));
        assert_eq!(v.rounded().gain_loss_percent, Some(dec!(149.75)));
        assert_eq!(v.average_cost, Some(dec!(10010)));
    }

    #[test]
    fn test_percent_not_applicable_without_investment() {
        assert_eq!(gain_loss_percent(dec!(10), Decimal::ZERO), None);
        assert_eq!(gain_loss_percent(dec!(-5), dec!(20)), Some(dec!(-25)));
    }

    #[test]
    fn test_unresolved_price_values_at_zero() {
        let calc = ValuationCalculator::new("EUR");
        let p = position(dec!(3), dec!(30), dec!(30), Decimal::ZERO);
        let lookup = PriceLookup::unresolved("ZZZFAKE", AssetClass::Crypto, "EUR", "not found");

        let v = calc.value_asset(&p, Some(&lookup), &FxRateMap::new());

        assert_eq!(v.latest_price, Decimal::ZERO);
        assert_eq!(v.market_value, Decimal::ZERO);
        assert_eq!(v.gain_loss_amount, dec!(-30));
        assert!(!v.fx_degraded);
    }

    #[test]
    fn test_price_converted_to_base() {
        let calc = ValuationCalculator::new("EUR");
        let mut rates = FxRateMap::new();
        rates.insert("EUR", "USD", dec!(1.25));
        let p = position(dec!(2), dec!(100), dec!(100), Decimal::ZERO);

        let v = calc.value_asset(&p, Some(&resolved(dec!(100), "USD")), &rates);

        assert_eq!(v.latest_price, dec!(80));
        assert_eq!(v.market_value, dec!(160));
    }

    #[test]
    fn test_unconvertible_price_is_flagged() {
        let calc = ValuationCalculator::new("EUR");
        let p = position(dec!(2), dec!(100), dec!(100), Decimal::ZERO);

        let v = calc.value_asset(&p, Some(&resolved(dec!(100), "JPY")), &FxRateMap::new());

        assert_eq!(v.market_value, Decimal::ZERO);
        assert!(v.fx_degraded);
    }

    #[test]
    fn test_out_of_range_market_value_is_zero_and_flagged() {
        let calc = ValuationCalculator::new("EUR");
        let huge = position(dec!(100000000000000000000), Decimal::ZERO, dec!(10), Decimal::ZERO);
        let small = position(dec!(1), dec!(5), dec!(5), Decimal::ZERO);

        let big = calc.value_asset(&huge, Some(&resolved(dec!(10000000000), "EUR")), &FxRateMap::new());
        assert!(big.overflowed);
        assert_eq!(big.latest_price, dec!(10000000000));
        assert_eq!(big.market_value, Decimal::ZERO);
        assert_eq!(big.gain_loss_percent, None);
        assert!(!big.fx_degraded);

        let fine = calc.value_asset(&small, Some(&resolved(dec!(8), "EUR")), &FxRateMap::new());
        let summary = calc.summarize(&[big, fine], &[]);
        assert_eq!(summary.market_value, dec!(8));
        assert_eq!(summary.total_invested, dec!(15));
        assert!(summary.overflowed);
    }

    #[test]
    fn test_wallet_valuation_in_base_and_native() {
        let calc = ValuationCalculator::new("EUR");
        let mut rates = FxRateMap::new();
        rates.insert("USD", "EUR", dec!(0.5));

        let btc = AssetRef::new(AssetClass::Crypto, "BTC");
        let mut holdings = WalletHoldings::new();
        holdings.add_quantity("w1", &btc, dec!(2));
        holdings.add_cash("w1", "USD", dec!(100));
        holdings.add_cash("w1", "CHF", dec!(7));

        let wallets = vec![Wallet {
            id: "w1".to_string(),
            name: "Main".to_string(),
            wallet_type: None,
            currency: Some("USD".to_string()),
        }];
        let p = position(dec!(2), dec!(10), dec!(10), Decimal::ZERO);
        let assets = vec![calc.value_asset(&p, Some(&resolved(dec!(10), "EUR")), &rates)];

        let valuations = calc.value_wallets(&holdings, &wallets, &assets, &rates);
        assert_eq!(valuations.len(), 1);
        let w = &valuations[0];

        assert_eq!(w.cash_balance, dec!(50));
        assert_eq!(w.asset_market_value, dec!(20));
        assert_eq!(w.total_valuation, dec!(70));
        assert_eq!(w.total_valuation_native, Some(dec!(140)));
        assert!(w.fx_degraded);
        assert_eq!(w.name.as_deref(), Some("Main"));
    }

    #[test]
    fn test_known_wallets_without_activity_are_listed() {
        let calc = ValuationCalculator::new("EUR");
        let wallets = vec![Wallet {
            id: "empty".to_string(),
            name: "Empty".to_string(),
            wallet_type: Some("bank".to_string()),
            currency: None,
        }];

        let valuations = calc.value_wallets(&WalletHoldings::new(), &wallets, &[], &FxRateMap::new());

        assert_eq!(valuations.len(), 1);
        assert_eq!(valuations[0].total_valuation, Decimal::ZERO);
        assert_eq!(valuations[0].total_valuation_native, None);
    }

    #[test]
    fn test_summary_sums_assets_and_cash() {
        let calc = ValuationCalculator::new("EUR");
        let rates = FxRateMap::new();
        let a = calc.value_asset(
            &position(dec!(1), dec!(100), dec!(100), Decimal::ZERO),
            Some(&resolved(dec!(150), "EUR")),
            &rates,
        );
        let b = calc.value_asset(
            &position(Decimal::ZERO, Decimal::ZERO, dec!(100), dec!(80)),
            Some(&resolved(dec!(1), "EUR")),
            &rates,
        );

        let summary = calc.summarize(&[a, b], &[]);

        assert_eq!(summary.total_invested, dec!(200));
        assert_eq!(summary.total_current_worth, dec!(230));
        assert_eq!(summary.gain_loss_amount, dec!(30));
        assert_eq!(summary.gain_loss_percent, Some(dec!(15)));
    }
}
