#[cfg(test)]
mod tests {
    use crate::constants::UNASSIGNED_WALLET_ID;
    use crate::ledger::{
        AssetTransaction, AssetTransactionKind, FeeUnit, FiatTransaction, FiatTransactionKind,
    };
    use crate::portfolio::accounting::AssetRef;
    use crate::portfolio::holdings::WalletHoldingsCalculator;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tallyfolio_market_data::AssetClass;

    fn asset_tx(
        index: usize,
        kind: AssetTransactionKind,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AssetTransaction {
        AssetTransaction {
            id: format!("a-{}", index),
            asset_key: "ETH".to_string(),
            asset_class: AssetClass::Crypto,
            kind,
            currency: "EUR".to_string(),
            from_wallet: from.map(str::to_string),
            to_wallet: to.map(str::to_string),
            timestamp: None,
            ledger_index: index,
            malformed_fields: Vec::new(),
        }
    }

    fn buy(quantity: Decimal) -> AssetTransactionKind {
        AssetTransactionKind::Buy {
            quantity,
            price: dec!(2000),
            fee: Decimal::ZERO,
        }
    }

    fn sell(quantity: Decimal) -> AssetTransactionKind {
        AssetTransactionKind::Sell {
            quantity,
            price: dec!(2100),
            fee: Decimal::ZERO,
        }
    }

    fn fiat_tx(
        index: usize,
        kind: FiatTransactionKind,
        amount: Decimal,
        fee: Decimal,
        currency: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> FiatTransaction {
        FiatTransaction {
            id: format!("f-{}", index),
            kind,
            amount,
            fee,
            currency: currency.map(str::to_string),
            from_wallet: from.map(str::to_string),
            to_wallet: to.map(str::to_string),
            timestamp: None,
            ledger_index: index,
            malformed_fields: Vec::new(),
        }
    }

    fn eth() -> AssetRef {
        AssetRef::new(AssetClass::Crypto, "ETH")
    }

    fn calculator() -> WalletHoldingsCalculator {
        let mut currencies = HashMap::new();
        currencies.insert("bank-us".to_string(), "USD".to_string());
        WalletHoldingsCalculator::new(currencies, "EUR")
    }

    #[test]
    fn test_buy_prefers_destination_then_source() {
        let txs = vec![
            asset_tx(0, buy(dec!(2)), Some("hot"), Some("cold")),
            asset_tx(1, buy(dec!(1)), Some("hot"), None),
            asset_tx(2, buy(dec!(0.5)), None, None),
        ];

        let holdings = calculator().calculate(&txs, &[]);

        assert_eq!(holdings.quantity("cold", &eth()), dec!(2));
        assert_eq!(holdings.quantity("hot", &eth()), dec!(1));
        assert_eq!(holdings.quantity(UNASSIGNED_WALLET_ID, &eth()), dec!(0.5));
    }

    #[test]
    fn test_sell_prefers_source_then_destination() {
        let txs = vec![
            asset_tx(0, buy(dec!(5)), None, Some("hot")),
            asset_tx(1, sell(dec!(1)), Some("hot"), Some("cold")),
            asset_tx(2, sell(dec!(2)), None, Some("hot")),
        ];

        let holdings = calculator().calculate(&txs, &[]);

        assert_eq!(holdings.quantity("hot", &eth()), dec!(2));
        assert_eq!(holdings.quantity("cold", &eth()), Decimal::ZERO);
    }

    #[test]
    fn test_transfer_moves_gross_out_and_net_in() {
        let transfer = AssetTransactionKind::Transfer {
            quantity: dec!(10),
            fee: dec!(1),
            fee_unit: FeeUnit::Asset,
        };
        let txs = vec![
            asset_tx(0, buy(dec!(10)), None, Some("hot")),
            asset_tx(1, transfer, Some("hot"), Some("cold")),
        ];

        let holdings = calculator().calculate(&txs, &[]);

        assert_eq!(holdings.quantity("hot", &eth()), Decimal::ZERO);
        assert_eq!(holdings.quantity("cold", &eth()), dec!(9));
        assert_eq!(holdings.total_quantity(&eth()), Some(dec!(9)));
    }

    #[test]
    fn test_transfer_without_wallets_is_ignored() {
        let transfer = AssetTransactionKind::Transfer {
            quantity: dec!(3),
            fee: Decimal::ZERO,
            fee_unit: FeeUnit::Asset,
        };
        let holdings = calculator().calculate(&[asset_tx(0, transfer, None, None)], &[]);
        assert!(holdings.wallet_ids().is_empty());
    }

    #[test]
    fn test_sell_can_drive_wallet_negative() {
        let txs = vec![asset_tx(0, sell(dec!(4)), Some("hot"), None)];
        let holdings = calculator().calculate(&txs, &[]);
        assert_eq!(holdings.quantity("hot", &eth()), dec!(-4));
    }

    #[test]
    fn test_fiat_income_expense_and_transfer() {
        let txs = vec![
            fiat_tx(0, FiatTransactionKind::Income, dec!(1000), dec!(2), Some("EUR"), None, Some("bank")),
            fiat_tx(1, FiatTransactionKind::Expense, dec!(100), dec!(1), Some("EUR"), Some("bank"), None),
            fiat_tx(2, FiatTransactionKind::Transfer, dec!(200), dec!(3), Some("EUR"), Some("bank"), Some("broker")),
        ];

        let holdings = calculator().calculate(&[], &txs);

        // 1000 - 2 - (100 + 1) - (200 + 3)
        assert_eq!(holdings.cash_balance("bank", "EUR"), dec!(694));
        assert_eq!(holdings.cash_balance("broker", "EUR"), dec!(200));
    }

    #[test]
    fn test_fiat_currency_falls_back_to_wallet_then_default() {
        let txs = vec![
            fiat_tx(0, FiatTransactionKind::Income, dec!(50), Decimal::ZERO, None, None, Some("bank-us")),
            fiat_tx(1, FiatTransactionKind::Income, dec!(20), Decimal::ZERO, None, None, Some("cash")),
            fiat_tx(2, FiatTransactionKind::Income, dec!(5), Decimal::ZERO, Some("GBP"), None, Some("bank-us")),
        ];

        let holdings = calculator().calculate(&[], &txs);

        assert_eq!(holdings.cash_balance("bank-us", "USD"), dec!(50));
        assert_eq!(holdings.cash_balance("bank-us", "GBP"), dec!(5));
        assert_eq!(holdings.cash_balance("cash", "EUR"), dec!(20));
    }

    #[test]
    fn test_walletless_cash_goes_to_unassigned() {
        let txs = vec![fiat_tx(0, FiatTransactionKind::Expense, dec!(12), Decimal::ZERO, Some("EUR"), None, None)];
        let holdings = calculator().calculate(&[], &txs);
        assert_eq!(holdings.cash_balance(UNASSIGNED_WALLET_ID, "EUR"), dec!(-12));
    }

    #[test]
    fn test_wallet_ids_cover_assets_and_cash() {
        let holdings = calculator().calculate(
            &[asset_tx(0, buy(dec!(1)), None, Some("cold"))],
            &[fiat_tx(1, FiatTransactionKind::Income, dec!(1), Decimal::ZERO, None, None, Some("bank"))],
        );
        let ids: Vec<String> = holdings.wallet_ids().into_iter().collect();
        assert_eq!(ids, vec!["bank".to_string(), "cold".to_string()]);
    }

    #[test]
    fn test_out_of_range_cash_movement_is_skipped() {
        let txs = vec![
            fiat_tx(0, FiatTransactionKind::Income, dec!(100), Decimal::ZERO, Some("EUR"), None, Some("bank")),
            fiat_tx(1, FiatTransactionKind::Expense, Decimal::MAX, dec!(1), Some("EUR"), Some("bank"), None),
            fiat_tx(2, FiatTransactionKind::Income, Decimal::MAX, Decimal::ZERO, Some("EUR"), None, Some("bank")),
        ];

        let holdings = calculator().calculate(&[], &txs);

        // Row 1 cannot compute MAX + 1; row 2 would push the balance past MAX.
        assert_eq!(holdings.cash_balance("bank", "EUR"), dec!(100));
    }
}
