#[cfg(test)]
mod tests {
    use crate::ledger::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tallyfolio_market_data::AssetClass;

    fn rows(values: Vec<Value>) -> Vec<RawLedgerRecord> {
        values
            .into_iter()
            .map(|v| RawLedgerRecord::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn test_legacy_crypto_row_is_mapped() {
        let raw = rows(vec![json!({
            "cryptoId": "c-1",
            "userId": "alice",
            "mtype": "Buy",
            "cryptoType": "BTC - Bitcoin",
            "tdate": "2024-01-05",
            "fromWallet": "",
            "toWallet": "ledger-nano",
            "amount": "0.5",
            "price": "40000",
            "currency": "usd",
            "fee": "2.5"
        })]);

        let out = normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR");
        assert!(out.skipped.is_empty());
        let tx = &out.records[0];

        assert_eq!(tx.id, "c-1");
        assert_eq!(tx.asset_key, "BTC - Bitcoin");
        assert_eq!(
            tx.kind,
            AssetTransactionKind::Buy {
                quantity: dec!(0.5),
                price: dec!(40000),
                fee: dec!(2.5)
            }
        );
        assert_eq!(tx.currency, "USD");
        assert_eq!(tx.from_wallet, None);
        assert_eq!(tx.to_wallet.as_deref(), Some("ledger-nano"));
        assert_eq!(
            tx.timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(!tx.is_degraded());
    }

    #[test]
    fn test_canonical_names_win_over_legacy_ones() {
        let raw = rows(vec![json!({
            "id": "x",
            "assetKey": "ETH",
            "cryptoName": "Ethereum",
            "operation": "sell",
            "side": "buy",
            "quantity": 2,
            "amount": 99,
            "price": 3000,
            "timestamp": "2024-02-01T10:00:00Z"
        })]);

        let tx = &normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR").records[0];
        assert_eq!(tx.asset_key, "ETH");
        assert!(matches!(tx.kind, AssetTransactionKind::Sell { quantity, .. } if quantity == dec!(2)));
        assert_eq!(tx.currency, "EUR");
    }

    #[test]
    fn test_stock_rows_without_operation_are_buys() {
        let raw = rows(vec![json!({
            "stockId": "s-1",
            "stockName": "AAPL",
            "quantity": "10",
            "price": "150",
            "currency": "USD",
            "tdate": "2023-11-02T14:30"
        })]);

        let tx = &normalize_asset_transactions(&raw, AssetClass::Stock, "EUR").records[0];
        assert_eq!(tx.asset_class, AssetClass::Stock);
        assert_eq!(tx.kind.name(), "buy");
        assert_eq!(tx.id, "s-1");
    }

    #[test]
    fn test_malformed_numbers_degrade_but_row_is_kept() {
        let raw = rows(vec![json!({
            "assetKey": "SOL",
            "operation": "buy",
            "quantity": "ten",
            "price": "",
            "fee": null,
            "timestamp": "2024-01-01"
        })]);

        let out = normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR");
        let tx = &out.records[0];
        assert_eq!(tx.kind.quantity(), Decimal::ZERO);
        assert_eq!(tx.malformed_fields, vec!["quantity"]);
        assert!(tx.is_degraded());
    }

    #[test]
    fn test_unknown_operation_and_missing_asset_are_skipped_and_reported() {
        let raw = rows(vec![
            json!({"cryptoId": "a", "assetKey": "BTC", "operation": "stake", "quantity": 1}),
            json!({"cryptoId": "b", "operation": "buy", "quantity": 1}),
            json!({"cryptoId": "c", "assetKey": "BTC", "operation": "buy", "quantity": 1}),
        ]);

        let out = normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(out.skipped[0].record_id.as_deref(), Some("a"));
        assert!(out.skipped[0].message.contains("stake"));
        assert_eq!(out.skipped[1].ledger_index, 1);
    }

    #[test]
    fn test_transfer_fee_unit_mapping() {
        let raw = rows(vec![
            json!({"assetKey": "BTC", "operation": "transfer", "quantity": 1, "fee": 0.001, "tdate": "2024-01-01"}),
            json!({"assetKey": "BTC", "operation": "transfer", "quantity": 1, "fee": 2, "feeUnit": "fiat", "tdate": "2024-01-02"}),
            json!({"assetKey": "BTC", "operation": "transfer", "quantity": 1, "fee": 2, "feeUnit": "usd", "tdate": "2024-01-03"}),
            json!({"assetKey": "BTC", "operation": "transfer", "quantity": 1, "fee": 2, "feeUnit": "??", "tdate": "2024-01-04"}),
        ]);

        let out = normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR");
        let units: Vec<FeeUnit> = out
            .records
            .iter()
            .map(|tx| match tx.kind {
                AssetTransactionKind::Transfer { fee_unit, .. } => fee_unit,
                _ => panic!("expected transfer"),
            })
            .collect();
        assert_eq!(
            units,
            vec![FeeUnit::Asset, FeeUnit::Currency, FeeUnit::Currency, FeeUnit::Asset]
        );
        assert_eq!(out.records[3].malformed_fields, vec!["feeUnit"]);
    }

    #[test]
    fn test_replay_order_is_timestamp_then_ledger_order() {
        let raw = rows(vec![
            json!({"id": "late", "assetKey": "BTC", "operation": "buy", "tdate": "2024-03-01"}),
            json!({"id": "tie-1", "assetKey": "BTC", "operation": "buy", "tdate": "2024-02-01 09:00"}),
            json!({"id": "broken", "assetKey": "BTC", "operation": "buy", "tdate": "not a date"}),
            json!({"id": "tie-2", "assetKey": "BTC", "operation": "sell", "tdate": "2024-02-01T09:00:00"}),
        ]);

        let out = normalize_asset_transactions(&raw, AssetClass::Crypto, "EUR");
        let ids: Vec<&str> = out.records.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["broken", "tie-1", "tie-2", "late"]);
        assert_eq!(out.records[0].malformed_fields, vec!["timestamp"]);
    }

    #[test]
    fn test_fiat_rows() {
        let raw = rows(vec![
            json!({"transId": "t1", "transType": "Income", "amount": "1000", "fee": "0", "currency": "eur", "toWallet": "bank", "tdate": "2024-01-01"}),
            json!({"transId": "t2", "transType": "Expense", "amount": "50.5", "currency": "EUR", "fromWallet": "bank", "tdate": "2024-01-02"}),
            json!({"transId": "t3", "transType": "refund", "amount": "5"}),
        ]);

        let out = normalize_fiat_transactions(&raw);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.records[0].kind, FiatTransactionKind::Income);
        assert_eq!(out.records[0].currency.as_deref(), Some("EUR"));
        assert_eq!(out.records[1].amount, dec!(50.5));
    }

    #[test]
    fn test_wallets_drop_stored_balance() {
        let raw = rows(vec![
            json!({"walletId": "w1", "walletName": "Kraken", "walletType": "exchange", "currency": "eur", "balance": "123.45"}),
            json!({"walletName": "No id"}),
        ]);

        let out = normalize_wallets(&raw);
        assert_eq!(
            out.records,
            vec![Wallet {
                id: "w1".to_string(),
                name: "Kraken".to_string(),
                wallet_type: Some("exchange".to_string()),
                currency: Some("EUR".to_string()),
            }]
        );
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn test_loans_legacy_type_and_default_action() {
        let raw = rows(vec![
            json!({"loanId": "l1", "type": "loan", "amount": "100"}),
            json!({"loanId": "l2", "type": "LEND", "action": "repay", "amount": "20", "currency": "usd"}),
            json!({"loanId": "l3", "type": "gift", "amount": "1"}),
        ]);

        let out = normalize_loans(&raw);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].kind, LoanKind::Borrow);
        assert_eq!(out.records[0].action, LoanAction::New);
        assert_eq!(out.records[1].kind, LoanKind::Lend);
        assert_eq!(out.records[1].action, LoanAction::Repay);
        assert_eq!(out.records[1].currency.as_deref(), Some("USD"));
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn test_resolve_base_currency() {
        assert_eq!(resolve_base_currency(Some(" usd "), "EUR"), "USD");
        assert_eq!(resolve_base_currency(Some("   "), "EUR"), "EUR");
        assert_eq!(resolve_base_currency(None, "EUR"), "EUR");
        assert_eq!(resolve_base_currency(Some("dollars"), "EUR"), "EUR");
    }
}
