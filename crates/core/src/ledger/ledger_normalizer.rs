//! Maps raw ledger rows onto canonical records.
//!
//! Field names accepted per concept, first present wins:
//!
//! | concept     | keys                                                    |
//! |-------------|---------------------------------------------------------|
//! | id          | `id`, `cryptoId`, `stockId`, `transId`, `loanId`        |
//! | asset key   | `assetKey`, `cryptoName`, `cryptoType`, `stockName`, `symbol` |
//! | operation   | `operation`, `side`, `mtype`, `type`                    |
//! | quantity    | `quantity`, `amount`                                    |
//! | fiat kind   | `transactionType`, `transType`, `type`                  |
//! | timestamp   | `timestamp`, `tdate`, `date`                            |
//!
//! Malformed numbers degrade to zero and are recorded on the record; rows
//! that cannot be classified at all are skipped and reported.

use chrono::NaiveDateTime;
use log::warn;
use rust_decimal::Decimal;
use tallyfolio_market_data::AssetClass;

use super::ledger_model::*;
use crate::fx::normalize_currency_code;
use crate::utils::{parse_decimal, parse_ledger_timestamp};

const ID_KEYS: &[&str] = &["id", "cryptoId", "stockId", "transId", "loanId"];
const ASSET_KEYS: &[&str] = &["assetKey", "cryptoName", "cryptoType", "stockName", "symbol"];
const OPERATION_KEYS: &[&str] = &["operation", "side", "mtype", "type"];
const QUANTITY_KEYS: &[&str] = &["quantity", "amount"];
const FIAT_KIND_KEYS: &[&str] = &["transactionType", "transType", "type"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "tdate", "date"];
const FEE_UNIT_KEYS: &[&str] = &["feeUnit", "fee_unit"];
const FROM_WALLET_KEYS: &[&str] = &["fromWallet", "from_wallet"];
const TO_WALLET_KEYS: &[&str] = &["toWallet", "to_wallet"];

/// Records that replay in ledger order.
pub trait LedgerOrdered {
    fn timestamp(&self) -> Option<NaiveDateTime>;
    fn ledger_index(&self) -> usize;
}

impl LedgerOrdered for AssetTransaction {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }
    fn ledger_index(&self) -> usize {
        self.ledger_index
    }
}

impl LedgerOrdered for FiatTransaction {
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp
    }
    fn ledger_index(&self) -> usize {
        self.ledger_index
    }
}

/// Ascending by timestamp, ties (and rows without a timestamp) in ledger order.
pub fn sort_chronologically<T: LedgerOrdered>(records: &mut [T]) {
    records.sort_by_key(|r| (r.timestamp(), r.ledger_index()));
}

/// Trimmed, upper-cased base currency; blank or invalid values fall back to `default`.
pub fn resolve_base_currency(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => normalize_currency_code(code).unwrap_or_else(|e| {
            warn!("Ignoring stored base currency: {}. Using {}.", e, default);
            default.to_string()
        }),
        None => default.to_string(),
    }
}

fn decimal_field(
    row: &RawLedgerRecord,
    keys: &[&str],
    name: &str,
    malformed: &mut Vec<String>,
) -> Decimal {
    match row.first_value(keys) {
        None => Decimal::ZERO,
        Some(value) => parse_decimal(value).unwrap_or_else(|e| {
            warn!("Unparsable {} {}: {}. Using 0.", name, value, e);
            malformed.push(name.to_string());
            Decimal::ZERO
        }),
    }
}

fn timestamp_field(row: &RawLedgerRecord, malformed: &mut Vec<String>) -> Option<NaiveDateTime> {
    match row.first_str(TIMESTAMP_KEYS) {
        Some(raw) => match parse_ledger_timestamp(&raw) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("Unparsable timestamp '{}': {}. Row sorts first.", raw, e);
                malformed.push("timestamp".to_string());
                None
            }
        },
        None => {
            malformed.push("timestamp".to_string());
            None
        }
    }
}

fn currency_field(row: &RawLedgerRecord, malformed: &mut Vec<String>) -> Option<String> {
    let raw = row.first_str(&["currency"])?;
    match normalize_currency_code(&raw) {
        Ok(code) => Some(code),
        Err(e) => {
            warn!("{}", e);
            malformed.push("currency".to_string());
            None
        }
    }
}

fn fee_unit_field(row: &RawLedgerRecord, malformed: &mut Vec<String>) -> FeeUnit {
    let Some(raw) = row.first_str(FEE_UNIT_KEYS) else {
        return FeeUnit::Asset;
    };
    match raw.to_ascii_lowercase().as_str() {
        "crypto" | "asset" | "coin" | "token" | "unit" | "units" | "stock" | "shares" => {
            FeeUnit::Asset
        }
        "fiat" | "currency" | "cash" | "quote" => FeeUnit::Currency,
        _ if normalize_currency_code(&raw).is_ok() => FeeUnit::Currency,
        other => {
            warn!("Unknown fee unit '{}'. Treating fee as asset units.", other);
            malformed.push("feeUnit".to_string());
            FeeUnit::Asset
        }
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Buy,
    Sell,
    Transfer,
}

impl Operation {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "buy" | "purchase" => Some(Self::Buy),
            "sell" | "sale" => Some(Self::Sell),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

fn skip(skipped: &mut Vec<LedgerIssue>, row: &RawLedgerRecord, index: usize, message: String) {
    let issue = LedgerIssue {
        record_id: row.first_str(ID_KEYS),
        ledger_index: index,
        message,
    };
    warn!("Skipping ledger row: {}", issue);
    skipped.push(issue);
}

/// Normalize crypto or stock rows, sorted for replay.
///
/// Rows without an operation field are buys (the stock form never recorded
/// one). Rows without a currency use `default_currency`.
pub fn normalize_asset_transactions(
    rows: &[RawLedgerRecord],
    asset_class: AssetClass,
    default_currency: &str,
) -> Normalized<AssetTransaction> {
    let mut out = Normalized::default();

    for (index, row) in rows.iter().enumerate() {
        let Some(asset_key) = row.first_str(ASSET_KEYS) else {
            skip(&mut out.skipped, row, index, "missing asset key".to_string());
            continue;
        };

        let operation = row
            .first_str(OPERATION_KEYS)
            .map(|op| op.to_ascii_lowercase())
            .unwrap_or_else(|| "buy".to_string());
        let Some(operation) = Operation::parse(&operation) else {
            skip(&mut out.skipped, row, index, format!("unknown operation '{}'", operation));
            continue;
        };

        let mut malformed = Vec::new();
        let quantity = decimal_field(row, QUANTITY_KEYS, "quantity", &mut malformed);
        let fee = decimal_field(row, &["fee"], "fee", &mut malformed);

        let kind = match operation {
            Operation::Buy => AssetTransactionKind::Buy {
                quantity,
                price: decimal_field(row, &["price"], "price", &mut malformed),
                fee,
            },
            Operation::Sell => AssetTransactionKind::Sell {
                quantity,
                price: decimal_field(row, &["price"], "price", &mut malformed),
                fee,
            },
            Operation::Transfer => AssetTransactionKind::Transfer {
                quantity,
                fee,
                fee_unit: fee_unit_field(row, &mut malformed),
            },
        };

        let currency =
            currency_field(row, &mut malformed).unwrap_or_else(|| default_currency.to_string());
        let timestamp = timestamp_field(row, &mut malformed);

        out.records.push(AssetTransaction {
            id: row
                .first_str(ID_KEYS)
                .unwrap_or_else(|| format!("{}-{}", asset_class, index)),
            asset_key,
            asset_class,
            kind,
            currency,
            from_wallet: row.first_str(FROM_WALLET_KEYS),
            to_wallet: row.first_str(TO_WALLET_KEYS),
            timestamp,
            ledger_index: index,
            malformed_fields: malformed,
        });
    }

    sort_chronologically(&mut out.records);
    out
}

/// Normalize fiat income/expense/transfer rows, sorted for replay.
pub fn normalize_fiat_transactions(rows: &[RawLedgerRecord]) -> Normalized<FiatTransaction> {
    let mut out = Normalized::default();

    for (index, row) in rows.iter().enumerate() {
        let kind_raw = row
            .first_str(FIAT_KIND_KEYS)
            .map(|k| k.to_ascii_lowercase())
            .unwrap_or_default();
        let kind = match kind_raw.as_str() {
            "income" | "deposit" => FiatTransactionKind::Income,
            "expense" | "withdrawal" => FiatTransactionKind::Expense,
            "transfer" => FiatTransactionKind::Transfer,
            "" => {
                skip(&mut out.skipped, row, index, "missing transaction type".to_string());
                continue;
            }
            other => {
                skip(&mut out.skipped, row, index, format!("unknown transaction type '{}'", other));
                continue;
            }
        };

        let mut malformed = Vec::new();
        let amount = decimal_field(row, QUANTITY_KEYS, "amount", &mut malformed);
        let fee = decimal_field(row, &["fee"], "fee", &mut malformed);
        let currency = currency_field(row, &mut malformed);
        let timestamp = timestamp_field(row, &mut malformed);

        out.records.push(FiatTransaction {
            id: row
                .first_str(ID_KEYS)
                .unwrap_or_else(|| format!("fiat-{}", index)),
            kind,
            amount,
            fee,
            currency,
            from_wallet: row.first_str(FROM_WALLET_KEYS),
            to_wallet: row.first_str(TO_WALLET_KEYS),
            timestamp,
            ledger_index: index,
            malformed_fields: malformed,
        });
    }

    sort_chronologically(&mut out.records);
    out
}

/// Normalize wallet rows. Stored balances are dropped.
pub fn normalize_wallets(rows: &[RawLedgerRecord]) -> Normalized<Wallet> {
    let mut out = Normalized::default();

    for (index, row) in rows.iter().enumerate() {
        let Some(id) = row.first_str(&["walletId", "id"]) else {
            skip(&mut out.skipped, row, index, "missing wallet id".to_string());
            continue;
        };

        let mut ignored = Vec::new();
        out.records.push(Wallet {
            name: row
                .first_str(&["walletName", "name"])
                .unwrap_or_else(|| id.clone()),
            wallet_type: row.first_str(&["walletType", "type"]),
            currency: currency_field(row, &mut ignored),
            id,
        });
    }

    out
}

/// Normalize loan rows. Legacy `loan` rows are borrows; a missing action is `new`.
pub fn normalize_loans(rows: &[RawLedgerRecord]) -> Normalized<LoanRecord> {
    let mut out = Normalized::default();

    for (index, row) in rows.iter().enumerate() {
        let kind_raw = row
            .first_str(&["type", "loanType"])
            .map(|k| k.to_ascii_lowercase())
            .unwrap_or_default();
        let kind = match kind_raw.as_str() {
            "borrow" | "loan" => LoanKind::Borrow,
            "lend" => LoanKind::Lend,
            other => {
                skip(&mut out.skipped, row, index, format!("unknown loan type '{}'", other));
                continue;
            }
        };

        let action = match row
            .first_str(&["action"])
            .map(|a| a.to_ascii_lowercase())
            .as_deref()
        {
            Some("repay") => LoanAction::Repay,
            _ => LoanAction::New,
        };

        let mut malformed = Vec::new();
        let amount = decimal_field(row, &["amount"], "amount", &mut malformed);
        let currency = currency_field(row, &mut malformed);

        out.records.push(LoanRecord {
            id: row
                .first_str(ID_KEYS)
                .unwrap_or_else(|| format!("loan-{}", index)),
            kind,
            action,
            amount,
            currency,
            malformed_fields: malformed,
        });
    }

    out
}
