//! Ledger boundary - raw store records, their canonical forms and the store contract.
//!
//! Rows coming out of the ledger store are loosely typed maps whose field
//! names changed over time. [`ledger_normalizer`] maps them onto the typed
//! records below before any calculator sees them.

mod ledger_errors;
mod ledger_model;
pub mod ledger_normalizer;
mod ledger_traits;
pub mod http_store;
pub mod user_scope;

#[cfg(test)]
mod ledger_normalizer_tests;

pub use http_store::HttpLedgerStore;
pub use ledger_errors::LedgerError;
pub use ledger_model::*;
pub use ledger_normalizer::{
    normalize_asset_transactions, normalize_fiat_transactions, normalize_loans,
    normalize_wallets, resolve_base_currency, sort_chronologically,
};
pub use ledger_traits::LedgerStoreTrait;
pub use user_scope::filter_records_by_user;
