use async_trait::async_trait;
use tallyfolio_market_data::AssetClass;

use super::ledger_errors::LedgerError;
use super::ledger_model::RawLedgerRecord;

/// Trait defining the contract for the external ledger store.
///
/// Records are returned as stored; callers normalize them with
/// [`ledger_normalizer`](super::ledger_normalizer).
#[async_trait]
pub trait LedgerStoreTrait: Send + Sync {
    async fn list_asset_transactions(
        &self,
        user_id: &str,
        asset_class: AssetClass,
    ) -> Result<Vec<RawLedgerRecord>, LedgerError>;

    async fn list_fiat_transactions(&self, user_id: &str)
        -> Result<Vec<RawLedgerRecord>, LedgerError>;

    async fn list_wallets(&self, user_id: &str) -> Result<Vec<RawLedgerRecord>, LedgerError>;

    /// The user's chosen base currency, if they ever set one.
    async fn get_base_currency(&self, user_id: &str) -> Result<Option<String>, LedgerError>;

    async fn list_loans(&self, user_id: &str) -> Result<Vec<RawLedgerRecord>, LedgerError>;
}
