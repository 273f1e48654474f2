//! REST client for the ledger store.
//!
//! Every resource is fetched with `GET {base}/{resource}?userId=...` and
//! answered as `{"<resource>": [ ... ]}`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use tallyfolio_market_data::AssetClass;
use urlencoding::encode;

use super::ledger_errors::LedgerError;
use super::ledger_model::RawLedgerRecord;
use super::ledger_traits::LedgerStoreTrait;
use super::user_scope::filter_records_by_user;

const USER_KEY: &str = "userId";
const API_KEY_HEADER: &str = "x-api-key";

pub struct HttpLedgerStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLedgerStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            LedgerError::Unavailable {
                resource: "client".to_string(),
                message: format!("Failed to initialize HTTP client: {}", e),
            }
        })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn fetch_records(
        &self,
        resource: &str,
        user_id: &str,
    ) -> Result<Vec<RawLedgerRecord>, LedgerError> {
        let url = format!("{}/{}?{}={}", self.base_url, resource, USER_KEY, encode(user_id));
        debug!("Fetching ledger resource '{}'", resource);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| LedgerError::Unavailable {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Unavailable {
                resource: resource.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body: Value = response.json().await.map_err(|e| LedgerError::InvalidPayload {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;

        let records = extract_records(resource, body)?;
        Ok(filter_records_by_user(records, user_id, USER_KEY))
    }
}

/// Pull the record list out of a store answer.
///
/// Accepts the `{"<resource>": [...]}` envelope or a bare array. A missing
/// envelope key means no records.
pub(crate) fn extract_records(
    resource: &str,
    body: Value,
) -> Result<Vec<RawLedgerRecord>, LedgerError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove(resource) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(LedgerError::InvalidPayload {
                    resource: resource.to_string(),
                    message: format!("expected a list, got {}", other),
                })
            }
        },
        other => {
            return Err(LedgerError::InvalidPayload {
                resource: resource.to_string(),
                message: format!("expected an object, got {}", other),
            })
        }
    };

    let total = items.len();
    let records: Vec<RawLedgerRecord> = items
        .into_iter()
        .filter_map(RawLedgerRecord::from_value)
        .collect();
    if records.len() < total {
        warn!(
            "Dropped {} non-object entries from ledger resource '{}'",
            total - records.len(),
            resource
        );
    }
    Ok(records)
}

fn asset_resource(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Crypto => "cryptos",
        AssetClass::Stock => "stocks",
    }
}

#[async_trait]
impl LedgerStoreTrait for HttpLedgerStore {
    async fn list_asset_transactions(
        &self,
        user_id: &str,
        asset_class: AssetClass,
    ) -> Result<Vec<RawLedgerRecord>, LedgerError> {
        self.fetch_records(asset_resource(asset_class), user_id).await
    }

    async fn list_fiat_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<RawLedgerRecord>, LedgerError> {
        self.fetch_records("transactions", user_id).await
    }

    async fn list_wallets(&self, user_id: &str) -> Result<Vec<RawLedgerRecord>, LedgerError> {
        self.fetch_records("wallets", user_id).await
    }

    async fn get_base_currency(&self, user_id: &str) -> Result<Option<String>, LedgerError> {
        let settings = self.fetch_records("settings", user_id).await?;
        Ok(settings
            .iter()
            .find_map(|s| s.first_str(&["currency", "baseCurrency"])))
    }

    async fn list_loans(&self, user_id: &str) -> Result<Vec<RawLedgerRecord>, LedgerError> {
        self.fetch_records("loans", user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_enveloped_records() {
        let body = json!({"wallets": [{"walletId": "w1"}, {"walletId": "w2"}, "junk"]});
        let records = extract_records("wallets", body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_extract_bare_array() {
        let body = json!([{"loanId": "l1"}]);
        assert_eq!(extract_records("loans", body).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_envelope_key_is_empty() {
        let body = json!({"message": "no data"});
        assert!(extract_records("cryptos", body).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_invalid_payload() {
        let err = extract_records("stocks", json!({"stocks": "oops"})).unwrap_err();
        assert_eq!(err.resource(), "stocks");
        assert!(matches!(err, LedgerError::InvalidPayload { .. }));

        assert!(extract_records("stocks", json!("text")).is_err());
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let store =
            HttpLedgerStore::new("https://ledger.example/api/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(store.base_url, "https://ledger.example/api");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_reported_as_unavailable() {
        let store =
            HttpLedgerStore::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let err = store.list_wallets("alice").await.unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable { ref resource, .. } if resource == "wallets"));
    }

    #[tokio::test]
    async fn test_configured_timeout_bounds_requests() {
        // 10.255.255.1 is unroutable, so only the client timeout ends the call.
        let store =
            HttpLedgerStore::new("http://10.255.255.1", None, Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        let err = store.list_wallets("alice").await.unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
