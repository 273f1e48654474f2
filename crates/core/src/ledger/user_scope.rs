use super::ledger_model::RawLedgerRecord;

/// Keep only rows owned by `user_id`.
///
/// The store is expected to scope by user already; rows with a missing or
/// different owner are dropped regardless. A blank user owns nothing.
pub fn filter_records_by_user(
    records: Vec<RawLedgerRecord>,
    user_id: &str,
    user_key: &str,
) -> Vec<RawLedgerRecord> {
    let uid = user_id.trim();
    if uid.is_empty() {
        return Vec::new();
    }

    records
        .into_iter()
        .filter(|record| record.first_str(&[user_key]).as_deref() == Some(uid))
        .collect()
}
