use thiserror::Error;

/// Errors raised by a ledger store.
///
/// Any of these means "the store could not answer", which callers keep
/// distinct from an empty answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger store unavailable for '{resource}': {message}")]
    Unavailable { resource: String, message: String },

    #[error("Ledger store returned an unexpected payload for '{resource}': {message}")]
    InvalidPayload { resource: String, message: String },
}

impl LedgerError {
    pub fn resource(&self) -> &str {
        match self {
            Self::Unavailable { resource, .. } | Self::InvalidPayload { resource, .. } => resource,
        }
    }
}
