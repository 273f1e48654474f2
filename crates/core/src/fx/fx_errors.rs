use thiserror::Error;

/// Errors of the Currency Conversion Layer.
///
/// A failed conversion is never reported as a rate of zero or one; callers
/// decide how to degrade.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("FX provider unavailable for {from}->{to}: {message}")]
    ProviderUnavailable {
        from: String,
        to: String,
        message: String,
    },

    #[error("Invalid currency code: '{0}'")]
    InvalidCurrencyCode(String),

    #[error("Conversion {0} overflowed")]
    ConversionOverflow(String),
}
