//! Core error types for the Tallyfolio valuation engine.
//!
//! Each layer owns a typed error (`FxError`, `QuoteError`, `LedgerError`,
//! `CalculatorError`, `ValidationError`); this module ties them together in
//! the root [`Error`] used by services and configuration.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::fx::FxError;
use crate::ledger::LedgerError;
use crate::quotes::QuoteError;
use tallyfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the valuation engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Portfolio calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),
}

/// Errors that occur during portfolio calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("FX rate {0}->{1} not found in pre-fetched rates")]
    MissingFxRate(String, String),

    #[error("Decimal overflow computing {0}")]
    Overflow(String),
}

/// Validation errors for ledger data parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Number is not finite: {0}")]
    NonFinite(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
