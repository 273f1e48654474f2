use super::fx_errors::FxError;

/// Trim and upper-case a currency code, rejecting anything that is not three letters.
pub fn normalize_currency_code(raw: &str) -> Result<String, FxError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(FxError::InvalidCurrencyCode(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency_code() {
        assert_eq!(normalize_currency_code(" eur "), Ok("EUR".to_string()));
        assert_eq!(normalize_currency_code("Usd"), Ok("USD".to_string()));
        assert!(normalize_currency_code("EURO").is_err());
        assert!(normalize_currency_code("").is_err());
        assert!(normalize_currency_code("U$D").is_err());
    }
}
