use std::collections::HashMap;

use log::warn;
use rust_decimal::Decimal;

use super::fx_errors::FxError;

/// Cache key for a directed currency pair: (from, to).
pub type FxCacheKey = (String, String);

/// Rates resolved ahead of a calculation pass.
///
/// The calculators are synchronous; the valuation service resolves every pair
/// they will need first and hands them this map. Missing pairs surface as
/// [`FxError::RateNotFound`], never as a default rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FxRateMap {
    rates: HashMap<FxCacheKey, Decimal>,
}

impl FxRateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) {
        self.rates
            .insert((from.to_ascii_uppercase(), to.to_ascii_uppercase()), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rate for one unit of `from` in `to`. Identity pairs are always 1.
    pub fn rate(&self, from: &str, to: &str) -> Result<Decimal, FxError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(Decimal::ONE);
        }

        let from = from.to_ascii_uppercase();
        let to = to.to_ascii_uppercase();

        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Ok(*rate);
        }

        match self.rates.get(&(to.clone(), from.clone())) {
            Some(inverse) if !inverse.is_zero() => Decimal::ONE
                .checked_div(*inverse)
                .ok_or_else(|| FxError::ConversionOverflow(format!("{}->{}", from, to))),
            _ => {
                warn!(
                    "Required FX rate missing from pre-fetched rates for {}->{}. Inverse lookup also failed or rate was zero.",
                    from, to
                );
                Err(FxError::RateNotFound(format!("{}->{}", from, to)))
            }
        }
    }

    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal, FxError> {
        let rate = self.rate(from, to)?;
        amount.checked_mul(rate).ok_or_else(|| {
            FxError::ConversionOverflow(format!("of {} {}->{}", amount, from, to))
        })
    }
}
