//! Presentation rounding. Accumulation never goes through these helpers.

use rust_decimal::{Decimal, RoundingStrategy};
use tallyfolio_market_data::AssetClass;

use crate::constants::{
    AMOUNT_DECIMAL_PLACES, CRYPTO_QUANTITY_DECIMAL_PLACES, PRICE_DECIMAL_PLACES,
    STOCK_QUANTITY_DECIMAL_PLACES,
};

/// Round half away from zero to `dp` places and trim trailing zeros.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Round a currency amount (or percentage) for display.
pub fn round_amount(value: Decimal) -> Decimal {
    round_half_up(value, AMOUNT_DECIMAL_PLACES)
}

/// Round a unit price for display.
pub fn round_price(value: Decimal) -> Decimal {
    round_half_up(value, PRICE_DECIMAL_PLACES)
}

/// Round a held quantity using the precision of its asset class.
pub fn round_quantity(value: Decimal, class: AssetClass) -> Decimal {
    let dp = match class {
        AssetClass::Crypto => CRYPTO_QUANTITY_DECIMAL_PLACES,
        AssetClass::Stock => STOCK_QUANTITY_DECIMAL_PLACES,
    };
    round_half_up(value, dp)
}
