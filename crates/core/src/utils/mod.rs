pub mod decimal_utils;
pub mod display_utils;
pub mod time_utils;

pub use decimal_utils::{
    checked_add, checked_mul, checked_sub, parse_decimal, parse_decimal_str, to_decimal,
};
pub use display_utils::{round_amount, round_half_up, round_price, round_quantity};
pub use time_utils::parse_ledger_timestamp;
