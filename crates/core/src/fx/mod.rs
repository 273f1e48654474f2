//! FX (Foreign Exchange) module - currency codes, rate cache service and pre-fetched rate maps.

pub mod currency;
mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;


pub use currency::normalize_currency_code;
pub use fx_errors::FxError;
pub use fx_model::{FxCacheKey, FxRateMap};
pub use fx_service::FxService;
pub use fx_traits::FxServiceTrait;
