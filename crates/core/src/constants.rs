/// Base currency used when the user has not chosen one
pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

/// FX cache lifetime in seconds
pub const DEFAULT_FX_CACHE_TTL_SECS: u64 = 3600;

/// Price cache lifetime in seconds
pub const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 300;

/// Deadline for one upstream call in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Wallet bucket for trades that name neither a source nor a destination wallet
pub const UNASSIGNED_WALLET_ID: &str = "__unassigned__";

/// Display precision for crypto quantities
pub const CRYPTO_QUANTITY_DECIMAL_PLACES: u32 = 8;

/// Display precision for stock quantities
pub const STOCK_QUANTITY_DECIMAL_PLACES: u32 = 4;

/// Display precision for unit prices
pub const PRICE_DECIMAL_PLACES: u32 = 8;

/// Display precision for currency amounts and percentages
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;
