//! Tallyfolio Market Data Crate
//!
//! Upstream adapters used by the valuation engine to price assets and convert
//! currencies.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Crypto prices from CoinGecko (bulk market list) and DexScreener (pair search)
//! - Stock prices from Yahoo Finance
//! - Spot FX rates from Frankfurter
//! - Fuzzy resolution of inconsistent asset identifiers to one candidate
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +---------------------+
//! |   Price Oracle   | --> |   PriceProvider     |  (CoinGecko, DexScreener, Yahoo)
//! |   (core crate)   |     +---------------------+
//! +------------------+                |
//!          |                          v
//!          |               +---------------------+
//!          +-------------> |  Vec<PriceCandidate>|
//!                          +---------------------+
//!                                     |
//!                                     v
//!                          +---------------------+
//!                          |  resolver::best_match|  (tiers + ranking)
//!                          +---------------------+
//! ```
//!
//! Providers are stateless. Caching, timeouts around whole lookups and
//! provider fallback live in the core crate.
//!
//! # Core Types
//!
//! - [`PriceCandidate`] - One priced instrument returned by a provider
//! - [`AssetClass`] - Crypto or stock
//! - [`FxQuote`] - A spot FX rate with its source
//! - [`MarketDataError`] - Provider error with retry classification

pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use errors::{MarketDataError, RetryClass};

pub use models::{AssetClass, FxQuote, PriceCandidate, ProviderId};

pub use resolver::{best_match, identifier_variants, CandidateMatch, MatchTier};

pub use provider::coingecko::CoinGeckoProvider;
pub use provider::dexscreener::DexScreenerProvider;
pub use provider::frankfurter::FrankfurterProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{
    FxRateProvider, LookupMode, PriceProvider, ProviderCapabilities, DEFAULT_HTTP_TIMEOUT,
};
