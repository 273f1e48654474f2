//! Shared TTL caches for FX rates and price lookups.
//!
//! Storage and time are both injected so the Currency Conversion Layer and the
//! Price Oracle can be tested without sleeping.

mod cache_store;
mod clock;
mod ttl_cache;

pub use cache_store::{CacheEntry, CacheStore, InMemoryCacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl_cache::{CacheLookup, TtlCache};
