//! Provider capabilities.
//!
//! This module defines structures for describing what a provider can do and
//! how its answers should be cached.

use crate::models::AssetClass;

/// How a provider answers a price lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LookupMode {
    /// One upstream call per query string (search endpoints).
    PerQuery,
    /// One upstream call returns the whole market list for a quote currency;
    /// the query only matters for matching, not for fetching.
    MarketList,
}

/// Describes the capabilities of a price provider.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Asset classes this provider can price.
    pub asset_classes: &'static [AssetClass],

    /// Whether answers are keyed by query or by quote-currency bucket.
    pub lookup_mode: LookupMode,
}

impl ProviderCapabilities {
    pub fn supports(&self, class: AssetClass) -> bool {
        self.asset_classes.contains(&class)
    }
}
