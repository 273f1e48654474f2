//! Candidate resolution for fuzzy asset identifiers.
//!
//! Ledger rows name the same asset inconsistently ("BTC", "Bitcoin",
//! "BTC - Bitcoin"). Providers answer with lists of candidates, one per
//! instrument or per trading pair. This module picks the candidate that best
//! corresponds to an identifier:
//!
//! ```text
//! identifier ──► variants ──► match tiers ──► ranking ──► best candidate
//!   "BTC - Bitcoin"   ["BTC - Bitcoin",    exact symbol     exact symbol
//!                      "BTC", "Bitcoin"]   exact name       stable quote
//!                                          exact id         liquidity
//!                                          substring        volume
//! ```
//!
//! Tiers are tried in order and, within a tier, variants in order. The first
//! tier/variant that yields usable candidates wins, and ranking only breaks
//! ties inside that set. Candidates without a positive price never match.

mod matcher;
mod ranking;

#[cfg(test)]
mod matcher_tests;

pub use matcher::{best_match, identifier_variants, CandidateMatch, MatchTier};
pub use ranking::{is_stable_quote, rank_candidates, STABLE_QUOTES};
