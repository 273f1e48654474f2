//! Ordering of competing candidates for the same query.

use rust_decimal::Decimal;

use crate::models::PriceCandidate;

/// Quote assets treated as a stable USD reference.
pub const STABLE_QUOTES: &[&str] = &["USDT", "USDC", "DAI", "BUSD", "TUSD", "USDP", "FDUSD", "USD"];

/// Whether `symbol` is a stable quote asset.
pub fn is_stable_quote(symbol: &str) -> bool {
    STABLE_QUOTES
        .iter()
        .any(|stable| stable.eq_ignore_ascii_case(symbol.trim()))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    exact_symbol: bool,
    stable_quote: bool,
    liquidity: Decimal,
    volume: Decimal,
}

impl RankKey {
    fn of(query: &str, candidate: &PriceCandidate) -> Self {
        Self {
            exact_symbol: candidate.symbol.eq_ignore_ascii_case(query.trim()),
            stable_quote: candidate
                .quote_symbol
                .as_deref()
                .map(is_stable_quote)
                .unwrap_or(false),
            liquidity: candidate.liquidity.unwrap_or(Decimal::ZERO),
            volume: candidate.volume.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Sort candidates best first: exact symbol, stable quote, liquidity, volume.
///
/// The sort is stable, so fully tied candidates keep provider order.
pub fn rank_candidates<'a>(
    query: &str,
    mut candidates: Vec<&'a PriceCandidate>,
) -> Vec<&'a PriceCandidate> {
    candidates.sort_by(|a, b| RankKey::of(query, b).cmp(&RankKey::of(query, a)));
    candidates
}
