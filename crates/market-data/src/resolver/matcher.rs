//! Identifier variants and tiered candidate matching.

use log::debug;

use crate::models::PriceCandidate;

use super::ranking::rank_candidates;

/// How a candidate matched the identifier, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    ExactSymbol,
    ExactName,
    ExactId,
    /// Name or id contains the variant, or the other way round. Symbols are
    /// left out: short tickers appear inside too many unrelated names.
    Contains,
}

impl MatchTier {
    pub const ALL: [MatchTier; 4] = [
        MatchTier::ExactSymbol,
        MatchTier::ExactName,
        MatchTier::ExactId,
        MatchTier::Contains,
    ];

    fn matches(self, variant: &str, candidate: &PriceCandidate) -> bool {
        let variant = variant.to_lowercase();
        match self {
            MatchTier::ExactSymbol => candidate.symbol.to_lowercase() == variant,
            MatchTier::ExactName => candidate.name.to_lowercase() == variant,
            MatchTier::ExactId => candidate
                .id
                .as_deref()
                .map(|id| id.to_lowercase() == variant)
                .unwrap_or(false),
            MatchTier::Contains => {
                contains_either_way(&candidate.name.to_lowercase(), &variant)
                    || candidate
                        .id
                        .as_deref()
                        .map(|id| contains_either_way(&id.to_lowercase(), &variant))
                        .unwrap_or(false)
            }
        }
    }
}

fn contains_either_way(field: &str, variant: &str) -> bool {
    !field.is_empty() && (field.contains(variant) || variant.contains(field))
}

/// The winning candidate for an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch<'a> {
    pub candidate: &'a PriceCandidate,
    pub tier: MatchTier,
    /// The identifier variant that produced the match.
    pub variant: String,
}

/// Spellings to try for one identifier, most specific first.
///
/// `"BTC - Bitcoin"` yields `["BTC - Bitcoin", "BTC", "Bitcoin"]` and
/// `"Bitcoin (BTC)"` yields `["Bitcoin (BTC)", "Bitcoin", "BTC"]`.
pub fn identifier_variants(identifier: &str) -> Vec<String> {
    let full = identifier.trim();
    let mut variants: Vec<String> = Vec::new();
    let mut push = |value: &str| {
        let value = value.trim();
        if !value.is_empty() && !variants.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            variants.push(value.to_string());
        }
    };

    push(full);

    if let Some((left, right)) = full.split_once(" - ") {
        push(left);
        push(right);
    } else if let Some((left, rest)) = full.split_once('(') {
        if let Some(inner) = rest.strip_suffix(')') {
            push(left);
            push(inner);
        }
    }

    variants
}

/// Pick the best-priced candidate for `identifier`, or `None` if nothing matches.
pub fn best_match<'a>(
    identifier: &str,
    candidates: &'a [PriceCandidate],
) -> Option<CandidateMatch<'a>> {
    let variants = identifier_variants(identifier);
    if variants.is_empty() {
        return None;
    }

    for tier in MatchTier::ALL {
        for variant in &variants {
            let matching: Vec<&PriceCandidate> = candidates
                .iter()
                .filter(|c| c.has_price() && tier.matches(variant, c))
                .collect();

            if let Some(best) = rank_candidates(variant, matching).into_iter().next() {
                return Some(CandidateMatch {
                    candidate: best,
                    tier,
                    variant: variant.clone(),
                });
            }
        }
    }

    debug!(
        "No candidate among {} matched '{}'",
        candidates.len(),
        identifier
    );
    None
}
