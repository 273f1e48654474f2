use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::PriceCandidate;

fn coin(symbol: &str, name: &str, id: &str, price: Decimal) -> PriceCandidate {
    PriceCandidate::new(symbol, name, price, "EUR", "COINGECKO").with_id(id)
}

fn market_list() -> Vec<PriceCandidate> {
    vec![
        coin("BTC", "Bitcoin", "bitcoin", dec!(60000)),
        coin("WBTC", "Wrapped Bitcoin", "wrapped-bitcoin", dec!(59950)),
        coin("ETH", "Ethereum", "ethereum", dec!(3000)),
        coin("MATIC", "Polygon", "matic-network", dec!(0.7)),
        coin("DEAD", "Dead Coin", "dead-coin", Decimal::ZERO),
    ]
}

#[test]
fn test_variants_for_dash_separated_identifier() {
    assert_eq!(
        identifier_variants("BTC - Bitcoin"),
        vec!["BTC - Bitcoin", "BTC", "Bitcoin"]
    );
}

#[test]
fn test_variants_for_parenthesised_identifier() {
    assert_eq!(
        identifier_variants(" Bitcoin (BTC) "),
        vec!["Bitcoin (BTC)", "Bitcoin", "BTC"]
    );
}

#[test]
fn test_variants_for_blank_identifier() {
    assert!(identifier_variants("   ").is_empty());
    assert!(best_match("", &market_list()).is_none());
}

#[test]
fn test_exact_symbol_wins_over_substring() {
    let candidates = market_list();
    let found = best_match("btc", &candidates).unwrap();
    assert_eq!(found.candidate.symbol, "BTC");
    assert_eq!(found.tier, MatchTier::ExactSymbol);
}

#[test]
fn test_all_legacy_spellings_resolve_to_same_coin() {
    let candidates = market_list();
    for identifier in ["BTC", "Bitcoin", "BTC - Bitcoin", "bitcoin"] {
        let found = best_match(identifier, &candidates).unwrap();
        assert_eq!(found.candidate.id.as_deref(), Some("bitcoin"), "{}", identifier);
    }
}

#[test]
fn test_exact_name_match() {
    let candidates = market_list();
    let found = best_match("Polygon", &candidates).unwrap();
    assert_eq!(found.candidate.symbol, "MATIC");
    assert_eq!(found.tier, MatchTier::ExactName);
}

#[test]
fn test_exact_id_match() {
    let candidates = market_list();
    let found = best_match("matic-network", &candidates).unwrap();
    assert_eq!(found.candidate.symbol, "MATIC");
    assert_eq!(found.tier, MatchTier::ExactId);
}

#[test]
fn test_substring_match_in_either_direction() {
    let candidates = market_list();

    let found = best_match("Ethereum Classic Legacy", &candidates).unwrap();
    assert_eq!(found.candidate.symbol, "ETH");
    assert_eq!(found.tier, MatchTier::Contains);

    let found = best_match("Wrapped", &candidates).unwrap();
    assert_eq!(found.candidate.symbol, "WBTC");
}

#[test]
fn test_zero_priced_candidates_never_match() {
    let candidates = market_list();
    assert!(best_match("DEAD", &candidates).is_none());
}

#[test]
fn test_unknown_identifier() {
    let candidates = market_list();
    assert!(best_match("ZZZFAKE", &candidates).is_none());
}

#[test]
fn test_ranking_breaks_ties_within_tier() {
    let candidates = vec![
        PriceCandidate::new("PEPE", "Pepe", dec!(0.0000011), "USD", "DEXSCREENER")
            .with_quote_symbol("WETH")
            .with_liquidity(Some(dec!(90000000))),
        PriceCandidate::new("PEPE", "Pepe", dec!(0.0000012), "USD", "DEXSCREENER")
            .with_quote_symbol("USDT")
            .with_liquidity(Some(dec!(5000))),
    ];

    let found = best_match("PEPE", &candidates).unwrap();
    assert_eq!(found.candidate.price, dec!(0.0000012));
}
