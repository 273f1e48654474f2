mod holdings_model;
mod wallet_holdings_calculator;

#[cfg(test)]
mod wallet_holdings_calculator_tests;

pub use holdings_model::WalletHoldings;
pub use wallet_holdings_calculator::WalletHoldingsCalculator;
