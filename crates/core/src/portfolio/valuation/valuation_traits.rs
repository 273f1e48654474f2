use async_trait::async_trait;

use super::valuation_model::PortfolioValuation;
use crate::errors::Result;

/// Trait defining the contract for the Valuation & P&L Aggregator.
#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Recompute the whole portfolio of `user_id` from its ledger.
    ///
    /// Upstream failures degrade the result (see
    /// [`PortfolioValuation::warnings`]) instead of failing the call.
    async fn value_portfolio(&self, user_id: &str) -> Result<PortfolioValuation>;
}
