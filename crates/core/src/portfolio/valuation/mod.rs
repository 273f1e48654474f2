mod valuation_calculator;
mod valuation_model;
mod valuation_service;
mod valuation_traits;


pub use valuation_calculator::{gain_loss_percent, ValuationCalculator};
pub use valuation_model::{
    AssetValuation, LedgerStatus, PortfolioSummary, PortfolioValuation, WalletAssetValuation,
    WalletValuation,
};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
