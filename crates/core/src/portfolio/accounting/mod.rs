mod accounting_model;
mod cost_basis_calculator;


pub use accounting_model::{AccountingResult, AccountingWarning, AssetPosition, AssetRef};
pub use cost_basis_calculator::CostBasisCalculator;
