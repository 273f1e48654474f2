//! Portfolio calculations: replay the ledger, then value what it left behind.

pub mod accounting;
pub mod holdings;
pub mod loans;
pub mod valuation;

pub use accounting::*;
pub use holdings::*;
pub use loans::*;
pub use valuation::*;
