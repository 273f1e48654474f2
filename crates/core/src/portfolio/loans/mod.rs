mod loans_calculator;
mod loans_model;

pub use loans_calculator::calculate_loan_summary;
pub use loans_model::LoanSummary;
