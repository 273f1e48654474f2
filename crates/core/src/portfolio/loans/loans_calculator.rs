use log::warn;
use rust_decimal::Decimal;

use super::loans_model::LoanSummary;
use crate::fx::FxRateMap;
use crate::ledger::{LoanAction, LoanKind, LoanRecord};
use crate::utils::checked_add;

/// Sum loans into receive/owe totals. New loans add, repayments subtract,
/// and each total is floored at zero once all rows are in.
pub fn calculate_loan_summary(
    loans: &[LoanRecord],
    rates: &FxRateMap,
    base_currency: &str,
) -> LoanSummary {
    let mut summary = LoanSummary::empty(base_currency);

    for loan in loans {
        let currency = loan.currency.as_deref().unwrap_or(base_currency);
        let amount = match rates.convert(loan.amount, currency, base_currency) {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Loan {} left out of totals: {}", loan.id, e);
                summary.excluded_loans += 1;
                summary.fx_degraded = true;
                continue;
            }
        };

        let signed = match loan.action {
            LoanAction::New => amount,
            LoanAction::Repay => -amount,
        };
        let total = match loan.kind {
            LoanKind::Lend => &mut summary.receive_total,
            LoanKind::Borrow => &mut summary.owe_total,
        };
        match checked_add(*total, signed, "loan total") {
            Ok(sum) => *total = sum,
            Err(e) => {
                warn!("Loan {} left out of totals: {}", loan.id, e);
                summary.excluded_loans += 1;
            }
        }
    }

    summary.receive_total = summary.receive_total.max(Decimal::ZERO);
    summary.owe_total = summary.owe_total.max(Decimal::ZERO);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn loan(id: &str, kind: LoanKind, action: LoanAction, amount: Decimal, currency: Option<&str>) -> LoanRecord {
        LoanRecord {
            id: id.to_string(),
            kind,
            action,
            amount,
            currency: currency.map(str::to_string),
            malformed_fields: Vec::new(),
        }
    }

    #[test]
    fn test_new_and_repay_net_out() {
        let loans = vec![
            loan("1", LoanKind::Lend, LoanAction::New, dec!(500), Some("EUR")),
            loan("2", LoanKind::Lend, LoanAction::Repay, dec!(200), None),
            loan("3", LoanKind::Borrow, LoanAction::New, dec!(1000), Some("EUR")),
        ];

        let summary = calculate_loan_summary(&loans, &FxRateMap::new(), "EUR");

        assert_eq!(summary.receive_total, dec!(300));
        assert_eq!(summary.owe_total, dec!(1000));
        assert_eq!(summary.net(), Some(dec!(-700)));
        assert!(!summary.fx_degraded);
    }

    #[test]
    fn test_totals_clamped_at_zero() {
        let loans = vec![
            loan("1", LoanKind::Borrow, LoanAction::New, dec!(100), None),
            loan("2", LoanKind::Borrow, LoanAction::Repay, dec!(150), None),
        ];

        let summary = calculate_loan_summary(&loans, &FxRateMap::new(), "EUR");
        assert_eq!(summary.owe_total, Decimal::ZERO);
    }

    #[test]
    fn test_foreign_loans_converted_or_excluded() {
        let mut rates = FxRateMap::new();
        rates.insert("USD", "EUR", dec!(0.5));
        let loans = vec![
            loan("1", LoanKind::Lend, LoanAction::New, dec!(100), Some("USD")),
            loan("2", LoanKind::Lend, LoanAction::New, dec!(100), Some("CHF")),
        ];

        let summary = calculate_loan_summary(&loans, &rates, "EUR");

        assert_eq!(summary.receive_total, dec!(50));
        assert_eq!(summary.excluded_loans, 1);
        assert!(summary.fx_degraded);
    }
    #[test]
    fn test_overflowing_loan_is_excluded() {
        let loans = vec![
            loan("1", LoanKind::Borrow, LoanAction::New, Decimal::MAX, None),
            loan("2", LoanKind::Borrow, LoanAction::New, dec!(10), None),
            loan("3", LoanKind::Lend, LoanAction::New, dec!(40), None),
        ];

        let summary = calculate_loan_summary(&loans, &FxRateMap::new(), "EUR");

        assert_eq!(summary.owe_total, Decimal::MAX);
        assert_eq!(summary.receive_total, dec!(40));
        assert_eq!(summary.excluded_loans, 1);
        assert!(!summary.fx_degraded);
    }
}
