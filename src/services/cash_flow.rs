// src/services/cash_flow.rs
use crate::models::{CashFlowInput, CashFlowResult};

/// Fixed monthly payment for an amortizing loan.
///
/// The standard formula is 0/0 at a zero rate, so that case is an explicit
/// branch: equal principal installments with no interest.
fn monthly_payment(loan_amount: f64, annual_rate_pct: f64, num_payments: f64) -> f64 {
    if annual_rate_pct == 0.0 {
        return loan_amount / num_payments;
    }
    let monthly_interest = annual_rate_pct / 12.0 / 100.0;
    loan_amount * monthly_interest / (1.0 - (1.0 + monthly_interest).powf(-num_payments))
}

/// Monthly/annual cash flow and cash-on-cash return for one deal.
///
/// Pure arithmetic, always succeeds. Range checks (negative rates, zero loan
/// terms) belong to the request validation layer; a zero-year term propagates
/// ordinary floating-point semantics.
pub fn calculate(input: &CashFlowInput) -> CashFlowResult {
    let loan_amount = input.price - input.down_payment;
    let num_payments = f64::from(input.loan_term) * 12.0;
    let monthly_payment = monthly_payment(loan_amount, input.interest_rate, num_payments);

    let monthly_cash_flow = input.rent - input.expenses - monthly_payment;
    let annual_cash_flow = monthly_cash_flow * 12.0;
    // Exactly 0 with no cash invested, not a division by zero.
    let cash_on_cash_return = if input.down_payment > 0.0 {
        annual_cash_flow / input.down_payment * 100.0
    } else {
        0.0
    };

    CashFlowResult {
        monthly_payment,
        monthly_cash_flow,
        annual_cash_flow,
        cash_on_cash_return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CashFlowInput {
        CashFlowInput {
            price: 500_000.0,
            down_payment: 100_000.0,
            interest_rate: 4.5,
            loan_term: 30,
            rent: 2500.0,
            expenses: 500.0,
        }
    }

    #[test]
    fn matches_amortization_formula() {
        let result = calculate(&base_input());
        // 400k at 4.5% over 360 payments
        assert!((result.monthly_payment - 2026.74).abs() < 0.01);
        assert!((result.monthly_cash_flow - (-26.74)).abs() < 0.01);
    }

    #[test]
    fn annual_is_twelve_months_exactly() {
        let result = calculate(&base_input());
        assert_eq!(result.annual_cash_flow, result.monthly_cash_flow * 12.0);
    }

    #[test]
    fn cash_on_cash_matches_definition() {
        let result = calculate(&base_input());
        let expected = result.annual_cash_flow / 100_000.0 * 100.0;
        assert!((result.cash_on_cash_return - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_down_payment_returns_zero_not_nan() {
        let mut input = base_input();
        input.down_payment = 0.0;
        let result = calculate(&input);
        assert_eq!(result.cash_on_cash_return, 0.0);
    }

    #[test]
    fn zero_interest_splits_principal_evenly() {
        let mut input = base_input();
        input.interest_rate = 0.0;
        let result = calculate(&input);
        assert!((result.monthly_payment - 400_000.0 / 360.0).abs() < 1e-9);
        assert!(result.monthly_payment.is_finite());
    }

    #[test]
    fn higher_rate_means_lower_cash_flow() {
        let base = calculate(&base_input());
        let mut prev = base.monthly_cash_flow;
        for rate in [5.0, 6.5, 7.5, 10.0] {
            let mut input = base_input();
            input.interest_rate = rate;
            let result = calculate(&input);
            assert!(result.monthly_cash_flow < prev, "rate {} did not lower cash flow", rate);
            prev = result.monthly_cash_flow;
        }
    }

    #[test]
    fn higher_expenses_mean_lower_cash_flow() {
        let base = calculate(&base_input());
        let mut input = base_input();
        input.expenses = 2000.0;
        let result = calculate(&input);
        assert!(result.monthly_cash_flow < base.monthly_cash_flow);
    }
}
