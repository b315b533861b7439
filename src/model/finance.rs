//! Loan arithmetic shared by both engines.

/// Standard amortization: `P*r*(1+r)^n / ((1+r)^n - 1)` with the monthly
/// rate `r = annual_rate / 12`.
///
/// The `r = 0` limit degenerates to `P / n`; special-cased to avoid an
/// indeterminate `0/0` division.
pub fn amortized_monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months);
    let r = annual_rate / 12.0;

    if r == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * (r * growth) / (growth - 1.0)
}

/// Projected debt ratio once the new payment is added:
/// `(payment + total_debt / n) / income * 100`, rounded to 1 decimal.
pub fn post_loan_debt_ratio_pct(
    monthly_payment: f64,
    total_debt: f64,
    term_months: u32,
    monthly_income: f64,
) -> f64 {
    let ratio = (monthly_payment + total_debt / f64::from(term_months)) / monthly_income * 100.0;
    round1(ratio)
}

/// Rounds to 1 decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_payment_is_principal_over_term() {
        let payment = amortized_monthly_payment(1200.0, 0.0, 12);
        assert_eq!(payment, 100.0);
    }

    #[test]
    fn test_payment_positive_for_positive_inputs() {
        let payment = amortized_monthly_payment(5000.0, 0.12, 12);
        assert!(payment > 0.0);
        // A 12% annual rate over 12 months costs more than the flat split.
        assert!(payment > 5000.0 / 12.0);
    }

    #[test]
    fn test_known_amortization_value() {
        // 5000 at 12% annual over 12 months: r = 0.01.
        let payment = amortized_monthly_payment(5000.0, 0.12, 12);
        assert!((payment - 444.24).abs() < 0.01, "payment was {payment}");
    }

    #[test]
    fn test_post_loan_ratio_rounds_to_one_decimal() {
        let pct = post_loan_debt_ratio_pct(444.24, 1000.0, 12, 3000.0);
        assert_eq!(pct, 17.6);
    }
}
