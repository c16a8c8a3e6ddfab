//! Ordinary annuity: equal payments at the end of every compounding period

use super::formula::{growth_factor, CalculationResult};
use crate::error::{ensure_frequency, ensure_non_negative, Result};

/// Future value of one unit paid every period, `((1+r/n)^(n×t) − 1) / (r/n)`
///
/// A zero rate collapses to the number of payments, `n × t`.
pub(crate) fn annuity_factor(annual_rate_percent: f64, years: f64, compounds_per_year: u32) -> f64 {
    let n = compounds_per_year as f64;
    if annual_rate_percent == 0.0 {
        return n * years;
    }
    let periodic_rate = annual_rate_percent / 100.0 / n;
    (growth_factor(annual_rate_percent, years, compounds_per_year) - 1.0) / periodic_rate
}

/// Future value of `periodic_contribution` paid at the end of every period
pub fn compute_annuity_future_value(
    periodic_contribution: f64,
    annual_rate_percent: f64,
    years: f64,
    compounds_per_year: u32,
) -> Result<f64> {
    ensure_non_negative("payment", periodic_contribution)?;
    ensure_non_negative("rate", annual_rate_percent)?;
    ensure_non_negative("years", years)?;
    ensure_frequency(compounds_per_year)?;

    Ok(periodic_contribution * annuity_factor(annual_rate_percent, years, compounds_per_year))
}

/// Annuity future value with tax and fee applied
///
/// The taxable gain is measured against the total contributed, `payment × n × t`.
pub fn compute_annuity_result(
    periodic_contribution: f64,
    annual_rate_percent: f64,
    years: f64,
    compounds_per_year: u32,
    tax_rate_percent: f64,
    fee_rate_percent: f64,
) -> Result<CalculationResult> {
    let future_value = compute_annuity_future_value(periodic_contribution, annual_rate_percent, years, compounds_per_year)?;
    let total_contributed = periodic_contribution * compounds_per_year as f64 * years;

    Ok(CalculationResult::from_future_value(
        future_value,
        total_contributed,
        tax_rate_percent,
        fee_rate_percent,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::{calculate, CalculationInput};
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rate_is_sum_of_payments() {
        let fv = compute_annuity_future_value(250.0, 0.0, 3.0, 12).unwrap();
        assert_eq!(fv, 250.0 * 12.0 * 3.0);
    }

    #[test]
    fn test_known_value() {
        // $100/month for 10 years at 6%: 100 × ((1.005^120 − 1) / 0.005) ≈ 16387.93
        let fv = compute_annuity_future_value(100.0, 6.0, 10.0, 12).unwrap();
        assert_relative_eq!(fv, 16387.93, epsilon = 0.01);
    }

    #[test]
    fn test_single_period_pays_once() {
        let fv = compute_annuity_future_value(1000.0, 8.0, 1.0, 1).unwrap();
        assert_relative_eq!(fv, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tax_applies_to_gain_over_contributions() {
        let result = compute_annuity_result(100.0, 6.0, 10.0, 12, 20.0, 0.5).unwrap();
        assert_eq!(result.total_contributed, 12_000.0);
        assert_relative_eq!(result.interest, result.future_value - 12_000.0, epsilon = 1e-9);
        assert_relative_eq!(result.tax, result.interest * 0.20, epsilon = 1e-9);
        assert_relative_eq!(result.fee, result.future_value * 0.005, epsilon = 1e-9);
        assert_relative_eq!(result.net_value, result.future_value - result.tax - result.fee, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate_has_no_interest() {
        let result = compute_annuity_result(50.0, 0.0, 2.0, 4, 30.0, 0.0).unwrap();
        assert_eq!(result.interest, 0.0);
        assert_eq!(result.tax, 0.0);
        assert_eq!(result.net_value, 400.0);
    }

    #[test]
    fn test_calculate_dispatches_to_annuity() {
        let input = CalculationInput::regular_savings(100.0, 6.0, 10.0, 12)
            .and_then(|i| i.with_tax_rate(20.0))
            .unwrap();
        let direct = compute_annuity_result(100.0, 6.0, 10.0, 12, 20.0, 0.0).unwrap();
        assert_eq!(calculate(&input), direct);
    }

    #[test]
    fn test_rejects_zero_frequency() {
        assert!(compute_annuity_future_value(100.0, 5.0, 1.0, 0).is_err());
    }
}
