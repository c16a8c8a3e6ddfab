//! Discrete compound-interest formula and the tax/fee breakdown
//!
//! FV = P × (1 + r/n)^(n×t), with r the annual rate as a decimal.
//! Tax applies to gains only; the fee applies to the whole value.

use super::annuity;
use super::input::CalculationInput;
use crate::error::{ensure_frequency, ensure_non_negative, Result};
use serde::{Deserialize, Serialize};

/// Gross interest, deductions and the resulting net value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetBreakdown {
    pub interest: f64,
    pub tax: f64,
    pub fee: f64,
    pub net: f64,
}

/// Outcome of one calculation, derived entirely from its `CalculationInput`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Value before tax and fee
    pub future_value: f64,
    /// Principal, or the sum of all payments for savings plans
    pub total_contributed: f64,
    /// Gross interest earned
    pub interest: f64,
    pub tax: f64,
    pub fee: f64,
    /// Value after tax and fee
    pub net_value: f64,
}

impl CalculationResult {
    pub(crate) fn from_future_value(future_value: f64, total_contributed: f64, tax_rate: f64, fee_rate: f64) -> Self {
        let breakdown = compute_net(future_value, total_contributed, tax_rate, fee_rate);
        Self {
            future_value,
            total_contributed,
            interest: breakdown.interest,
            tax: breakdown.tax,
            fee: breakdown.fee,
            net_value: breakdown.net,
        }
    }

    /// Interest left after tax and fee
    pub fn net_interest(&self) -> f64 {
        self.interest - self.tax - self.fee
    }
}

/// Growth factor `(1 + r/n)^(n×t)` for an annual rate given in percent
pub(crate) fn growth_factor(annual_rate_percent: f64, years: f64, compounds_per_year: u32) -> f64 {
    let n = compounds_per_year as f64;
    let periodic_rate = annual_rate_percent / 100.0 / n;
    (1.0 + periodic_rate).powf(n * years)
}

/// Future value of a lump sum under discrete compounding
pub fn compute_future_value(principal: f64, annual_rate_percent: f64, years: f64, compounds_per_year: u32) -> Result<f64> {
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("rate", annual_rate_percent)?;
    ensure_non_negative("years", years)?;
    ensure_frequency(compounds_per_year)?;

    Ok(principal * growth_factor(annual_rate_percent, years, compounds_per_year))
}

/// Split a future value into interest, tax, fee and net
///
/// `principal` is whatever the investor contributed; only the excess is taxed.
/// Net value is floored at zero when tax and fee together exceed the value.
pub fn compute_net(future_value: f64, principal: f64, tax_rate_percent: f64, fee_rate_percent: f64) -> NetBreakdown {
    let interest = future_value - principal;
    let tax = interest.max(0.0) * tax_rate_percent / 100.0;
    let fee = future_value * fee_rate_percent / 100.0;

    NetBreakdown {
        interest,
        tax,
        fee,
        net: (future_value - tax - fee).max(0.0),
    }
}

/// Run the engine matching the input: annuity for savings plans, lump sum otherwise
pub fn calculate(input: &CalculationInput) -> CalculationResult {
    let future_value = if input.is_regular_savings() {
        annuity::annuity_factor(input.annual_rate(), input.years(), input.compounds_per_year()) * input.payment()
    } else {
        input.principal() * growth_factor(input.annual_rate(), input.years(), input.compounds_per_year())
    };

    let result = CalculationResult::from_future_value(
        future_value,
        input.total_contributed(),
        input.tax_rate(),
        input.fee_rate(),
    );
    log::debug!(
        "calculated fv={:.2} net={:.2} (rate={}%, years={}, n={})",
        result.future_value,
        result.net_value,
        input.annual_rate(),
        input.years(),
        input.compounds_per_year()
    );
    result
}
