//! Goal seeking: invert the compound-interest formula for one unknown
//!
//! Principal and duration have closed forms. The annual rate has none and is
//! found by bisection. Tax and fee are not part of the inversion; callers who
//! want a net target should gross it up first.

use crate::error::{ensure_frequency, ensure_non_negative, CalcError, Result};
use crate::interest::growth_factor;
use serde::{Deserialize, Serialize};

/// Upper bound of the rate search, in percent
const MAX_RATE_PERCENT: f64 = 1000.0;
const RATE_TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// A target value plus every parameter except the unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solve_for", rename_all = "snake_case")]
pub enum GoalSpec {
    Principal {
        target: f64,
        annual_rate: f64,
        years: f64,
        compounds_per_year: u32,
    },
    Years {
        target: f64,
        principal: f64,
        annual_rate: f64,
        compounds_per_year: u32,
    },
    Rate {
        target: f64,
        principal: f64,
        years: f64,
        compounds_per_year: u32,
    },
}

/// The solved unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSolution {
    Principal(f64),
    Years(f64),
    /// Annual rate in percent
    Rate(f64),
}

impl GoalSpec {
    pub fn solve(&self) -> Result<GoalSolution> {
        match *self {
            GoalSpec::Principal { target, annual_rate, years, compounds_per_year } => {
                solve_for_principal(target, annual_rate, years, compounds_per_year).map(GoalSolution::Principal)
            }
            GoalSpec::Years { target, principal, annual_rate, compounds_per_year } => {
                solve_for_years(target, principal, annual_rate, compounds_per_year).map(GoalSolution::Years)
            }
            GoalSpec::Rate { target, principal, years, compounds_per_year } => {
                solve_for_rate(target, principal, years, compounds_per_year).map(GoalSolution::Rate)
            }
        }
    }
}

/// Principal needed today to reach `target` after `years`
pub fn solve_for_principal(target: f64, annual_rate_percent: f64, years: f64, compounds_per_year: u32) -> Result<f64> {
    ensure_non_negative("target", target)?;
    ensure_non_negative("rate", annual_rate_percent)?;
    ensure_non_negative("years", years)?;
    ensure_frequency(compounds_per_year)?;

    Ok(target / growth_factor(annual_rate_percent, years, compounds_per_year))
}

/// Years needed for `principal` to grow to `target`
///
/// Only defined when the target exceeds the principal and the rate is positive.
pub fn solve_for_years(target: f64, principal: f64, annual_rate_percent: f64, compounds_per_year: u32) -> Result<f64> {
    ensure_non_negative("target", target)?;
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("rate", annual_rate_percent)?;
    ensure_frequency(compounds_per_year)?;

    if principal == 0.0 {
        return Err(CalcError::Unsolvable("a zero principal never grows".into()));
    }
    if target <= principal {
        return Err(CalcError::Unsolvable(format!(
            "target {:.2} is already met by principal {:.2}",
            target, principal
        )));
    }
    if annual_rate_percent == 0.0 {
        return Err(CalcError::Unsolvable("a zero rate never reaches a higher target".into()));
    }

    let n = compounds_per_year as f64;
    let periodic_rate = annual_rate_percent / 100.0 / n;
    Ok((target / principal).ln() / (n * periodic_rate.ln_1p()))
}

/// Annual rate (percent) needed for `principal` to reach `target` in `years`
pub fn solve_for_rate(target: f64, principal: f64, years: f64, compounds_per_year: u32) -> Result<f64> {
    ensure_non_negative("target", target)?;
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("years", years)?;
    ensure_frequency(compounds_per_year)?;

    if target == principal {
        return Ok(0.0);
    }
    if principal == 0.0 {
        return Err(CalcError::Unsolvable("a zero principal never grows".into()));
    }
    if target < principal {
        return Err(CalcError::Unsolvable(format!(
            "target {:.2} is below principal {:.2}; rates are non-negative",
            target, principal
        )));
    }
    if years == 0.0 {
        return Err(CalcError::Unsolvable("no growth is possible over zero years".into()));
    }

    let shortfall = |rate: f64| principal * growth_factor(rate, years, compounds_per_year) - target;

    let mut low = 0.0_f64;
    let mut high = MAX_RATE_PERCENT;
    if shortfall(high) < 0.0 {
        return Err(CalcError::Unsolvable(format!(
            "target needs more than {}% a year",
            MAX_RATE_PERCENT
        )));
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let value = shortfall(mid);

        if value.abs() < RATE_TOLERANCE || (high - low) / 2.0 < RATE_TOLERANCE {
            log::debug!("rate solver converged at {}%", mid);
            return Ok(mid);
        }

        // Growth is increasing in the rate
        if value < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok((low + high) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interest::compute_future_value;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_years_reference() {
        let years = solve_for_years(20_000.0, 10_000.0, 5.0, 12).unwrap();
        assert_abs_diff_eq!(years, 13.9, epsilon = 0.01);
    }

    #[test]
    fn test_principal_round_trip() {
        for &(principal, rate, years, n) in &[
            (10_000.0, 5.0, 10.0, 12),
            (1.0, 0.25, 40.0, 365),
            (750_000.0, 12.0, 3.5, 4),
        ] {
            let fv = compute_future_value(principal, rate, years, n).unwrap();
            let back = solve_for_principal(fv, rate, years, n).unwrap();
            assert_relative_eq!(back, principal, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_zero_rate_principal_equals_target() {
        assert_eq!(solve_for_principal(5000.0, 0.0, 10.0, 12).unwrap(), 5000.0);
    }

    #[test]
    fn test_years_unsolvable_cases() {
        assert!(matches!(solve_for_years(1000.0, 1000.0, 5.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_years(900.0, 1000.0, 5.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_years(2000.0, 1000.0, 0.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_years(2000.0, 0.0, 5.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_years(2000.0, 1000.0, 5.0, 0), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_years_reaches_target() {
        let years = solve_for_years(3000.0, 1000.0, 7.0, 4).unwrap();
        let fv = compute_future_value(1000.0, 7.0, years, 4).unwrap();
        assert_relative_eq!(fv, 3000.0, max_relative = 1e-10);
    }

    #[test]
    fn test_rate_recovers_known_rate() {
        let fv = compute_future_value(10_000.0, 5.0, 10.0, 12).unwrap();
        let rate = solve_for_rate(fv, 10_000.0, 10.0, 12).unwrap();
        assert_abs_diff_eq!(rate, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rate_edge_cases() {
        assert_eq!(solve_for_rate(500.0, 500.0, 3.0, 12).unwrap(), 0.0);
        assert!(matches!(solve_for_rate(400.0, 500.0, 3.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_rate(600.0, 500.0, 0.0, 12), Err(CalcError::Unsolvable(_))));
        assert!(matches!(solve_for_rate(1e12, 1.0, 1.0, 1), Err(CalcError::Unsolvable(_))));
    }

    #[test]
    fn test_goal_spec_dispatch() {
        let spec = GoalSpec::Years {
            target: 20_000.0,
            principal: 10_000.0,
            annual_rate: 5.0,
            compounds_per_year: 12,
        };
        match spec.solve().unwrap() {
            GoalSolution::Years(years) => assert_abs_diff_eq!(years, 13.9, epsilon = 0.01),
            other => panic!("unexpected solution {:?}", other),
        }

        let spec = GoalSpec::Principal {
            target: 16470.09,
            annual_rate: 5.0,
            years: 10.0,
            compounds_per_year: 12,
        };
        match spec.solve().unwrap() {
            GoalSolution::Principal(p) => assert_abs_diff_eq!(p, 10_000.0, epsilon = 0.01),
            other => panic!("unexpected solution {:?}", other),
        }
    }

    #[test]
    fn test_goal_spec_from_json() {
        let spec: GoalSpec = serde_json::from_str(
            r#"{"solve_for": "rate", "target": 2000, "principal": 1000, "years": 10, "compounds_per_year": 1}"#,
        )
        .unwrap();
        match spec.solve().unwrap() {
            GoalSolution::Rate(rate) => assert_abs_diff_eq!(rate, 7.177346, epsilon = 1e-5),
            other => panic!("unexpected solution {:?}", other),
        }
    }
}
