//! Year-by-year growth schedule for display

use super::formula::calculate;
use super::input::CalculationInput;
use serde::{Deserialize, Serialize};

/// Net value at the end of a whole year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub year: u32,
    pub net_value: f64,
}

/// Last year listed in a growth schedule
pub const MAX_GROWTH_YEARS: u32 = 1000;

/// Net value for every whole year from 0 to `floor(years)`, at most up to
/// `MAX_GROWTH_YEARS`
///
/// Each point reruns the input over a shorter horizon, so tax and fee are
/// applied as if the investment were cashed out that year.
pub fn yearly_growth(input: &CalculationInput) -> Vec<GrowthPoint> {
    let whole_years = schedule_years(input.years());

    (0..=whole_years)
        .filter_map(|year| {
            let truncated = input.with_years(year as f64).ok()?;
            Some(GrowthPoint {
                year,
                net_value: calculate(&truncated).net_value,
            })
        })
        .collect()
}

fn schedule_years(years: f64) -> u32 {
    let whole = years.floor();
    if whole >= MAX_GROWTH_YEARS as f64 {
        if whole > MAX_GROWTH_YEARS as f64 {
            log::warn!("growth schedule for {} years truncated to {} years", years, MAX_GROWTH_YEARS);
        }
        return MAX_GROWTH_YEARS;
    }
    // Non-negative and below the cap here
    whole.max(0.0) as u32
}
