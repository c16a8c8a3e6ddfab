//! Summary statistics over simulated outcomes

use serde::{Deserialize, Serialize};

/// Standard percentiles reported for every simulation
pub mod standard {
    pub const P10: f64 = 0.10;
    pub const P50: f64 = 0.50;
    pub const P90: f64 = 0.90;
}

/// Distribution summary of a set of outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub median: f64,
    pub p90: f64,
}

impl SummaryStats {
    /// Summarize `values`; `None` when empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p10: percentile_of_sorted(&sorted, standard::P10),
            median: percentile_of_sorted(&sorted, standard::P50),
            p90: percentile_of_sorted(&sorted, standard::P90),
        })
    }
}

/// Percentile `p` (0..=1) of an ascending slice, interpolating between closest ranks
///
/// Returns NaN for an empty slice.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let rank = p.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Percentile `p` (0..=1) of unsorted values
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_of_known_values() {
        let stats = SummaryStats::from_values(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.mean, 3.0);
        assert_relative_eq!(stats.std_dev, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(stats.p10, 1.4, epsilon = 1e-12);
        assert_relative_eq!(stats.p90, 4.6, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_has_no_summary() {
        assert!(SummaryStats::from_values(&[]).is_none());
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_percentile_bounds() {
        let values = [10.0, 30.0, 20.0];
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 1.0), 30.0);
        assert_eq!(percentile(&values, 0.5), 20.0);
        assert_eq!(percentile(&values, 1.5), 30.0);
        assert_eq!(percentile(&[7.0], 0.9), 7.0);
    }
}
