//! Side-by-side scenario comparison
//!
//! Each scenario is calculated independently; output keeps the input order
//! and labels.

use crate::error::Result;
use crate::interest::{calculate, CalculationInput, CalculationResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// A labelled input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    #[serde(flatten)]
    pub input: CalculationInput,
}

/// A labelled input with its result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub input: CalculationInput,
    pub result: CalculationResult,
}

/// Ordered collection of scenarios to compare
///
/// # Example
/// ```
/// use compound_interest::{CalculationInput, ScenarioSet};
///
/// let mut set = ScenarioSet::new();
/// for rate in [3.0, 4.0, 5.0] {
///     let input = CalculationInput::lump_sum(10_000.0, rate, 10.0, 12).unwrap();
///     set.push(format!("{}%", rate), input);
/// }
/// let outcomes = set.compare();
/// assert_eq!(outcomes.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Load a JSON array of `{ "label": .., <input fields> }` objects
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn push(&mut self, label: impl Into<String>, input: CalculationInput) {
        self.scenarios.push(Scenario {
            label: label.into(),
            input,
        });
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Calculate every scenario, preserving order
    pub fn compare(&self) -> Vec<ScenarioOutcome> {
        compare(&self.scenarios)
    }
}

/// Calculate each labelled input independently, preserving order
pub fn compare(scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
    scenarios
        .iter()
        .map(|scenario| ScenarioOutcome {
            label: scenario.label.clone(),
            input: scenario.input,
            result: calculate(&scenario.input),
        })
        .collect()
}

/// Outcome with the highest net value, first one wins ties
pub fn best_by_net_value(outcomes: &[ScenarioOutcome]) -> Option<&ScenarioOutcome> {
    outcomes.iter().fold(None, |best, outcome| match best {
        Some(current) if current.result.net_value >= outcome.result.net_value => Some(current),
        _ => Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_ladder() -> ScenarioSet {
        let mut set = ScenarioSet::new();
        for rate in [5.0, 3.0, 4.0] {
            let input = CalculationInput::lump_sum(10_000.0, rate, 10.0, 12).unwrap();
            set.push(format!("rate {}", rate), input);
        }
        set
    }

    #[test]
    fn test_compare_preserves_order_and_count() {
        let set = rate_ladder();
        let outcomes = set.compare();

        assert_eq!(outcomes.len(), set.len());
        for (scenario, outcome) in set.scenarios().iter().zip(&outcomes) {
            assert_eq!(scenario.label, outcome.label);
            assert_eq!(scenario.input, outcome.input);
        }
    }

    #[test]
    fn test_each_scenario_matches_single_calculation() {
        let set = rate_ladder();
        for outcome in set.compare() {
            assert_eq!(outcome.result, calculate(&outcome.input));
        }
    }

    #[test]
    fn test_empty_set() {
        assert!(ScenarioSet::new().compare().is_empty());
        assert!(best_by_net_value(&[]).is_none());
    }

    #[test]
    fn test_best_by_net_value() {
        let outcomes = rate_ladder().compare();
        assert_eq!(best_by_net_value(&outcomes).unwrap().label, "rate 5");
    }

    #[test]
    fn test_mixed_lump_sum_and_savings_from_json() {
        let json = r#"[
            {"label": "lump", "principal": 10000, "rate": 5, "time": 10, "compounds_per_year": 12},
            {"label": "monthly saver", "payment": 100, "rate": 5, "time": 10, "compounds_per_year": 12, "fee_rate": 0.5}
        ]"#;
        let set = ScenarioSet::from_reader(json.as_bytes()).unwrap();
        let outcomes = set.compare();

        assert_eq!(outcomes[0].label, "lump");
        assert!(!outcomes[0].input.is_regular_savings());
        assert_eq!(outcomes[1].label, "monthly saver");
        assert!(outcomes[1].input.is_regular_savings());
        assert_eq!(outcomes[1].input.fee_rate(), 0.5);
    }
}
