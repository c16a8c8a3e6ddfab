//! Batch runner: calculate every record of a batch file in order
//!
//! A malformed record fails on its own. Whether the rest of the batch still
//! runs is the caller's choice via `FailurePolicy`.

pub mod loader;

pub use loader::{load_entries, load_entries_from_reader, parse_entry, BatchSource, JsonFileSource};

use crate::error::{CalcError, Result};
use crate::interest::{calculate, CalculationInput, CalculationResult, PaymentFrequency};
use serde::Serialize;
use serde_json::Value;

/// What to do when a record cannot be calculated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and continue with the next record
    #[default]
    Skip,
    /// Stop at the first failure and return it
    Halt,
}

/// A successfully calculated record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub input: CalculationInput,
    pub result: CalculationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<PaymentFrequency>,
}

/// Per-record outcomes, in file order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Result<BatchItem>>,
}

impl BatchReport {
    pub fn items(&self) -> impl Iterator<Item = &BatchItem> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CalcError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn success_count(&self) -> usize {
        self.items().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Runs batches with shared default tax and fee rates
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    pub default_tax_rate: f64,
    pub default_fee_rate: f64,
    pub policy: FailurePolicy,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tax and fee rates applied to records that do not set their own
    pub fn with_default_rates(mut self, tax_rate: f64, fee_rate: f64) -> Self {
        self.default_tax_rate = tax_rate;
        self.default_fee_rate = fee_rate;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Calculate one raw record, failing fast on any problem
    pub fn run_entry(&self, index: usize, value: &Value) -> Result<BatchItem> {
        let input = parse_entry(index, value, self.default_tax_rate, self.default_fee_rate)?;
        Ok(BatchItem {
            index,
            input,
            result: calculate(&input),
            payment_frequency: input.payment_frequency(),
        })
    }

    /// Calculate every record from `source` in order
    ///
    /// Source-level problems (unreadable file, not an array) always fail the
    /// whole batch. Record-level problems follow the runner's policy.
    pub fn run<S: BatchSource + ?Sized>(&self, source: &S) -> Result<BatchReport> {
        let entries = source.read_entries()?;
        let mut report = BatchReport::default();

        for (index, value) in entries.iter().enumerate() {
            match self.run_entry(index, value) {
                Ok(item) => report.outcomes.push(Ok(item)),
                Err(e) if self.policy == FailurePolicy::Halt => return Err(e),
                Err(e) => {
                    log::warn!("skipping batch entry #{}: {}", index, e);
                    report.outcomes.push(Err(e));
                }
            }
        }

        log::info!(
            "batch complete: {} calculated, {} failed",
            report.success_count(),
            report.failure_count()
        );
        Ok(report)
    }
}

/// Calculate already-validated inputs in order
pub fn run_inputs(inputs: &[CalculationInput]) -> Vec<CalculationResult> {
    inputs.iter().map(calculate).collect()
}
