//! Compound Interest - lump-sum and regular-savings projections
//!
//! This library provides:
//! - Future value of lump sums and ordinary annuities, net of tax and fees
//! - Monte Carlo simulation over randomized annual rates
//! - Goal seeking for principal, duration or rate
//! - Scenario comparison and batch runs from JSON files
//! - Flat-file history, templates and CSV export

pub mod error;
pub mod interest;
pub mod simulation;
pub mod goal;
pub mod scenario;
pub mod batch;
pub mod store;
pub mod config;
pub mod report;

// Re-export commonly used types
pub use error::{CalcError, Result};
pub use interest::{calculate, CalculationInput, CalculationResult, PaymentFrequency};
pub use simulation::{MonteCarloSimulator, SimulationConfig, SimulationRun};
pub use goal::{GoalSolution, GoalSpec};
pub use scenario::{ScenarioOutcome, ScenarioSet};
pub use batch::BatchRunner;
pub use config::AppConfig;
