//! Monte Carlo simulation over randomized interest rates

mod monte_carlo;
pub mod stats;

pub use monte_carlo::{
    simulate, MonteCarloSimulator, RateDistribution, SimulationConfig, SimulationRun, Trial,
    DEFAULT_RELATIVE_VOLATILITY, DEFAULT_SEED, DEFAULT_TRIALS,
};
pub use stats::SummaryStats;
