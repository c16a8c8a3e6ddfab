//! Interest engines: lump-sum compounding, ordinary annuities and growth schedules

mod input;
mod formula;
mod annuity;
mod growth;

pub use input::{CalculationInput, InputRecord, PaymentFrequency};
pub use formula::{calculate, compute_future_value, compute_net, CalculationResult, NetBreakdown};
pub use annuity::{compute_annuity_future_value, compute_annuity_result};
pub use growth::{yearly_growth, GrowthPoint, MAX_GROWTH_YEARS};

pub(crate) use formula::growth_factor;
