//! Error types shared by every calculation component

use thiserror::Error;

/// Errors surfaced by the calculation core and its file collaborators
#[derive(Debug, Error)]
pub enum CalcError {
    /// A parameter is outside its permitted domain
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A goal cannot be reached under the given constraints
    #[error("goal cannot be solved: {0}")]
    Unsolvable(String),

    /// A batch record is missing fields or has the wrong types
    #[error("malformed batch entry #{index}: {reason}")]
    MalformedBatchEntry { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Reject NaN and infinities before any other range check
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, format!("must be a finite number, got {}", value)))
    }
}

/// Require `value >= 0`
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(value)
}

/// Require at least one compounding period per year
pub(crate) fn ensure_frequency(compounds_per_year: u32) -> Result<u32> {
    if compounds_per_year == 0 {
        return Err(CalcError::invalid(
            "compounds_per_year",
            "must be at least 1 period per year",
        ));
    }
    Ok(compounds_per_year)
}
