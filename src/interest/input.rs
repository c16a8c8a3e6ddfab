//! Validated calculation inputs
//!
//! `CalculationInput` is the single parameter set every engine consumes. It is
//! immutable once built: the constructors validate, and the `with_*` methods
//! return new values rather than mutating.

use crate::error::{ensure_finite, ensure_frequency, ensure_non_negative, CalcError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// How often regular-savings payments are made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// One payment per compounding period at a non-standard frequency
    PerCompound,
}

impl PaymentFrequency {
    /// Map a compounding frequency onto the matching payment frequency
    pub fn from_compounds(compounds_per_year: u32) -> Self {
        match compounds_per_year {
            52 => PaymentFrequency::Weekly,
            12 => PaymentFrequency::Monthly,
            4 => PaymentFrequency::Quarterly,
            1 => PaymentFrequency::Yearly,
            _ => PaymentFrequency::PerCompound,
        }
    }

    /// Payments per year, `None` for `PerCompound`
    pub fn periods_per_year(self) -> Option<u32> {
        match self {
            PaymentFrequency::Weekly => Some(52),
            PaymentFrequency::Monthly => Some(12),
            PaymentFrequency::Quarterly => Some(4),
            PaymentFrequency::Yearly => Some(1),
            PaymentFrequency::PerCompound => None,
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Yearly => "yearly",
            PaymentFrequency::PerCompound => "per_compound",
        };
        f.write_str(label)
    }
}

/// Raw, unvalidated record as found in batch, template and history files
///
/// Field names follow the batch file format. Converting into a
/// `CalculationInput` performs all validation, so `compounds_per_year` is
/// read as a plain number and checked there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(default)]
    pub principal: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub payment: f64,
    pub rate: f64,
    pub time: f64,
    #[serde(default = "default_compounds_per_year", serialize_with = "serialize_whole")]
    pub compounds_per_year: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<f64>,
    /// Explicit payment frequency label for savings plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<PaymentFrequency>,
}

fn default_compounds_per_year() -> f64 { 1.0 }

/// Write whole numbers without a fractional part
fn serialize_whole<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(value) {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl InputRecord {
    /// Fill in tax and fee rates that the record itself does not specify
    pub fn with_default_rates(mut self, tax_rate: f64, fee_rate: f64) -> Self {
        self.tax_rate.get_or_insert(tax_rate);
        self.fee_rate.get_or_insert(fee_rate);
        self
    }
}

/// Parameters of a single compound-interest calculation
///
/// Rates are percentages (`5.0` means 5%). A positive `payment` turns the
/// input into a regular-savings plan; the principal is then ignored by the
/// engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InputRecord", into = "InputRecord")]
pub struct CalculationInput {
    principal: f64,
    payment: f64,
    annual_rate: f64,
    years: f64,
    compounds_per_year: u32,
    tax_rate: f64,
    fee_rate: f64,
    payment_frequency: Option<PaymentFrequency>,
}

impl CalculationInput {
    /// One-off investment of `principal`
    pub fn lump_sum(principal: f64, annual_rate: f64, years: f64, compounds_per_year: u32) -> Result<Self> {
        Ok(Self {
            principal: ensure_non_negative("principal", principal)?,
            payment: 0.0,
            annual_rate: validate_rate(annual_rate)?,
            years: ensure_non_negative("years", years)?,
            compounds_per_year: ensure_frequency(compounds_per_year)?,
            tax_rate: 0.0,
            fee_rate: 0.0,
            payment_frequency: None,
        })
    }

    /// `payment` contributed at the end of every compounding period
    pub fn regular_savings(payment: f64, annual_rate: f64, years: f64, compounds_per_year: u32) -> Result<Self> {
        let mut input = Self::lump_sum(0.0, annual_rate, years, compounds_per_year)?;
        input.payment = ensure_non_negative("payment", payment)?;
        Ok(input)
    }

    /// Tax on gains, clamped to [0, 100]
    pub fn with_tax_rate(mut self, tax_rate: f64) -> Result<Self> {
        self.tax_rate = clamp_percent("tax_rate", tax_rate)?;
        Ok(self)
    }

    /// Fee on total value, clamped to [0, 100]
    pub fn with_fee_rate(mut self, fee_rate: f64) -> Result<Self> {
        self.fee_rate = clamp_percent("fee_rate", fee_rate)?;
        Ok(self)
    }

    /// Label the payment frequency instead of inferring it from the compounding frequency
    ///
    /// Only a label: payments are still made once per compounding period.
    pub fn with_payment_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.payment_frequency = Some(frequency);
        self
    }

    /// Same input at a different annual rate
    pub fn with_annual_rate(mut self, annual_rate: f64) -> Result<Self> {
        self.annual_rate = validate_rate(annual_rate)?;
        Ok(self)
    }

    /// Same input over a different duration
    pub fn with_years(mut self, years: f64) -> Result<Self> {
        self.years = ensure_non_negative("years", years)?;
        Ok(self)
    }

    pub fn principal(&self) -> f64 { self.principal }
    pub fn payment(&self) -> f64 { self.payment }
    pub fn annual_rate(&self) -> f64 { self.annual_rate }
    pub fn years(&self) -> f64 { self.years }
    pub fn compounds_per_year(&self) -> u32 { self.compounds_per_year }
    pub fn tax_rate(&self) -> f64 { self.tax_rate }
    pub fn fee_rate(&self) -> f64 { self.fee_rate }

    pub fn is_regular_savings(&self) -> bool {
        self.payment > 0.0
    }

    /// Payment frequency of a savings plan: the explicit label if set, else
    /// the one implied by the compounding frequency
    pub fn payment_frequency(&self) -> Option<PaymentFrequency> {
        self.is_regular_savings().then(|| {
            self.payment_frequency
                .unwrap_or_else(|| PaymentFrequency::from_compounds(self.compounds_per_year))
        })
    }

    /// Total number of compounding periods, `n × t`
    pub fn total_periods(&self) -> f64 {
        self.compounds_per_year as f64 * self.years
    }

    /// Money put in by the investor: the principal, or every payment for savings plans
    pub fn total_contributed(&self) -> f64 {
        if self.is_regular_savings() {
            self.payment * self.total_periods()
        } else {
            self.principal
        }
    }
}

impl TryFrom<InputRecord> for CalculationInput {
    type Error = CalcError;

    fn try_from(record: InputRecord) -> Result<Self> {
        let compounds_per_year = whole_frequency(record.compounds_per_year)?;
        let base = if record.payment > 0.0 {
            if record.principal > 0.0 {
                log::debug!(
                    "record has both principal {} and payment {}; treating as regular savings",
                    record.principal,
                    record.payment
                );
            }
            Self::regular_savings(record.payment, record.rate, record.time, compounds_per_year)?
        } else {
            ensure_non_negative("payment", record.payment)?;
            Self::lump_sum(record.principal, record.rate, record.time, compounds_per_year)?
        };

        let mut input = base
            .with_tax_rate(record.tax_rate.unwrap_or(0.0))?
            .with_fee_rate(record.fee_rate.unwrap_or(0.0))?;
        match record.payment_frequency {
            Some(frequency) if input.is_regular_savings() => input = input.with_payment_frequency(frequency),
            Some(frequency) => log::debug!("ignoring payment frequency {} on a lump sum", frequency),
            None => {}
        }
        Ok(input)
    }
}

impl From<CalculationInput> for InputRecord {
    fn from(input: CalculationInput) -> Self {
        Self {
            principal: input.principal,
            payment: input.payment,
            rate: input.annual_rate,
            time: input.years,
            compounds_per_year: input.compounds_per_year as f64,
            tax_rate: Some(input.tax_rate),
            fee_rate: Some(input.fee_rate),
            payment_frequency: input.payment_frequency,
        }
    }
}

/// Compounding frequency from a raw record: a whole number of at least 1
fn whole_frequency(value: f64) -> Result<u32> {
    let value = ensure_finite("compounds_per_year", value)?;
    if value.fract() != 0.0 {
        return Err(CalcError::invalid(
            "compounds_per_year",
            format!("must be a whole number of periods, got {}", value),
        ));
    }
    if value < 1.0 || value > u32::MAX as f64 {
        return Err(CalcError::invalid(
            "compounds_per_year",
            format!("must be between 1 and {} periods per year, got {}", u32::MAX, value),
        ));
    }
    ensure_frequency(value as u32)
}

fn validate_rate(annual_rate: f64) -> Result<f64> {
    ensure_non_negative("rate", annual_rate)
}

fn clamp_percent(field: &'static str, value: f64) -> Result<f64> {
    let value = ensure_finite(field, value)?;
    let clamped = value.clamp(0.0, 100.0);
    if clamped != value {
        log::warn!("{} of {}% clamped to {}%", field, value, clamped);
    }
    Ok(clamped)
}
