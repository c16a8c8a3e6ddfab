//! Calculation history, target-date notifications and CSV export

use super::RecordStore;
use crate::error::Result;
use crate::interest::{CalculationInput, CalculationResult};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Days ahead of today that a target date triggers a notification
pub const NOTIFICATION_WINDOW_DAYS: u64 = 7;

/// One saved calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub input: CalculationInput,
    pub result: CalculationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub timestamp: NaiveDateTime,
}

impl HistoryEntry {
    pub fn kind(&self) -> &'static str {
        if self.input.is_regular_savings() {
            "Regular Savings"
        } else {
            "Lump Sum"
        }
    }
}

/// Flat row written to CSV exports
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: u64,
    kind: &'a str,
    principal: f64,
    payment: f64,
    payment_frequency: Option<String>,
    rate: f64,
    time: f64,
    compounds_per_year: u32,
    tax_rate: f64,
    fee_rate: f64,
    future_value: f64,
    net_value: f64,
    net_interest: f64,
    target_date: Option<NaiveDate>,
    timestamp: NaiveDateTime,
}

impl<'a> From<&'a HistoryEntry> for CsvRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind(),
            principal: entry.input.principal(),
            payment: entry.input.payment(),
            payment_frequency: entry.input.payment_frequency().map(|f| f.to_string()),
            rate: entry.input.annual_rate(),
            time: entry.input.years(),
            compounds_per_year: entry.input.compounds_per_year(),
            tax_rate: entry.input.tax_rate(),
            fee_rate: entry.input.fee_rate(),
            future_value: entry.result.future_value,
            net_value: entry.result.net_value,
            net_interest: entry.result.net_interest(),
            target_date: entry.target_date,
            timestamp: entry.timestamp,
        }
    }
}

/// History log on top of any record store
#[derive(Debug)]
pub struct History<S> {
    store: S,
}

impl<S: RecordStore<HistoryEntry>> History<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a calculation, assigning the next id
    pub fn record(
        &self,
        input: CalculationInput,
        result: CalculationResult,
        target_date: Option<NaiveDate>,
        timestamp: NaiveDateTime,
    ) -> Result<HistoryEntry> {
        let mut entries = self.store.load()?;
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let entry = HistoryEntry {
            id,
            input,
            result,
            target_date,
            timestamp,
        };
        entries.push(entry.clone());
        self.store.save(&entries)?;
        log::debug!("saved history entry {}", id);
        Ok(entry)
    }

    /// Every entry, newest first
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.store.load()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Entries whose target date falls within the next week, inclusive of today
    pub fn notifications(&self, today: NaiveDate) -> Result<Vec<HistoryEntry>> {
        let horizon = today
            .checked_add_days(Days::new(NOTIFICATION_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);

        Ok(self
            .store
            .load()?
            .into_iter()
            .filter(|e| e.target_date.is_some_and(|d| d >= today && d <= horizon))
            .collect())
    }

    /// Write the history to `path` as CSV, newest first; returns the row count
    ///
    /// Nothing is written when the history is empty.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let entries = self.entries()?;
        if entries.is_empty() {
            log::info!("no history to export");
            return Ok(0);
        }

        let mut writer = csv::Writer::from_path(path)?;
        for entry in &entries {
            writer.serialize(CsvRow::from(entry))?;
        }
        writer.flush()?;
        Ok(entries.len())
    }
}
