//! Read batch files: a JSON array of calculation records

use crate::error::{CalcError, Result};
use crate::interest::{CalculationInput, InputRecord};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Anything that can supply raw batch records in order
pub trait BatchSource {
    fn read_entries(&self) -> Result<Vec<Value>>;
}

/// Batch records stored in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSource for JsonFileSource {
    fn read_entries(&self) -> Result<Vec<Value>> {
        let file = File::open(&self.path)?;
        load_entries_from_reader(BufReader::new(file))
    }
}

/// Records already held in memory
impl BatchSource for Vec<Value> {
    fn read_entries(&self) -> Result<Vec<Value>> {
        Ok(self.clone())
    }
}

/// Parse a batch document from any reader (e.g., string buffer, network stream)
///
/// Only the document structure is checked here; each record is validated
/// separately by `parse_entry` so one bad record cannot hide the rest.
pub fn load_entries_from_reader<R: Read>(reader: R) -> Result<Vec<Value>> {
    match serde_json::from_reader(reader)? {
        Value::Array(entries) => Ok(entries),
        other => Err(CalcError::invalid(
            "batch",
            format!("expected a JSON array of records, found {}", json_kind(&other)),
        )),
    }
}

/// Load raw batch records from a JSON file
pub fn load_entries<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    JsonFileSource::new(path).read_entries()
}

/// Turn record `index` into a validated input
///
/// Tax and fee rates missing from the record fall back to the given defaults.
pub fn parse_entry(index: usize, value: &Value, default_tax_rate: f64, default_fee_rate: f64) -> Result<CalculationInput> {
    let record: InputRecord = serde_json::from_value(value.clone()).map_err(|e| CalcError::MalformedBatchEntry {
        index,
        reason: e.to_string(),
    })?;

    record
        .with_default_rates(default_tax_rate, default_fee_rate)
        .try_into()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_load_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"principal": 1000, "rate": 5, "time": 2, "compounds_per_year": 12}}, {{"rate": "oops"}}]"#
        )
        .unwrap();

        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let err = load_entries_from_reader(r#"{"principal": 1}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { field: "batch", .. }));

        let err = load_entries_from_reader("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, CalcError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_entries("/definitely/not/here/batch.json").unwrap_err();
        assert!(matches!(err, CalcError::Io(_)));
    }

    #[test]
    fn test_parse_entry_defaults() {
        let value = json!({"principal": 500, "rate": 4, "time": 1});
        let input = parse_entry(0, &value, 15.0, 0.25).unwrap();
        assert_eq!(input.compounds_per_year(), 1);
        assert_eq!(input.tax_rate(), 15.0);
        assert_eq!(input.fee_rate(), 0.25);

        let value = json!({"principal": 500, "rate": 4, "time": 1, "tax_rate": 0});
        assert_eq!(parse_entry(0, &value, 15.0, 0.0).unwrap().tax_rate(), 0.0);
    }

    #[test]
    fn test_parse_entry_errors() {
        let missing_rate = json!({"principal": 500, "time": 1});
        assert!(matches!(
            parse_entry(4, &missing_rate, 0.0, 0.0),
            Err(CalcError::MalformedBatchEntry { index: 4, .. })
        ));

        let wrong_type = json!({"principal": 500, "rate": 4, "time": "ten"});
        assert!(matches!(
            parse_entry(3, &wrong_type, 0.0, 0.0),
            Err(CalcError::MalformedBatchEntry { index: 3, .. })
        ));

        let negative_principal = json!({"principal": -500, "rate": 4, "time": 1});
        assert!(matches!(
            parse_entry(2, &negative_principal, 0.0, 0.0),
            Err(CalcError::InvalidInput { field: "principal", .. })
        ));
    }

    #[test]
    fn test_parse_entry_rejects_bad_frequency_as_invalid_input() {
        for frequency in [json!(2.5), json!(-12), json!(0)] {
            let value = json!({"principal": 500, "rate": 4, "time": 1, "compounds_per_year": frequency.clone()});
            assert!(
                matches!(
                    parse_entry(1, &value, 0.0, 0.0),
                    Err(CalcError::InvalidInput { field: "compounds_per_year", .. })
                ),
                "compounds_per_year = {}",
                frequency
            );
        }

        let whole_float = json!({"principal": 500, "rate": 4, "time": 1, "compounds_per_year": 4.0});
        assert_eq!(parse_entry(0, &whole_float, 0.0, 0.0).unwrap().compounds_per_year(), 4);
    }
}
