//! Flat-file persistence for history and templates
//!
//! Records live in JSON arrays behind the `RecordStore` trait, so the
//! calculation core never touches file formats and tests can swap in
//! `MemoryStore`.

mod history;
mod templates;

pub use history::{History, HistoryEntry, NOTIFICATION_WINDOW_DAYS};
pub use templates::{Template, Templates};

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Default history file name inside the data directory
pub const HISTORY_FILE: &str = "history.json";

/// Default template file name inside the data directory
pub const TEMPLATES_FILE: &str = "templates.json";

/// Reads and writes an ordered list of records
pub trait RecordStore<T> {
    fn load(&self) -> Result<Vec<T>>;

    fn save(&self, records: &[T]) -> Result<()>;

    fn append(&self, record: T) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)
    }
}

/// Records kept as a pretty-printed JSON array; a missing file reads as empty
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonFileStore<T> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> for JsonFileStore<T> {
    fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn save(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        log::debug!("wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    records: RefCell<Vec<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
        }
    }
}

impl<T: Clone> RecordStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<Vec<T>> {
        Ok(self.records.borrow().clone())
    }

    fn save(&self, records: &[T]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }

    fn append(&self, record: T) -> Result<()> {
        self.records.borrow_mut().push(record);
        Ok(())
    }
}
