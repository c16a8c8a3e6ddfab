//! Application configuration (display currency)

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::debug!("no config at {} ({}); using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "invalid JSON in {} ({}); using default currency {}",
                    path.display(),
                    e,
                    DEFAULT_CURRENCY
                );
                Self::default()
            }
        }
    }
}
