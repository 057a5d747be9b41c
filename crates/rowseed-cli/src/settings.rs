use std::path::Path;

use rowseed_generate::{Links, NULL_PROBABILITY, RelationshipKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BULK_SIZE: u64 = 1000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Run settings read from a TOML file. Command-line flags win over these.
///
/// ```toml
/// bulk_size = 500
/// seed = 7
/// default_relationship = "random-1-n"
///
/// [one_to_one]
/// citizens = ["ssns"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub bulk_size: u64,
    pub seed: Option<u64>,
    pub null_probability: f64,
    pub ignore_duplicates: bool,
    /// Kept as text so an unknown kind falls back with a warning instead of
    /// rejecting the whole file.
    pub default_relationship: String,
    pub one_to_one: Links,
    pub random_one_to_many: Links,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            bulk_size: DEFAULT_BULK_SIZE,
            seed: None,
            null_probability: NULL_PROBABILITY,
            ignore_duplicates: false,
            default_relationship: RelationshipKind::default().to_string(),
            one_to_one: Links::new(),
            random_one_to_many: Links::new(),
        }
    }
}

pub fn load_settings(path: &Path) -> Result<RunSettings, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

pub fn parse_settings(content: &str) -> Result<RunSettings, SettingsError> {
    Ok(toml::from_str(content)?)
}
