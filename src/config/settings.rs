//! User settings for Chorebook

use serde::{Deserialize, Serialize};

use super::paths::ChorebookPaths;
use crate::error::ChorebookError;

/// User settings, stored as `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Write create/update/delete records to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Run the overdue and recurrence sweeps at the start of every command
    #[serde(default = "default_true")]
    pub sweep_on_load: bool,

    /// Category given to chores created without one
    #[serde(default = "default_chore_category")]
    pub default_chore_category: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chore_category() -> String {
    "general".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            audit_enabled: true,
            sweep_on_load: true,
            default_chore_category: default_chore_category(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &ChorebookPaths) -> Result<Self, ChorebookError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ChorebookError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| ChorebookError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ChorebookPaths) -> Result<(), ChorebookError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ChorebookError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ChorebookError::Io(format!("Failed to write settings file: {}", e)))
    }
}
