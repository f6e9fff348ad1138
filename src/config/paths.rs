//! Path management for Chorebook
//!
//! ## Path Resolution Order
//!
//! 1. `CHOREBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `chorebook`
//!    (`~/.config/chorebook` on Linux, `%APPDATA%\chorebook\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ChorebookError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CHOREBOOK_DATA_DIR";

/// Manages all paths used by Chorebook
#[derive(Debug, Clone)]
pub struct ChorebookPaths {
    base_dir: PathBuf,
}

impl ChorebookPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ChorebookError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "chorebook")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    ChorebookError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Use a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    pub fn households_file(&self) -> PathBuf {
        self.data_dir().join("households.json")
    }

    pub fn chores_file(&self) -> PathBuf {
        self.data_dir().join("chores.json")
    }

    pub fn missed_tasks_file(&self) -> PathBuf {
        self.data_dir().join("missed_tasks.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn alerts_file(&self) -> PathBuf {
        self.data_dir().join("alerts.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), ChorebookError> {
        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| ChorebookError::Io(format!("Failed to create data directory: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.expenses_file(),
            temp_dir.path().join("data").join("expenses.json")
        );
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ChorebookPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
    }
}
