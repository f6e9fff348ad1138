//! File I/O utilities with atomic writes

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ChorebookError;

/// Read JSON from a file, returning a default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, ChorebookError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        ChorebookError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ChorebookError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// The target is either completely replaced or left untouched.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), ChorebookError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChorebookError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory so the rename stays atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| ChorebookError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| ChorebookError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| ChorebookError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| ChorebookError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ChorebookError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
