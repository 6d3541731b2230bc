//! Durable JSON storage helpers
//!
//! Every record under the state directory is written atomically: the
//! content goes to a temporary file in the same directory, which is then
//! renamed over the target. Readers never observe a half-written record.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{BundleError, Result, file_read_failed, file_write_failed};

/// Atomically replace `path` with `content`
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .map_err(|e| file_write_failed(dir.display().to_string(), e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| file_write_failed(dir.display().to_string(), e.to_string()))?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| file_write_failed(tmp.path().display().to_string(), e.to_string()))?;

    tmp.persist(path)
        .map_err(|e| file_write_failed(path.display().to_string(), e.error.to_string()))?;
    Ok(())
}

/// Pretty JSON bytes with a trailing newline
pub fn json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    Ok(content)
}

/// Serialize `value` as pretty JSON and write it atomically
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &json_bytes(value)?)
}

/// Read a JSON record, `None` when the file does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(file_read_failed(path.display().to_string(), e.to_string())),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| BundleError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Remove a file, succeeding when it is already gone
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(file_write_failed(path.display().to_string(), e.to_string())),
    }
}
