//! Atomic file operations for exports and caches.
//!
//! Writes go to a temp file next to the target, are synced to disk, then
//! renamed over the target, so readers never observe a half-written file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::sync::types::{SyncError, SyncResult};

/// Temp path used while writing `path` (`export.json` → `export.json.tmp`).
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file (same path with `.tmp` appended)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> SyncResult<()> {
    let temp_path = temp_path(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Serialize a value as pretty JSON and write it atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> SyncResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, &content)
}

/// Read and deserialize a JSON file.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, or a JSON error if
/// it cannot be parsed as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> SyncResult<T> {
    if !path.exists() {
        return Err(SyncError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.csv");

        atomic_write(&path, "line 1\nline 2\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "line 1\nline 2\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_json_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1);

        write_json(&path, &value).unwrap();
        let back: BTreeMap<String, i32> = read_json(&path).unwrap();
        assert_eq!(back, value);
        assert!(file_size(&path) > 0);
    }

    #[test]
    fn test_file_not_found() {
        let result: SyncResult<BTreeMap<String, i32>> = read_json(Path::new("/nonexistent/file.json"));
        assert!(matches!(result, Err(SyncError::FileNotFound(_))));
    }
}
