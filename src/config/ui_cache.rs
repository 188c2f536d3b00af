//! UI state cache between CLI invocations.
//!
//! Expansion toggles, the active question and the rename target are
//! ephemeral: they never enter the snapshot slot. The CLI keeps them in a
//! small JSON file next to the database so `list` remembers what was
//! expanded. The cache is best-effort; a missing or corrupted file just
//! means a fresh [`UiState`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::store::UiState;
use crate::sync::write_json;

/// Read the UI cache.
///
/// Returns `None` if the file doesn't exist or cannot be parsed.
pub fn read_ui_cache(path: &Path) -> Option<UiState> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring corrupted UI cache");
            None
        }
    }
}

/// Write the UI cache atomically.
///
/// Returns `true` if the cache was written successfully.
pub fn write_ui_cache(path: &Path, state: &UiState) -> bool {
    match write_json(path, state) {
        Ok(()) => true,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to write UI cache");
            false
        }
    }
}

/// Remove the UI cache.
///
/// Returns `true` if the cache is gone afterwards.
pub fn clear_ui_cache(path: &Path) -> bool {
    if path.exists() {
        fs::remove_file(path).is_ok()
    } else {
        true // Already clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui-state.json");

        let mut state = UiState::default();
        state.set_expanded("t1", true);
        state.active_question_id = Some("q1".to_string());

        assert!(write_ui_cache(&path, &state));
        assert_eq!(read_ui_cache(&path), Some(state));
    }

    #[test]
    fn test_missing_and_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui-state.json");
        assert_eq!(read_ui_cache(&path), None);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(read_ui_cache(&path), None);
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui-state.json");
        assert!(clear_ui_cache(&path));

        assert!(write_ui_cache(&path, &UiState::default()));
        assert!(clear_ui_cache(&path));
        assert!(!path.exists());
    }
}
