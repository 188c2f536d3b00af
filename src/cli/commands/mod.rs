//! Command implementations.
//!
//! Every command that touches the sheet goes through [`open_sheet`], which
//! loads the slot and reattaches the cached UI state. Store operations that
//! miss their target are turned into typed not-found errors by [`rejected`].

pub mod completions;
pub mod export;
pub mod history;
pub mod init;
pub mod list;
pub mod question;
pub mod sheet;
pub mod stats;
pub mod subtopic;
pub mod topic;
pub mod version;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{
    default_actor, read_ui_cache, resolve_api_base, resolve_db_path, ui_cache_path, write_ui_cache,
};
use crate::error::{Error, Result};
use crate::model::SheetState;
use crate::storage::SqliteStorage;
use crate::sync::{SeedStats, SheetClient, seed_bundled, seed_from_file};
use crate::workspace::{SLOT_NAME, Workspace};

/// A sheet opened from the database, plus where its UI cache lives.
pub(crate) struct OpenSheet {
    pub workspace: Workspace,
    ui_cache: PathBuf,
}

impl OpenSheet {
    /// Persist the UI state (expansion, active question) for the next run.
    pub(crate) fn save_ui(&self) {
        if !write_ui_cache(&self.ui_cache, self.workspace.ui()) {
            warn!(path = %self.ui_cache.display(), "Could not write UI cache");
        }
    }

    pub(crate) fn sheet(&self) -> &SheetState {
        self.workspace.sheet()
    }
}

/// Resolve the actor for audit events.
pub(crate) fn resolve_actor(actor: Option<&str>) -> String {
    actor.map(ToString::to_string).unwrap_or_else(default_actor)
}

/// Open the stored sheet.
///
/// # Errors
///
/// Returns `NotInitialized` if the database does not exist yet.
pub(crate) fn open_sheet(db_path: Option<&PathBuf>, actor: Option<&str>) -> Result<OpenSheet> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let storage = SqliteStorage::open(&db_path)?;
    let mut workspace = Workspace::open(storage, SLOT_NAME, &resolve_actor(actor))?;

    let ui_cache = ui_cache_path(&db_path);
    if let Some(ui) = read_ui_cache(&ui_cache) {
        workspace.restore_ui(ui);
    }

    Ok(OpenSheet { workspace, ui_cache })
}

/// Produce a seeded snapshot from a file, a remote slug or the bundled sample.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the fetch fails.
pub(crate) fn load_seed(file: Option<&Path>, slug: Option<&str>) -> Result<(SheetState, SeedStats)> {
    let seeded = match (file, slug) {
        (Some(path), _) => seed_from_file(path)?,
        (None, Some(slug)) => SheetClient::new(resolve_api_base()).fetch_sheet_blocking(slug)?,
        (None, None) => seed_bundled()?,
    };
    Ok(seeded)
}

/// Log a rejected store operation and pass the error through.
pub(crate) fn rejected(op: &str, err: Error) -> Error {
    warn!(op, error = %err, "Operation rejected");
    err
}

/// First 8 characters of an ID, for display.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Treat an empty string as "clear the field".
pub(crate) fn clearable(value: Option<&String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    })
}

/// Treat a list of only empty strings as "clear the field".
pub(crate) fn clearable_list(values: Option<&Vec<String>>) -> Option<Option<Vec<String>>> {
    values.map(|vs| {
        let vs: Vec<String> = vs
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        (!vs.is_empty()).then_some(vs)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_clearable() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some(&String::new())), Some(None));
        assert_eq!(clearable(Some(&" x ".to_string())), Some(Some("x".to_string())));

        assert_eq!(clearable_list(Some(&vec![String::new()])), Some(None));
        assert_eq!(
            clearable_list(Some(&vec!["dp".to_string(), " ".to_string()])),
            Some(Some(vec!["dp".to_string()]))
        );
    }
}
