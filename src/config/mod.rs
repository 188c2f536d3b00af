//! Configuration management.
//!
//! This module resolves where qsheet keeps its data and which remote API it
//! seeds from. Everything lives under a single global directory:
//!
//! - **Database**: `~/.qsheet/data/qsheet.db` (one slot holds the sheet)
//! - **UI cache**: `ui-state.json` next to the database, holding expansion
//!   toggles and the active question between invocations

mod ui_cache;

pub use ui_cache::{clear_ui_cache, read_ui_cache, write_ui_cache};

use std::path::{Path, PathBuf};

/// Default endpoint for remote sheet seeding. The slug is appended as a path
/// segment.
pub const DEFAULT_API_BASE: &str =
    "https://node.codolio.com/api/question-tracker/v1/sheet/public/get-sheet-by-slug";

/// Get the global qsheet directory location (`~/.qsheet/`).
#[must_use]
pub fn global_qsheet_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".qsheet"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `QSHEET_TEST_DB=1` (or any non-empty
/// value other than `0`/`false`). This redirects all database operations to
/// an isolated test database.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("QSHEET_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path (`~/.qsheet/test/qsheet.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_qsheet_dir().map(|dir| dir.join("test").join("qsheet.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` flag or `QSHEET_DB`), use it
/// 2. `QSHEET_TEST_DB` environment variable → uses test database
/// 3. Global location: `~/.qsheet/data/qsheet.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no home directory
/// can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_qsheet_dir().map(|dir| dir.join("data").join("qsheet.db"))
}

/// Resolve the remote API base.
///
/// `QSHEET_API_BASE` overrides [`DEFAULT_API_BASE`]; a trailing slash is
/// dropped.
#[must_use]
pub fn resolve_api_base() -> String {
    std::env::var("QSHEET_API_BASE")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Path of the UI cache file that belongs to a database.
#[must_use]
pub fn ui_cache_path(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("ui-state.json")
}

/// Get the default actor name recorded on audit events.
///
/// Priority:
/// 1. `QSHEET_ACTOR` environment variable
/// 2. System username
/// 3. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var("QSHEET_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(user) = std::env::var("USER") {
        if !user.is_empty() {
            return user;
        }
    }

    "unknown".to_string()
}
