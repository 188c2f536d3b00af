//! qsheet - a hierarchical study sheet tracker
//!
//! This crate provides the core functionality for the `qsheet` CLI tool:
//! topics hold subtopics and questions, subtopics hold questions, and every
//! question tracks its solve status, difficulty, platform and notes.
//!
//! # Architecture
//!
//! - [`model`] - Normalized entity tables (`SheetState`) and entity types
//! - [`store`] - The mutation API that keeps the tables consistent
//! - [`view`] - Filtering, auto-expansion, progress and statistics
//! - [`storage`] - SQLite slot persistence and audit events
//! - [`workspace`] - A store bound to its persistence slot
//! - [`sync`] - Seeding (file, bundled, remote) and JSON/CSV export
//! - [`config`] - Path resolution and the UI cache
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod sync;
pub mod validate;
pub mod view;
pub mod workspace;

pub use error::{Error, Result};

/// Global silent mode flag for `--silent` output.
///
/// When set, create/mutate commands print only the ID instead of full
/// output. Avoids threading a `silent` bool through every handler signature.
pub static SILENT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Global CSV output flag (set when `--format csv`).
pub static CSV_OUTPUT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if silent mode is active.
#[inline]
pub fn is_silent() -> bool {
    SILENT.load(std::sync::atomic::Ordering::Relaxed)
}

/// Check if CSV output is requested.
#[inline]
pub fn is_csv() -> bool {
    CSV_OUTPUT.load(std::sync::atomic::Ordering::Relaxed)
}

/// Escape a value for CSV output (wrap in quotes if it contains commas, quotes, or newlines).
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        csv_quote(s)
    } else {
        s.to_string()
    }
}

/// Quote a CSV cell unconditionally, doubling embedded quotes.
#[must_use]
pub fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_quote_always_quotes() {
        assert_eq!(csv_quote("plain"), "\"plain\"");
        assert_eq!(csv_quote(""), "\"\"");
    }
}
