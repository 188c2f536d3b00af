//! Error types for the qsheet CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::model::IntegrityViolation;
use crate::sync::SyncError;

/// Result type alias for qsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,
    IntegrityError,

    // Not Found (exit 3)
    TopicNotFound,
    SubTopicNotFound,
    QuestionNotFound,
    ParentNotFound,
    AmbiguousId,

    // Validation (exit 4)
    InvalidStatus,
    InvalidDifficulty,
    InvalidArgument,
    IndexOutOfRange,

    // Sync (exit 6)
    SyncError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::IntegrityError => "INTEGRITY_ERROR",
            Self::TopicNotFound => "TOPIC_NOT_FOUND",
            Self::SubTopicNotFound => "SUBTOPIC_NOT_FOUND",
            Self::QuestionNotFound => "QUESTION_NOT_FOUND",
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::AmbiguousId => "AMBIGUOUS_ID",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidDifficulty => "INVALID_DIFFICULTY",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            Self::SyncError => "SYNC_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::DatabaseError
            | Self::IntegrityError => 2,
            Self::TopicNotFound
            | Self::SubTopicNotFound
            | Self::QuestionNotFound
            | Self::ParentNotFound
            | Self::AmbiguousId => 3,
            Self::InvalidStatus
            | Self::InvalidDifficulty
            | Self::InvalidArgument
            | Self::IndexOutOfRange => 4,
            Self::SyncError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True for validation errors and ambiguous IDs. False for not-found,
    /// I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatus
                | Self::InvalidDifficulty
                | Self::InvalidArgument
                | Self::IndexOutOfRange
                | Self::AmbiguousId
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in qsheet operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `qsheet init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Topic not found: {id}")]
    TopicNotFound { id: String },

    #[error("Topic not found: {id} (did you mean: {}?)", similar.join(", "))]
    TopicNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Subtopic not found: {id}")]
    SubTopicNotFound { id: String },

    #[error("Subtopic not found: {id} (did you mean: {}?)", similar.join(", "))]
    SubTopicNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Question not found: {id}")]
    QuestionNotFound { id: String },

    #[error("Question not found: {id} (did you mean: {}?)", similar.join(", "))]
    QuestionNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Parent not found: {id}")]
    ParentNotFound { id: String },

    #[error("Ambiguous ID prefix '{prefix}' matches {} entries", matches.len())]
    AmbiguousId { prefix: String, matches: Vec<String> },

    #[error("Index out of range: {index} (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Snapshot failed integrity check ({} violations)", violations.len())]
    Integrity { violations: Vec<IntegrityViolation> },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Integrity { .. } => ErrorCode::IntegrityError,
            Self::TopicNotFound { .. } | Self::TopicNotFoundSimilar { .. } => {
                ErrorCode::TopicNotFound
            }
            Self::SubTopicNotFound { .. } | Self::SubTopicNotFoundSimilar { .. } => {
                ErrorCode::SubTopicNotFound
            }
            Self::QuestionNotFound { .. } | Self::QuestionNotFoundSimilar { .. } => {
                ErrorCode::QuestionNotFound
            }
            Self::ParentNotFound { .. } => ErrorCode::ParentNotFound,
            Self::AmbiguousId { .. } => ErrorCode::AmbiguousId,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::InvalidStatus(_) => ErrorCode::InvalidStatus,
            Self::InvalidDifficulty(_) => ErrorCode::InvalidDifficulty,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `qsheet init` to create the database and load the seed sheet".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::TopicNotFound { id } => Some(format!(
                "No topic with ID '{id}'. Use `qsheet list` to see topic IDs."
            )),
            Self::SubTopicNotFound { id } => Some(format!(
                "No subtopic with ID '{id}'. Use `qsheet list --expand-all` to see subtopic IDs."
            )),
            Self::QuestionNotFound { id } => Some(format!(
                "No question with ID '{id}'. Use `qsheet list --search <title>` to find it."
            )),
            Self::ParentNotFound { id } => Some(format!(
                "'{id}' is not a topic or subtopic of the requested kind."
            )),
            Self::TopicNotFoundSimilar { similar, .. }
            | Self::SubTopicNotFoundSimilar { similar, .. }
            | Self::QuestionNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::AmbiguousId { matches, .. } => {
                let mut hint = String::from("Use a longer prefix. Candidates:\n");
                for id in matches.iter().take(5) {
                    hint.push_str(&format!("    {id}\n"));
                }
                if matches.len() > 5 {
                    hint.push_str(&format!("    ... and {} more", matches.len() - 5));
                }
                Some(hint.trim_end().to_string())
            }

            Self::IndexOutOfRange { len, .. } => Some(if *len == 0 {
                "The list is empty.".to_string()
            } else {
                format!("Valid positions are 0..={}", len - 1)
            }),

            Self::Integrity { .. } => {
                Some("Run `qsheet check` to list the violations".to_string())
            }

            Self::InvalidStatus(_) => Some(
                "Valid statuses: todo, done. Synonyms: solved/complete→done, open/pending→todo"
                    .to_string(),
            ),
            Self::InvalidDifficulty(_) => {
                Some("Valid difficulties: easy, medium, hard (or e, m, h)".to_string())
            }
            Self::InvalidArgument(msg) => {
                if msg.contains("kind") {
                    Some("Valid kinds: topic, subtopic, question".to_string())
                } else {
                    None
                }
            }

            Self::Sync(SyncError::Fetch { .. }) => Some(
                "Check the network connection, the sheet slug, and QSHEET_API_BASE".to_string(),
            ),

            Self::Database(_)
            | Self::Sync(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exitCode": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }
        if let Self::Integrity { violations } = self {
            obj["error"]["violations"] = serde_json::to_value(violations).unwrap_or_default();
        }

        obj
    }
}
