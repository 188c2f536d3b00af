//! Sync types for seed payloads and exports.
//!
//! The raw types mirror the hierarchical sheet payload served by the public
//! sheet API (and stored in seed files). Every field is optional on the wire:
//! missing, `null` or mistyped values degrade to defaults instead of failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize any JSON value, falling back to `T::default()` when it does
/// not fit `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list, keeping only the elements that fit `T`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Response envelope of the sheet API, also accepted for seed files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<RawSheetData>,
}

/// Hierarchical sheet payload: sheet header plus a flat question list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSheetData {
    #[serde(default, deserialize_with = "lenient")]
    pub sheet: RawSheet,
    #[serde(default, deserialize_with = "lenient_list")]
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSheet {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub banner: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub followers: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub config: RawSheetConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSheetConfig {
    /// Topic names in display order
    #[serde(default, deserialize_with = "lenient_list")]
    pub topic_order: Vec<String>,
}

/// One question row of the raw payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient")]
    pub sub_topic: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_solved: bool,
    /// Video resource URL
    #[serde(default, deserialize_with = "lenient")]
    pub resource: Option<String>,
    /// Populated platform problem; an unpopulated reference (a bare ID
    /// string) reads as `None`
    #[serde(default, deserialize_with = "lenient")]
    pub question_id: Option<RawQuestionRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub session: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hotness: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rank: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub popular_sheets: Option<Vec<String>>,
}

/// Platform problem referenced by a raw question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestionRef {
    #[serde(rename = "id", default, deserialize_with = "lenient")]
    pub platform_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub problem_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub topics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub similar_questions: Option<Vec<String>>,
}

/// Statistics from a seed transform.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStats {
    pub topics: usize,
    pub sub_topics: usize,
    pub questions: usize,
    /// Raw `_id` values that were missing or already used and got a fresh ID
    pub regenerated_ids: usize,
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Default download name used when no output path is given.
    #[must_use]
    pub const fn default_file_name(&self) -> &'static str {
        match self {
            Self::Json => "question-sheet-export.json",
            Self::Csv => "question-sheet-export.csv",
        }
    }
}

/// Errors from seed, fetch and file operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote sheet could not be fetched. The cause is kept for logs only.
    #[error("Failed to fetch sheet data")]
    Fetch { cause: String },

    /// Seed or snapshot file not found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File parsed as JSON but has neither a sheet payload nor a snapshot.
    #[error("Unrecognized sheet file: {0}")]
    UnrecognizedFormat(String),
}

impl SyncError {
    pub fn fetch(cause: impl ToString) -> Self {
        Self::Fetch {
            cause: cause.to_string(),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_question_tolerates_missing_fields() {
        let q: RawQuestion = serde_json::from_str(r#"{"title":"Two Sum"}"#).unwrap();
        assert_eq!(q.title, "Two Sum");
        assert!(q.id.is_none());
        assert!(!q.is_solved);
        assert!(q.question_id.is_none());
    }

    #[test]
    fn test_raw_question_field_names() {
        let q: RawQuestion = serde_json::from_str(
            r#"{"_id":"abc","title":"T","topic":"Arrays","subTopic":"Basics","isSolved":true,
                "questionId":{"id":"p1","problemUrl":"https://x","companyTags":["Acme"]}}"#,
        )
        .unwrap();
        assert_eq!(q.id.as_deref(), Some("abc"));
        assert_eq!(q.sub_topic.as_deref(), Some("Basics"));
        let r = q.question_id.unwrap();
        assert_eq!(r.platform_id.as_deref(), Some("p1"));
        assert_eq!(r.problem_url.as_deref(), Some("https://x"));
        assert_eq!(r.company_tags, Some(vec!["Acme".to_string()]));
    }

    #[test]
    fn test_raw_question_tolerates_null_and_mistyped_fields() {
        let q: RawQuestion = serde_json::from_str(
            r#"{"_id":7,"title":null,"topic":"Arrays","subTopic":null,"isSolved":null,
                "questionId":"65ab12","rank":1.5,"hotness":"hot","popularSheets":null}"#,
        )
        .unwrap();
        assert!(q.id.is_none());
        assert_eq!(q.title, "");
        assert_eq!(q.topic, "Arrays");
        assert!(q.sub_topic.is_none());
        assert!(!q.is_solved);
        assert!(q.question_id.is_none());
        assert_eq!(q.rank, Some(1.5));
        assert!(q.hotness.is_none());
        assert!(q.popular_sheets.is_none());
    }

    #[test]
    fn test_raw_question_ref_keeps_good_fields_beside_bad_ones() {
        let q: RawQuestion = serde_json::from_str(
            r#"{"title":"T","questionId":{"difficulty":"Hard","topics":null,"verified":"yes"}}"#,
        )
        .unwrap();
        let r = q.question_id.unwrap();
        assert_eq!(r.difficulty.as_deref(), Some("Hard"));
        assert!(r.topics.is_none());
        assert!(r.verified.is_none());
    }

    #[test]
    fn test_sheet_tolerates_null_config_and_bad_rows() {
        let data: RawSheetData = serde_json::from_str(
            r#"{"sheet":{"name":"S","config":{"topicOrder":null}},
                "questions":[null,{"title":"A","topic":"Arrays"},42]}"#,
        )
        .unwrap();
        assert_eq!(data.sheet.name, "S");
        assert!(data.sheet.config.topic_order.is_empty());
        assert_eq!(data.questions.len(), 1);
        assert_eq!(data.questions[0].title, "A");

        let data: RawSheetData =
            serde_json::from_str(r#"{"sheet":{"config":null},"questions":null}"#).unwrap();
        assert!(data.sheet.config.topic_order.is_empty());
        assert!(data.questions.is_empty());

        let config: RawSheetConfig =
            serde_json::from_str(r#"{"topicOrder":["Arrays",3,"Graphs"]}"#).unwrap();
        assert_eq!(config.topic_order, ["Arrays", "Graphs"]);
    }

    #[test]
    fn test_envelope_without_data() {
        let env: RawEnvelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(env.success, Some(false));
        assert!(env.data.is_none());
    }
}
