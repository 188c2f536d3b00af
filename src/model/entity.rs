//! Entity types for the study sheet.
//!
//! A sheet is a three-level hierarchy:
//! - [`Topic`] - root-level grouping node
//! - [`SubTopic`] - second-level grouping node under exactly one topic
//! - [`Question`] - leaf item tracked for solve status, parented by a topic
//!   or a subtopic
//!
//! Field names serialize in camelCase so snapshots stay interchangeable with
//! exported sheets.

use serde::{Deserialize, Serialize};

/// Generate a fresh entity identifier.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Which of the three tables an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Topic,
    SubTopic,
    Question,
}

impl EntityKind {
    /// Get the string representation used in events and output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::SubTopic => "subTopic",
            Self::Question => "question",
        }
    }
}

/// Kind of container a question is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParentType {
    Topic,
    SubTopic,
}

impl ParentType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::SubTopic => "subTopic",
        }
    }
}

impl From<ParentType> for EntityKind {
    fn from(value: ParentType) -> Self {
        match value {
            ParentType::Topic => Self::Topic,
            ParentType::SubTopic => Self::SubTopic,
        }
    }
}

/// Solve status of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Todo,
    Done,
}

impl QuestionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Done => "done",
        }
    }
}

/// Difficulty rating of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse a difficulty label case-insensitively.
    ///
    /// Returns `None` for anything outside `easy`/`medium`/`hard`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A root-level grouping node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
}

impl Topic {
    /// Create a topic with a fresh ID.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
        }
    }
}

/// A second-level grouping node.
///
/// `topic_id` is a back-reference; ownership lives in the topic's order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopic {
    pub id: String,
    pub title: String,
    pub topic_id: String,
}

impl SubTopic {
    /// Create a subtopic with a fresh ID under `topic_id`.
    pub fn new(topic_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            topic_id: topic_id.into(),
        }
    }
}

/// A tracked question.
///
/// Only `id`, `title`, `parent_id`, `parent_type` and `status` are always
/// present. Everything else is optional and omitted from JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    /// Topic or subtopic ID, depending on `parent_type`
    pub parent_id: String,
    pub parent_type: ParentType,
    #[serde(default)]
    pub status: QuestionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_tags: Option<Vec<String>>,
    /// IDs of related questions. Weak references: never validated or
    /// cleaned up when the referenced question is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular_sheets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sheets: Option<Vec<String>>,
}

impl Question {
    /// Create a `todo` question with a fresh ID under the given parent.
    pub fn new(parent_id: impl Into<String>, parent_type: ParentType, title: impl Into<String>) -> Self {
        Self::with_id(new_id(), parent_id, parent_type, title)
    }

    /// Create a `todo` question with an explicit ID.
    pub fn with_id(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        parent_type: ParentType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: parent_id.into(),
            parent_type,
            status: QuestionStatus::Todo,
            difficulty: None,
            video_url: None,
            link: None,
            tags: None,
            notes: None,
            bookmarked: None,
            platform: None,
            slug: None,
            description: None,
            company_tags: None,
            similar_questions: None,
            verified: None,
            platform_id: None,
            session: None,
            is_public: None,
            hotness: None,
            rank: None,
            popular_sheets: None,
            custom_tags: None,
            custom_sheets: None,
        }
    }

    // ── Default resolution ───────────────────────────────────
    //
    // Every consumer that needs a defaulted view of an optional field goes
    // through one of these instead of re-implementing the fallback.

    /// Status used for filtering and progress.
    #[must_use]
    pub const fn effective_status(&self) -> QuestionStatus {
        self.status
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.effective_status() == QuestionStatus::Done
    }

    /// Difficulty used for filter matching. Unset counts as medium.
    ///
    /// Display and export use `difficulty` directly.
    #[must_use]
    pub fn filter_difficulty(&self) -> Difficulty {
        self.difficulty.unwrap_or(Difficulty::Medium)
    }

    /// Platform label used for statistics grouping.
    #[must_use]
    pub fn platform_label(&self) -> &str {
        match self.platform.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "Other",
        }
    }

    #[must_use]
    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked.unwrap_or(false)
    }

    /// Apply a patch as a shallow merge. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: QuestionPatch) {
        let QuestionPatch {
            title,
            status,
            difficulty,
            video_url,
            link,
            tags,
            notes,
            bookmarked,
            platform,
            custom_tags,
            custom_sheets,
            similar_questions,
        } = patch;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = difficulty {
            self.difficulty = v;
        }
        if let Some(v) = video_url {
            self.video_url = v;
        }
        if let Some(v) = link {
            self.link = v;
        }
        if let Some(v) = tags {
            self.tags = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = bookmarked {
            self.bookmarked = Some(v);
        }
        if let Some(v) = platform {
            self.platform = v;
        }
        if let Some(v) = custom_tags {
            self.custom_tags = v;
        }
        if let Some(v) = custom_sheets {
            self.custom_sheets = v;
        }
        if let Some(v) = similar_questions {
            self.similar_questions = v;
        }
    }
}

/// Partial update for a question.
///
/// `None` leaves a field untouched. For optional fields, `Some(None)` clears
/// the value and `Some(Some(v))` sets it. Structural fields (`id`, parent) are
/// deliberately absent: moving goes through the move operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub status: Option<QuestionStatus>,
    pub difficulty: Option<Option<Difficulty>>,
    pub video_url: Option<Option<String>>,
    pub link: Option<Option<String>>,
    pub tags: Option<Option<Vec<String>>>,
    pub notes: Option<Option<String>>,
    pub bookmarked: Option<bool>,
    pub platform: Option<Option<String>>,
    pub custom_tags: Option<Option<Vec<String>>>,
    pub custom_sheets: Option<Option<Vec<String>>>,
    pub similar_questions: Option<Option<Vec<String>>>,
}

impl QuestionPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: QuestionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn link(mut self, link: Option<String>) -> Self {
        self.link = Some(link);
        self
    }

    #[must_use]
    pub fn video_url(mut self, url: Option<String>) -> Self {
        self.video_url = Some(url);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn bookmarked(mut self, bookmarked: bool) -> Self {
        self.bookmarked = Some(bookmarked);
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: Option<String>) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn custom_tags(mut self, tags: Option<Vec<String>>) -> Self {
        self.custom_tags = Some(tags);
        self
    }

    #[must_use]
    pub fn custom_sheets(mut self, sheets: Option<Vec<String>>) -> Self {
        self.custom_sheets = Some(sheets);
        self
    }

    /// True if applying this patch would not touch any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
