//! Transient filter criteria and question visibility.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Question, QuestionStatus};

/// Filter criteria applied to the sheet tree. Never persisted.
///
/// Empty sets mean "no constraint" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive title substring
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub statuses: BTreeSet<QuestionStatus>,
    #[serde(default)]
    pub difficulties: BTreeSet<Difficulty>,
    #[serde(default)]
    pub platforms: BTreeSet<String>,
}

impl FilterState {
    /// True if any criterion constrains the view.
    ///
    /// Any non-empty search string counts, including whitespace.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || !self.statuses.is_empty()
            || !self.difficulties.is_empty()
            || !self.platforms.is_empty()
    }

    /// Whether a question passes every active criterion.
    ///
    /// A question without a difficulty matches a filter that includes
    /// `medium`, and only such a filter.
    #[must_use]
    pub fn question_visible(&self, question: &Question) -> bool {
        self.matches_search(question)
            && (self.statuses.is_empty() || self.statuses.contains(&question.effective_status()))
            && (self.difficulties.is_empty()
                || self.difficulties.contains(&question.filter_difficulty()))
            && (self.platforms.is_empty()
                || question
                    .platform
                    .as_ref()
                    .is_some_and(|p| self.platforms.contains(p)))
    }

    fn matches_search(&self, question: &Question) -> bool {
        self.search.is_empty()
            || question
                .title
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }

    /// Reset every criterion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
