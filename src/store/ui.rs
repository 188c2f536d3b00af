//! Ephemeral UI state.
//!
//! Kept apart from [`crate::model::SheetState`]: nothing here is written to
//! the snapshot slot or included in exports.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Selection, rename target and per-container expansion toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Question shown in the detail view
    #[serde(default)]
    pub active_question_id: Option<String>,
    /// Topic or subtopic that should open in rename mode
    #[serde(default)]
    pub renaming_id: Option<String>,
    /// Topics and subtopics the user expanded (collapsed by default)
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

impl UiState {
    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flip the expansion toggle and return the new state.
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(id.to_string());
        } else {
            self.expanded.remove(id);
        }
    }

    /// Drop every reference to IDs that no longer exist.
    pub(crate) fn forget<F>(&mut self, exists: F)
    where
        F: Fn(&str) -> bool,
    {
        if self.active_question_id.as_deref().is_some_and(|id| !exists(id)) {
            self.active_question_id = None;
        }
        if self.renaming_id.as_deref().is_some_and(|id| !exists(id)) {
            self.renaming_id = None;
        }
        self.expanded.retain(|id| exists(id));
    }
}
