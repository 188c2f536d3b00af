//! Sheet state container.
//!
//! [`Store`] owns the normalized tables privately and exposes only the named
//! mutation operations. Every operation is a single atomic transition: it
//! either leaves all cross-table invariants intact or changes nothing.
//!
//! Referential misses are explicit. Operations that target an existing
//! entity return `bool` (`false` = nothing changed), creations return
//! `Option<String>` (`None` = parent missing, nothing created).

mod ui;

pub use ui::UiState;

use tracing::debug;

use crate::model::{
    EntityKind, ParentType, Question, QuestionPatch, SheetState, SubTopic, Topic,
};

/// In-memory study sheet with its ephemeral UI state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    sheet: SheetState,
    ui: UiState,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an already normalized snapshot.
    #[must_use]
    pub fn from_snapshot(sheet: SheetState) -> Self {
        Self {
            sheet,
            ui: UiState::default(),
        }
    }

    /// Read access to the durable tables.
    #[must_use]
    pub fn sheet(&self) -> &SheetState {
        &self.sheet
    }

    /// Read access to the ephemeral UI state.
    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Consume the store, returning the durable snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> SheetState {
        self.sheet
    }

    /// Replace the UI state (e.g. restored from a cache), dropping stale IDs.
    pub fn restore_ui(&mut self, mut ui: UiState) {
        let sheet = &self.sheet;
        ui.forget(|id| {
            sheet.topic(id).is_some() || sheet.sub_topic(id).is_some() || sheet.question(id).is_some()
        });
        self.ui = ui;
    }

    // ==================
    // Topic Operations
    // ==================

    /// Create a topic at the end of the root order and flag it for rename.
    pub fn add_topic(&mut self, title: &str) -> String {
        let topic = Topic::new(title);
        let id = topic.id.clone();

        self.sheet.topics.by_id.insert(id.clone(), topic);
        self.sheet.topics.order.push(id.clone());
        self.sheet.sub_topics.order_by_topic_id.insert(id.clone(), Vec::new());
        self.sheet.questions.order_by_parent_id.insert(id.clone(), Vec::new());

        self.ui.renaming_id = Some(id.clone());
        id
    }

    /// Replace a topic title.
    pub fn edit_topic(&mut self, id: &str, title: &str) -> bool {
        let Some(topic) = self.sheet.topics.by_id.get_mut(id) else {
            debug!(id, "edit_topic: no such topic");
            return false;
        };
        topic.title = title.to_string();
        true
    }

    /// Delete a topic with all its subtopics and every question under either.
    pub fn delete_topic(&mut self, id: &str) -> bool {
        if self.sheet.topics.by_id.remove(id).is_none() {
            debug!(id, "delete_topic: no such topic");
            return false;
        }
        self.sheet.topics.order.retain(|t| t != id);

        let sub_topic_ids = self
            .sheet
            .sub_topics
            .order_by_topic_id
            .remove(id)
            .unwrap_or_default();

        self.remove_questions_of(id);
        for st_id in &sub_topic_ids {
            self.sheet.sub_topics.by_id.remove(st_id);
            self.remove_questions_of(st_id);
        }

        self.forget_removed();
        true
    }

    /// Move a topic within the root order (splice semantics).
    pub fn reorder_topics(&mut self, from: usize, to: usize) -> bool {
        splice_move(&mut self.sheet.topics.order, from, to)
    }

    /// Move an entity within its own order list (splice semantics).
    ///
    /// `parent_id` is ignored for topics and required otherwise. Indices
    /// outside the list are rejected without change.
    pub fn reorder_entity(
        &mut self,
        kind: EntityKind,
        parent_id: Option<&str>,
        from: usize,
        to: usize,
    ) -> bool {
        let list = match (kind, parent_id) {
            (EntityKind::Topic, _) => Some(&mut self.sheet.topics.order),
            (EntityKind::SubTopic, Some(p)) => self.sheet.sub_topics.order_by_topic_id.get_mut(p),
            (EntityKind::Question, Some(p)) => self.sheet.questions.order_by_parent_id.get_mut(p),
            _ => None,
        };

        match list {
            Some(list) => splice_move(list, from, to),
            None => {
                debug!(kind = kind.as_str(), ?parent_id, "reorder_entity: no such list");
                false
            }
        }
    }

    // ==================
    // SubTopic Operations
    // ==================

    /// Create a subtopic at the end of a topic and flag it for rename.
    ///
    /// Returns `None` without change when the topic does not exist.
    pub fn add_sub_topic(&mut self, topic_id: &str, title: &str) -> Option<String> {
        if !self.sheet.topics.by_id.contains_key(topic_id) {
            debug!(topic_id, "add_sub_topic: no such topic");
            return None;
        }

        let sub_topic = SubTopic::new(topic_id, title);
        let id = sub_topic.id.clone();

        self.sheet.sub_topics.by_id.insert(id.clone(), sub_topic);
        self.sheet
            .sub_topics
            .order_by_topic_id
            .entry(topic_id.to_string())
            .or_default()
            .push(id.clone());
        self.sheet.questions.order_by_parent_id.insert(id.clone(), Vec::new());

        self.ui.renaming_id = Some(id.clone());
        Some(id)
    }

    /// Replace a subtopic title.
    pub fn edit_sub_topic(&mut self, id: &str, title: &str) -> bool {
        let Some(sub_topic) = self.sheet.sub_topics.by_id.get_mut(id) else {
            debug!(id, "edit_sub_topic: no such subtopic");
            return false;
        };
        sub_topic.title = title.to_string();
        true
    }

    /// Delete a subtopic and its questions.
    pub fn delete_sub_topic(&mut self, id: &str) -> bool {
        let Some(sub_topic) = self.sheet.sub_topics.by_id.remove(id) else {
            debug!(id, "delete_sub_topic: no such subtopic");
            return false;
        };

        if let Some(list) = self.sheet.sub_topics.order_by_topic_id.get_mut(&sub_topic.topic_id) {
            list.retain(|st| st != id);
        }
        self.remove_questions_of(id);

        self.forget_removed();
        true
    }

    /// Move a subtopic to `index` in another (or the same) topic.
    ///
    /// The index is clamped to the destination length. Rejected when the
    /// subtopic or the destination topic does not exist.
    pub fn move_sub_topic(&mut self, id: &str, from_topic_id: &str, to_topic_id: &str, index: usize) -> bool {
        if !self.sheet.topics.by_id.contains_key(to_topic_id) {
            debug!(id, to_topic_id, "move_sub_topic: no such destination topic");
            return false;
        }
        let Some(sub_topic) = self.sheet.sub_topics.by_id.get_mut(id) else {
            debug!(id, "move_sub_topic: no such subtopic");
            return false;
        };

        let actual_topic_id = std::mem::replace(&mut sub_topic.topic_id, to_topic_id.to_string());

        let lists = &mut self.sheet.sub_topics.order_by_topic_id;
        for source in [from_topic_id, actual_topic_id.as_str()] {
            if let Some(list) = lists.get_mut(source) {
                list.retain(|st| st != id);
            }
        }
        insert_unique(lists.entry(to_topic_id.to_string()).or_default(), id, index);
        true
    }

    // ==================
    // Question Operations
    // ==================

    /// Create a `todo` question at the end of a parent and make it active.
    ///
    /// Returns `None` without change when no container of `parent_type`
    /// with that ID exists.
    pub fn add_question(&mut self, parent_id: &str, parent_type: ParentType, title: &str) -> Option<String> {
        if !self.sheet.has_parent(parent_id, parent_type) {
            debug!(parent_id, parent_type = parent_type.as_str(), "add_question: no such parent");
            return None;
        }

        let question = Question::new(parent_id, parent_type, title);
        let id = question.id.clone();

        self.sheet.questions.by_id.insert(id.clone(), question);
        self.sheet
            .questions
            .order_by_parent_id
            .entry(parent_id.to_string())
            .or_default()
            .push(id.clone());

        self.ui.active_question_id = Some(id.clone());
        Some(id)
    }

    /// Shallow-merge `patch` into a question.
    pub fn edit_question(&mut self, id: &str, patch: QuestionPatch) -> bool {
        let Some(question) = self.sheet.questions.by_id.get_mut(id) else {
            debug!(id, "edit_question: no such question");
            return false;
        };
        question.apply(patch);
        true
    }

    /// Delete a single question.
    pub fn delete_question(&mut self, id: &str) -> bool {
        let Some(question) = self.sheet.questions.by_id.remove(id) else {
            debug!(id, "delete_question: no such question");
            return false;
        };

        if let Some(list) = self.sheet.questions.order_by_parent_id.get_mut(&question.parent_id) {
            list.retain(|q| q != id);
        }

        if self.ui.active_question_id.as_deref() == Some(id) {
            self.ui.active_question_id = None;
        }
        true
    }

    /// Move a question to `index` under another (or the same) parent.
    ///
    /// The destination list is de-duplicated before insertion, so repeating
    /// the same move leaves the ID listed once. The index is clamped to the
    /// destination length. Rejected when the question or the destination
    /// parent (of `to_parent_type`) does not exist.
    pub fn move_question(
        &mut self,
        id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        index: usize,
        to_parent_type: ParentType,
    ) -> bool {
        if !self.sheet.has_parent(to_parent_id, to_parent_type) {
            debug!(id, to_parent_id, "move_question: no such destination parent");
            return false;
        }
        let Some(question) = self.sheet.questions.by_id.get_mut(id) else {
            debug!(id, "move_question: no such question");
            return false;
        };

        let actual_parent_id = std::mem::replace(&mut question.parent_id, to_parent_id.to_string());
        question.parent_type = to_parent_type;

        let lists = &mut self.sheet.questions.order_by_parent_id;
        for source in [from_parent_id, actual_parent_id.as_str()] {
            if let Some(list) = lists.get_mut(source) {
                list.retain(|q| q != id);
            }
        }
        insert_unique(lists.entry(to_parent_id.to_string()).or_default(), id, index);
        true
    }

    // ==================
    // Data Operations
    // ==================

    /// Empty every table and reset the active question.
    pub fn clear_data(&mut self) {
        self.sheet = SheetState::default();
        self.ui.active_question_id = None;
        self.forget_removed();
    }

    /// Replace every table with a trusted, already normalized snapshot.
    pub fn import_data(&mut self, snapshot: SheetState) {
        self.sheet = snapshot;
        self.ui.active_question_id = None;
        self.forget_removed();
    }

    // ==================
    // UI Operations
    // ==================

    /// Select a question for the detail view. Unknown IDs clear the selection.
    pub fn set_active_question(&mut self, id: Option<&str>) -> bool {
        let id = id.filter(|id| self.sheet.question(id).is_some());
        self.ui.active_question_id = id.map(ToString::to_string);
        self.ui.active_question_id.is_some()
    }

    pub fn set_renaming(&mut self, id: Option<&str>) {
        self.ui.renaming_id = id.map(ToString::to_string);
    }

    /// Flip a topic/subtopic expansion toggle. Returns the new state, or
    /// `None` if the ID is not a container.
    pub fn toggle_expanded(&mut self, id: &str) -> Option<bool> {
        self.sheet.parent_type_of(id)?;
        Some(self.ui.toggle_expanded(id))
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        if self.sheet.parent_type_of(id).is_none() {
            return false;
        }
        self.ui.set_expanded(id, expanded);
        true
    }

    // ── helpers ──────────────────────────────────────────────

    /// Remove the question list of a container and every question in it.
    fn remove_questions_of(&mut self, parent_id: &str) {
        let ids = self
            .sheet
            .questions
            .order_by_parent_id
            .remove(parent_id)
            .unwrap_or_default();
        for q_id in ids {
            self.sheet.questions.by_id.remove(&q_id);
        }
    }

    fn forget_removed(&mut self) {
        let sheet = &self.sheet;
        self.ui.forget(|id| {
            sheet.topic(id).is_some() || sheet.sub_topic(id).is_some() || sheet.question(id).is_some()
        });
    }
}

/// Remove the element at `from` and re-insert it at `to`.
///
/// `to` is interpreted after the removal. Both indices must be in range.
fn splice_move(list: &mut Vec<String>, from: usize, to: usize) -> bool {
    if from >= list.len() || to >= list.len() {
        debug!(from, to, len = list.len(), "reorder out of range");
        return false;
    }
    let item = list.remove(from);
    list.insert(to, item);
    true
}

/// Insert `id` at `index` (clamped), removing any existing occurrence first.
fn insert_unique(list: &mut Vec<String>, id: &str, index: usize) {
    list.retain(|x| x != id);
    let index = index.min(list.len());
    list.insert(index, id.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionStatus};

    fn titles(store: &Store, ids: &[String]) -> Vec<String> {
        ids.iter()
            .map(|id| store.sheet().topic(id).unwrap().title.clone())
            .collect()
    }

    fn assert_consistent(store: &Store) {
        let violations = store.sheet().check_integrity();
        assert!(violations.is_empty(), "integrity violations: {violations:?}");
    }

    #[test]
    fn test_add_topic_initializes_lists() {
        let mut store = Store::new();
        let id = store.add_topic("Arrays");

        assert_eq!(store.sheet().topic_order(), &[id.clone()]);
        assert!(store.sheet().sub_topic_order(&id).is_empty());
        assert!(store.sheet().question_order(&id).is_empty());
        assert_eq!(store.ui().renaming_id.as_deref(), Some(id.as_str()));
        assert_consistent(&store);
    }

    #[test]
    fn test_edit_missing_topic_is_noop() {
        let mut store = Store::new();
        let id = store.add_topic("Arrays");
        let before = store.sheet().clone();

        assert!(!store.edit_topic("missing", "X"));
        assert_eq!(store.sheet(), &before);

        assert!(store.edit_topic(&id, "Strings"));
        assert_eq!(store.sheet().topic(&id).unwrap().title, "Strings");
    }

    #[test]
    fn test_reorder_entity_topic_splice_move() {
        let mut store = Store::new();
        for t in ["A", "B", "C", "D"] {
            store.add_topic(t);
        }

        assert!(store.reorder_entity(EntityKind::Topic, None, 0, 2));
        let order = store.sheet().topic_order().to_vec();
        assert_eq!(titles(&store, &order), vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_reorder_out_of_range_is_rejected() {
        let mut store = Store::new();
        store.add_topic("A");
        store.add_topic("B");
        let before = store.sheet().clone();

        assert!(!store.reorder_topics(0, 2));
        assert!(!store.reorder_topics(5, 0));
        assert!(!store.reorder_entity(EntityKind::Question, None, 0, 0));
        assert_eq!(store.sheet(), &before);
    }

    #[test]
    fn test_reorder_questions_within_parent() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q1 = store.add_question(&t, ParentType::Topic, "1").unwrap();
        let q2 = store.add_question(&t, ParentType::Topic, "2").unwrap();
        let q3 = store.add_question(&t, ParentType::Topic, "3").unwrap();

        assert!(store.reorder_entity(EntityKind::Question, Some(&t), 2, 0));
        assert_eq!(store.sheet().question_order(&t), &[q3, q1, q2]);
    }

    #[test]
    fn test_add_sub_topic_rejects_missing_topic() {
        let mut store = Store::new();
        assert_eq!(store.add_sub_topic("missing", "X"), None);
        assert!(store.sheet().is_empty());
        assert_consistent(&store);
    }

    #[test]
    fn test_add_question_rejects_wrong_parent_type() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        assert_eq!(store.add_question(&t, ParentType::SubTopic, "Q"), None);
        assert_eq!(store.sheet().question_count(), 0);
    }

    #[test]
    fn test_add_question_sets_active() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let st = store.add_sub_topic(&t, "S").unwrap();
        let q = store.add_question(&st, ParentType::SubTopic, "Q").unwrap();

        let question = store.sheet().question(&q).unwrap();
        assert_eq!(question.status, QuestionStatus::Todo);
        assert_eq!(question.parent_type, ParentType::SubTopic);
        assert_eq!(store.ui().active_question_id.as_deref(), Some(q.as_str()));
        assert_consistent(&store);
    }

    #[test]
    fn test_delete_topic_cascades() {
        let mut store = Store::new();
        let keep = store.add_topic("Keep");
        let kept_q = store.add_question(&keep, ParentType::Topic, "kept").unwrap();

        let t = store.add_topic("Doomed");
        store.add_question(&t, ParentType::Topic, "direct").unwrap();
        let s1 = store.add_sub_topic(&t, "S1").unwrap();
        let s2 = store.add_sub_topic(&t, "S2").unwrap();
        store.add_question(&s1, ParentType::SubTopic, "a").unwrap();
        let nested = store.add_question(&s2, ParentType::SubTopic, "b").unwrap();
        store.add_question(&s2, ParentType::SubTopic, "c").unwrap();
        store.set_active_question(Some(&nested));

        let questions_before = store.sheet().question_count();
        let subs_before = store.sheet().sub_topic_count();

        assert!(store.delete_topic(&t));

        assert_eq!(store.sheet().question_count(), questions_before - 4);
        assert_eq!(store.sheet().sub_topic_count(), subs_before - 2);
        assert!(store.sheet().all_sub_topics().all(|st| st.topic_id != t));
        assert!(store.sheet().all_questions().all(|q| q.parent_id != t && q.parent_id != s1 && q.parent_id != s2));
        assert!(store.sheet().question(&kept_q).is_some());
        assert_eq!(store.ui().active_question_id, None);
        assert_consistent(&store);
    }

    #[test]
    fn test_delete_sub_topic_cascades() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let s = store.add_sub_topic(&t, "S").unwrap();
        store.add_question(&s, ParentType::SubTopic, "a").unwrap();
        store.add_question(&t, ParentType::Topic, "direct").unwrap();

        assert!(store.delete_sub_topic(&s));
        assert!(store.sheet().sub_topic_order(&t).is_empty());
        assert_eq!(store.sheet().question_count(), 1);
        assert!(!store.delete_sub_topic(&s));
        assert_consistent(&store);
    }

    #[test]
    fn test_move_sub_topic_between_topics() {
        let mut store = Store::new();
        let a = store.add_topic("A");
        let b = store.add_topic("B");
        let s1 = store.add_sub_topic(&a, "S1").unwrap();
        let s2 = store.add_sub_topic(&b, "S2").unwrap();
        let q = store.add_question(&s1, ParentType::SubTopic, "Q").unwrap();

        assert!(store.move_sub_topic(&s1, &a, &b, 0));

        assert!(store.sheet().sub_topic_order(&a).is_empty());
        assert_eq!(store.sheet().sub_topic_order(&b), &[s1.clone(), s2]);
        assert_eq!(store.sheet().sub_topic(&s1).unwrap().topic_id, b);
        // Questions travel with their subtopic
        assert_eq!(store.sheet().question(&q).unwrap().parent_id, s1);
        assert_consistent(&store);
    }

    #[test]
    fn test_move_sub_topic_rejects_missing_destination() {
        let mut store = Store::new();
        let a = store.add_topic("A");
        let s = store.add_sub_topic(&a, "S").unwrap();
        let before = store.sheet().clone();

        assert!(!store.move_sub_topic(&s, &a, "nowhere", 0));
        assert_eq!(store.sheet(), &before);
    }

    #[test]
    fn test_move_sub_topic_with_stale_source_still_consistent() {
        let mut store = Store::new();
        let a = store.add_topic("A");
        let b = store.add_topic("B");
        let s = store.add_sub_topic(&a, "S").unwrap();

        // Caller passes the wrong source topic
        assert!(store.move_sub_topic(&s, &b, &b, 10));
        assert!(store.sheet().sub_topic_order(&a).is_empty());
        assert_eq!(store.sheet().sub_topic_order(&b), &[s]);
        assert_consistent(&store);
    }

    #[test]
    fn test_move_question_twice_lists_once() {
        let mut store = Store::new();
        let a = store.add_topic("A");
        let b = store.add_topic("B");
        let s = store.add_sub_topic(&b, "S").unwrap();
        let q = store.add_question(&a, ParentType::Topic, "Q").unwrap();
        store.add_question(&s, ParentType::SubTopic, "other").unwrap();

        assert!(store.move_question(&q, &a, &s, 0, ParentType::SubTopic));
        assert!(store.move_question(&q, &a, &s, 0, ParentType::SubTopic));

        let dest = store.sheet().question_order(&s);
        assert_eq!(dest.iter().filter(|id| **id == q).count(), 1);
        assert_eq!(dest[0], q);
        assert!(store.sheet().question_order(&a).is_empty());

        let moved = store.sheet().question(&q).unwrap();
        assert_eq!(moved.parent_id, s);
        assert_eq!(moved.parent_type, ParentType::SubTopic);
        assert_consistent(&store);
    }

    #[test]
    fn test_move_question_within_same_parent() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q1 = store.add_question(&t, ParentType::Topic, "1").unwrap();
        let q2 = store.add_question(&t, ParentType::Topic, "2").unwrap();

        assert!(store.move_question(&q1, &t, &t, 1, ParentType::Topic));
        assert_eq!(store.sheet().question_order(&t), &[q2, q1]);
        assert_consistent(&store);
    }

    #[test]
    fn test_move_question_rejects_mismatched_parent_type() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q = store.add_question(&t, ParentType::Topic, "Q").unwrap();
        let before = store.sheet().clone();

        assert!(!store.move_question(&q, &t, &t, 0, ParentType::SubTopic));
        assert!(!store.move_question("ghost", &t, &t, 0, ParentType::Topic));
        assert_eq!(store.sheet(), &before);
    }

    #[test]
    fn test_edit_question_merges_fields() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q = store.add_question(&t, ParentType::Topic, "Q").unwrap();

        assert!(store.edit_question(
            &q,
            QuestionPatch::default()
                .status(QuestionStatus::Done)
                .difficulty(Some(Difficulty::Hard))
                .bookmarked(true),
        ));
        assert!(store.edit_question(&q, QuestionPatch::default().notes(Some("remember".into()))));

        let question = store.sheet().question(&q).unwrap();
        assert_eq!(question.status, QuestionStatus::Done);
        assert_eq!(question.difficulty, Some(Difficulty::Hard));
        assert!(question.is_bookmarked());
        assert_eq!(question.notes.as_deref(), Some("remember"));
        assert!(!store.edit_question("ghost", QuestionPatch::default().title("x")));
    }

    #[test]
    fn test_delete_question_removes_from_parent() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q = store.add_question(&t, ParentType::Topic, "Q").unwrap();

        assert!(store.delete_question(&q));
        assert!(store.sheet().question_order(&t).is_empty());
        assert_eq!(store.ui().active_question_id, None);
        assert!(!store.delete_question(&q));
        assert_consistent(&store);
    }

    #[test]
    fn test_clear_and_import() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        store.add_question(&t, ParentType::Topic, "Q").unwrap();
        let snapshot = store.sheet().clone();

        store.clear_data();
        assert!(store.sheet().is_empty());
        assert_eq!(store.ui().active_question_id, None);

        store.import_data(snapshot.clone());
        assert_eq!(store.sheet(), &snapshot);
        assert_eq!(store.ui().active_question_id, None);
    }

    #[test]
    fn test_toggle_expanded_only_for_containers() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        let q = store.add_question(&t, ParentType::Topic, "Q").unwrap();

        assert_eq!(store.toggle_expanded(&t), Some(true));
        assert_eq!(store.toggle_expanded(&q), None);
        assert!(store.ui().is_expanded(&t));
    }
}
