//! Normalized sheet snapshot.
//!
//! The snapshot keeps every entity exactly once in a by-id table and models
//! the hierarchy with separate order lists:
//!
//! ```text
//! topics.order                          [topicId, ...]
//! subTopics.orderByTopicId[topicId]     [subTopicId, ...]
//! questions.orderByParentId[parentId]   [questionId, ...]   (parent = topic or subtopic)
//! ```
//!
//! Tables are only ever mutated by [`crate::store::Store`]; this module
//! provides read access plus [`SheetState::check_integrity`], which reports
//! every broken cross-table reference.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, ParentType, Question, SubTopic, Topic};

/// Descriptive metadata for an imported sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
}

/// Topics by ID plus root display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTable {
    #[serde(default)]
    pub(crate) by_id: BTreeMap<String, Topic>,
    #[serde(default)]
    pub(crate) order: Vec<String>,
}

/// Subtopics by ID plus per-topic display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopicTable {
    #[serde(default)]
    pub(crate) by_id: BTreeMap<String, SubTopic>,
    #[serde(default)]
    pub(crate) order_by_topic_id: BTreeMap<String, Vec<String>>,
}

/// Questions by ID plus per-parent display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTable {
    #[serde(default)]
    pub(crate) by_id: BTreeMap<String, Question>,
    #[serde(default)]
    pub(crate) order_by_parent_id: BTreeMap<String, Vec<String>>,
}

/// The durable, persisted and exported state of a sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) metadata: Option<SheetMetadata>,
    #[serde(default)]
    pub(crate) topics: TopicTable,
    #[serde(default)]
    pub(crate) sub_topics: SubTopicTable,
    #[serde(default)]
    pub(crate) questions: QuestionTable,
}

impl SheetState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&SheetMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.by_id.is_empty()
            && self.sub_topics.by_id.is_empty()
            && self.questions.by_id.is_empty()
    }

    // ── Lookups ──────────────────────────────────────────────

    #[must_use]
    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.by_id.get(id)
    }

    #[must_use]
    pub fn sub_topic(&self, id: &str) -> Option<&SubTopic> {
        self.sub_topics.by_id.get(id)
    }

    #[must_use]
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.by_id.get(id)
    }

    /// Whether `id` names an existing container of the given type.
    #[must_use]
    pub fn has_parent(&self, id: &str, parent_type: ParentType) -> bool {
        match parent_type {
            ParentType::Topic => self.topics.by_id.contains_key(id),
            ParentType::SubTopic => self.sub_topics.by_id.contains_key(id),
        }
    }

    /// Resolve the kind of container `id` refers to, if any.
    #[must_use]
    pub fn parent_type_of(&self, id: &str) -> Option<ParentType> {
        if self.topics.by_id.contains_key(id) {
            Some(ParentType::Topic)
        } else if self.sub_topics.by_id.contains_key(id) {
            Some(ParentType::SubTopic)
        } else {
            None
        }
    }

    /// Topic that ultimately contains a question (through its subtopic if needed).
    #[must_use]
    pub fn owning_topic(&self, question: &Question) -> Option<&Topic> {
        match question.parent_type {
            ParentType::Topic => self.topic(&question.parent_id),
            ParentType::SubTopic => self
                .sub_topic(&question.parent_id)
                .and_then(|st| self.topic(&st.topic_id)),
        }
    }

    // ── Ordered access ───────────────────────────────────────

    #[must_use]
    pub fn topic_order(&self) -> &[String] {
        &self.topics.order
    }

    #[must_use]
    pub fn sub_topic_order(&self, topic_id: &str) -> &[String] {
        self.sub_topics
            .order_by_topic_id
            .get(topic_id)
            .map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn question_order(&self, parent_id: &str) -> &[String] {
        self.questions
            .order_by_parent_id
            .get(parent_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Topics in display order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.order.iter().filter_map(|id| self.topics.by_id.get(id))
    }

    /// Subtopics of a topic in display order.
    pub fn sub_topics_of<'a>(&'a self, topic_id: &str) -> impl Iterator<Item = &'a SubTopic> + 'a {
        self.sub_topic_order(topic_id)
            .iter()
            .filter_map(|id| self.sub_topics.by_id.get(id))
    }

    /// Questions directly under a topic or subtopic, in display order.
    pub fn questions_of<'a>(&'a self, parent_id: &str) -> impl Iterator<Item = &'a Question> + 'a {
        self.question_order(parent_id)
            .iter()
            .filter_map(|id| self.questions.by_id.get(id))
    }

    /// Every question of the sheet (ID order).
    pub fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.by_id.values()
    }

    /// Every subtopic of the sheet (ID order).
    pub fn all_sub_topics(&self) -> impl Iterator<Item = &SubTopic> {
        self.sub_topics.by_id.values()
    }

    /// Questions in display order: per topic its direct questions, then each
    /// subtopic's questions. Questions not reachable from the tree follow, by ID.
    #[must_use]
    pub fn questions_in_display_order(&self) -> Vec<&Question> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.questions.by_id.len());

        for topic in self.topics() {
            for q in self.questions_of(&topic.id) {
                if seen.insert(q.id.as_str()) {
                    out.push(q);
                }
            }
            for st in self.sub_topics_of(&topic.id) {
                for q in self.questions_of(&st.id) {
                    if seen.insert(q.id.as_str()) {
                        out.push(q);
                    }
                }
            }
        }

        out.extend(
            self.questions
                .by_id
                .values()
                .filter(|q| !seen.contains(q.id.as_str())),
        );
        out
    }

    // ── Counts ───────────────────────────────────────────────

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.by_id.len()
    }

    #[must_use]
    pub fn sub_topic_count(&self) -> usize {
        self.sub_topics.by_id.len()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.by_id.len()
    }

    /// All entity IDs of one table, for prefix resolution and suggestions.
    #[must_use]
    pub fn ids(&self, kind: EntityKind) -> Vec<String> {
        match kind {
            EntityKind::Topic => self.topics.by_id.keys().cloned().collect(),
            EntityKind::SubTopic => self.sub_topics.by_id.keys().cloned().collect(),
            EntityKind::Question => self.questions.by_id.keys().cloned().collect(),
        }
    }

    // ── Integrity ────────────────────────────────────────────

    /// Check every cross-table invariant and report all violations.
    ///
    /// An empty result means:
    /// - every order entry has a `byId` entry and every entity is listed
    /// - each entity is listed exactly once, under its own parent
    /// - parents referenced by subtopics and questions exist with the right type
    /// - order lists are only keyed by existing parents
    ///
    /// `similarQuestions` are weak references and are not checked.
    #[must_use]
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        let mut out = Vec::new();

        // Keys must match the entity's own ID
        for (key, t) in &self.topics.by_id {
            if key != &t.id {
                out.push(IntegrityViolation::KeyMismatch { kind: EntityKind::Topic, key: key.clone(), id: t.id.clone() });
            }
        }
        for (key, st) in &self.sub_topics.by_id {
            if key != &st.id {
                out.push(IntegrityViolation::KeyMismatch { kind: EntityKind::SubTopic, key: key.clone(), id: st.id.clone() });
            }
        }
        for (key, q) in &self.questions.by_id {
            if key != &q.id {
                out.push(IntegrityViolation::KeyMismatch { kind: EntityKind::Question, key: key.clone(), id: q.id.clone() });
            }
        }

        // Topics: root order list
        let mut topic_hits: HashMap<&str, usize> = HashMap::new();
        for id in &self.topics.order {
            *topic_hits.entry(id.as_str()).or_default() += 1;
            if !self.topics.by_id.contains_key(id) {
                out.push(IntegrityViolation::MissingEntity { kind: EntityKind::Topic, list: None, id: id.clone() });
            }
        }
        check_listing(EntityKind::Topic, self.topics.by_id.keys(), &topic_hits, &mut out);

        // Subtopics: one list per topic
        let mut sub_hits: HashMap<&str, usize> = HashMap::new();
        for (topic_id, list) in &self.sub_topics.order_by_topic_id {
            if !self.topics.by_id.contains_key(topic_id) {
                out.push(IntegrityViolation::UnknownListKey { kind: EntityKind::SubTopic, key: topic_id.clone() });
            }
            for id in list {
                *sub_hits.entry(id.as_str()).or_default() += 1;
                match self.sub_topics.by_id.get(id) {
                    None => out.push(IntegrityViolation::MissingEntity {
                        kind: EntityKind::SubTopic,
                        list: Some(topic_id.clone()),
                        id: id.clone(),
                    }),
                    Some(st) if &st.topic_id != topic_id => out.push(IntegrityViolation::Misplaced {
                        kind: EntityKind::SubTopic,
                        id: id.clone(),
                        parent_id: st.topic_id.clone(),
                        list: topic_id.clone(),
                    }),
                    Some(_) => {}
                }
            }
        }
        check_listing(EntityKind::SubTopic, self.sub_topics.by_id.keys(), &sub_hits, &mut out);
        for st in self.sub_topics.by_id.values() {
            if !self.topics.by_id.contains_key(&st.topic_id) {
                out.push(IntegrityViolation::DanglingParent {
                    kind: EntityKind::SubTopic,
                    id: st.id.clone(),
                    parent_id: st.topic_id.clone(),
                });
            }
        }

        // Questions: one list per topic or subtopic
        let mut question_hits: HashMap<&str, usize> = HashMap::new();
        for (parent_id, list) in &self.questions.order_by_parent_id {
            if self.parent_type_of(parent_id).is_none() {
                out.push(IntegrityViolation::UnknownListKey { kind: EntityKind::Question, key: parent_id.clone() });
            }
            for id in list {
                *question_hits.entry(id.as_str()).or_default() += 1;
                match self.questions.by_id.get(id) {
                    None => out.push(IntegrityViolation::MissingEntity {
                        kind: EntityKind::Question,
                        list: Some(parent_id.clone()),
                        id: id.clone(),
                    }),
                    Some(q) if &q.parent_id != parent_id => out.push(IntegrityViolation::Misplaced {
                        kind: EntityKind::Question,
                        id: id.clone(),
                        parent_id: q.parent_id.clone(),
                        list: parent_id.clone(),
                    }),
                    Some(_) => {}
                }
            }
        }
        check_listing(EntityKind::Question, self.questions.by_id.keys(), &question_hits, &mut out);
        for q in self.questions.by_id.values() {
            if !self.has_parent(&q.parent_id, q.parent_type) {
                out.push(IntegrityViolation::DanglingParent {
                    kind: EntityKind::Question,
                    id: q.id.clone(),
                    parent_id: q.parent_id.clone(),
                });
            }
        }

        out
    }
}

/// Flag entities listed zero or several times.
fn check_listing<'a>(
    kind: EntityKind,
    ids: impl Iterator<Item = &'a String>,
    hits: &HashMap<&str, usize>,
    out: &mut Vec<IntegrityViolation>,
) {
    for id in ids {
        match hits.get(id.as_str()).copied().unwrap_or(0) {
            0 => out.push(IntegrityViolation::Unlisted { kind, id: id.clone() }),
            1 => {}
            n => out.push(IntegrityViolation::ListedMultipleTimes { kind, id: id.clone(), count: n }),
        }
    }
}

/// A broken cross-table reference found by [`SheetState::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IntegrityViolation {
    /// A `byId` key differs from the entity's own `id`.
    KeyMismatch { kind: EntityKind, key: String, id: String },
    /// An order list names an ID with no `byId` entry.
    MissingEntity { kind: EntityKind, list: Option<String>, id: String },
    /// An entity appears in no order list.
    Unlisted { kind: EntityKind, id: String },
    /// An entity appears more than once across order lists.
    ListedMultipleTimes { kind: EntityKind, id: String, count: usize },
    /// An entity is listed under a parent other than its own.
    Misplaced { kind: EntityKind, id: String, parent_id: String, list: String },
    /// An entity's parent reference does not resolve (or has the wrong type).
    DanglingParent { kind: EntityKind, id: String, parent_id: String },
    /// An order list is keyed by a parent that does not exist.
    UnknownListKey { kind: EntityKind, key: String },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMismatch { kind, key, id } => {
                write!(f, "{} stored under key {key} has id {id}", kind.as_str())
            }
            Self::MissingEntity { kind, list: Some(list), id } => {
                write!(f, "order list {list} references missing {} {id}", kind.as_str())
            }
            Self::MissingEntity { kind, list: None, id } => {
                write!(f, "root order references missing {} {id}", kind.as_str())
            }
            Self::Unlisted { kind, id } => write!(f, "{} {id} is not in any order list", kind.as_str()),
            Self::ListedMultipleTimes { kind, id, count } => {
                write!(f, "{} {id} is listed {count} times", kind.as_str())
            }
            Self::Misplaced { kind, id, parent_id, list } => write!(
                f,
                "{} {id} belongs to {parent_id} but is listed under {list}",
                kind.as_str()
            ),
            Self::DanglingParent { kind, id, parent_id } => {
                write!(f, "{} {id} references missing parent {parent_id}", kind.as_str())
            }
            Self::UnknownListKey { kind, key } => {
                write!(f, "{} order list keyed by unknown parent {key}", kind.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SheetState {
        let mut sheet = SheetState::new();
        let t = Topic { id: "t1".into(), title: "Arrays".into() };
        let st = SubTopic { id: "s1".into(), title: "Two Pointers".into(), topic_id: "t1".into() };
        let q1 = Question::with_id("q1", "t1", ParentType::Topic, "Two Sum");
        let q2 = Question::with_id("q2", "s1", ParentType::SubTopic, "3Sum");

        sheet.topics.by_id.insert(t.id.clone(), t);
        sheet.topics.order.push("t1".into());
        sheet.sub_topics.by_id.insert(st.id.clone(), st);
        sheet.sub_topics.order_by_topic_id.insert("t1".into(), vec!["s1".into()]);
        sheet.questions.by_id.insert("q1".into(), q1);
        sheet.questions.by_id.insert("q2".into(), q2);
        sheet.questions.order_by_parent_id.insert("t1".into(), vec!["q1".into()]);
        sheet.questions.order_by_parent_id.insert("s1".into(), vec!["q2".into()]);
        sheet
    }

    #[test]
    fn test_sample_is_consistent() {
        assert!(sample().check_integrity().is_empty());
    }

    #[test]
    fn test_detects_missing_entity_and_unlisted() {
        let mut sheet = sample();
        sheet.questions.order_by_parent_id.get_mut("t1").unwrap().push("ghost".into());
        sheet.questions.order_by_parent_id.get_mut("s1").unwrap().clear();

        let violations = sheet.check_integrity();
        assert!(violations.contains(&IntegrityViolation::MissingEntity {
            kind: EntityKind::Question,
            list: Some("t1".into()),
            id: "ghost".into(),
        }));
        assert!(violations.contains(&IntegrityViolation::Unlisted {
            kind: EntityKind::Question,
            id: "q2".into(),
        }));
    }

    #[test]
    fn test_detects_duplicates_and_misplacement() {
        let mut sheet = sample();
        sheet.questions.order_by_parent_id.get_mut("s1").unwrap().push("q1".into());

        let violations = sheet.check_integrity();
        assert!(violations.iter().any(|v| matches!(
            v,
            IntegrityViolation::ListedMultipleTimes { id, count: 2, .. } if id == "q1"
        )));
        assert!(violations.iter().any(|v| matches!(
            v,
            IntegrityViolation::Misplaced { id, list, .. } if id == "q1" && list == "s1"
        )));
    }

    #[test]
    fn test_detects_wrong_parent_type() {
        let mut sheet = sample();
        sheet.questions.by_id.get_mut("q1").unwrap().parent_type = ParentType::SubTopic;

        let violations = sheet.check_integrity();
        assert_eq!(
            violations,
            vec![IntegrityViolation::DanglingParent {
                kind: EntityKind::Question,
                id: "q1".into(),
                parent_id: "t1".into(),
            }]
        );
    }

    #[test]
    fn test_display_order_walks_tree() {
        let sheet = sample();
        let ids: Vec<&str> = sheet
            .questions_in_display_order()
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn test_owning_topic_resolves_through_subtopic() {
        let sheet = sample();
        let q2 = sheet.question("q2").unwrap();
        assert_eq!(sheet.owning_topic(q2).map(|t| t.title.as_str()), Some("Arrays"));
    }

    #[test]
    fn test_json_shape_uses_camel_case_tables() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["topics"]["byId"]["t1"].is_object());
        assert_eq!(json["subTopics"]["orderByTopicId"]["t1"][0], "s1");
        assert_eq!(json["questions"]["orderByParentId"]["s1"][0], "q2");
        assert!(json.get("metadata").is_none());
    }
}
