//! Seed transform: hierarchical sheet payload → normalized snapshot.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::model::{
    new_id, Difficulty, ParentType, Question, QuestionStatus, SheetMetadata, SheetState, SubTopic,
    Topic,
};
use crate::sync::types::{RawEnvelope, RawQuestion, RawSheetData, SeedStats, SyncError, SyncResult};

/// Sample sheet bundled with the binary, used when no seed source is given.
const BUNDLED_SEED: &str = include_str!("../../assets/sample_sheet.json");

/// Builds the normalized tables while walking the raw question list.
struct SeedBuilder {
    state: SheetState,
    topic_ids: HashMap<String, String>,
    sub_topic_ids: HashMap<String, String>,
    used_question_ids: HashSet<String>,
    stats: SeedStats,
}

impl SeedBuilder {
    fn new() -> Self {
        Self {
            state: SheetState::new(),
            topic_ids: HashMap::new(),
            sub_topic_ids: HashMap::new(),
            used_question_ids: HashSet::new(),
            stats: SeedStats::default(),
        }
    }

    /// Resolve a topic by name, creating it at the end of the order.
    fn topic(&mut self, name: &str) -> String {
        if let Some(id) = self.topic_ids.get(name) {
            return id.clone();
        }
        let topic = Topic::new(name);
        let id = topic.id.clone();
        self.state.topics.by_id.insert(id.clone(), topic);
        self.state.topics.order.push(id.clone());
        self.state.sub_topics.order_by_topic_id.insert(id.clone(), Vec::new());
        self.state.questions.order_by_parent_id.insert(id.clone(), Vec::new());
        self.topic_ids.insert(name.to_string(), id.clone());
        self.stats.topics += 1;
        id
    }

    /// Resolve a subtopic keyed by `topic:subtopic`, creating it under `topic_id`.
    fn sub_topic(&mut self, topic_name: &str, topic_id: &str, name: &str) -> String {
        let key = format!("{topic_name}:{name}");
        if let Some(id) = self.sub_topic_ids.get(&key) {
            return id.clone();
        }
        let sub_topic = SubTopic::new(topic_id, name);
        let id = sub_topic.id.clone();
        self.state.sub_topics.by_id.insert(id.clone(), sub_topic);
        self.state
            .sub_topics
            .order_by_topic_id
            .entry(topic_id.to_string())
            .or_default()
            .push(id.clone());
        self.state.questions.order_by_parent_id.insert(id.clone(), Vec::new());
        self.sub_topic_ids.insert(key, id.clone());
        self.stats.sub_topics += 1;
        id
    }

    /// Raw `_id` when present and unused, a fresh ID otherwise.
    fn question_id(&mut self, raw: Option<&str>) -> String {
        let id = match raw {
            Some(id) if !id.is_empty() && !self.used_question_ids.contains(id) => id.to_string(),
            _ => {
                self.stats.regenerated_ids += 1;
                new_id()
            }
        };
        self.used_question_ids.insert(id.clone());
        id
    }

    fn add_question(&mut self, raw: RawQuestion) {
        let topic_id = self.topic(&raw.topic);
        let (parent_id, parent_type) = match raw.sub_topic.as_deref() {
            Some(name) if !name.is_empty() => {
                (self.sub_topic(&raw.topic, &topic_id, name), ParentType::SubTopic)
            }
            _ => (topic_id, ParentType::Topic),
        };

        let id = self.question_id(raw.id.as_deref());
        let question = map_question(&id, raw, &parent_id, parent_type);

        self.state.questions.by_id.insert(id.clone(), question);
        self.state
            .questions
            .order_by_parent_id
            .entry(parent_id)
            .or_default()
            .push(id);
        self.stats.questions += 1;
    }
}

fn map_question(id: &str, raw: RawQuestion, parent_id: &str, parent_type: ParentType) -> Question {
    let r = raw.question_id.unwrap_or_default();

    let mut q = Question::with_id(id, parent_id, parent_type, raw.title);
    q.status = if raw.is_solved {
        QuestionStatus::Done
    } else {
        QuestionStatus::Todo
    };
    q.difficulty = r.difficulty.as_deref().and_then(Difficulty::parse);
    q.video_url = raw.resource;
    q.link = r.problem_url;
    q.tags = Some(r.topics.unwrap_or_default());
    q.notes = Some(String::new());
    q.bookmarked = Some(false);
    q.platform = r.platform;
    q.platform_id = r.platform_id;
    q.verified = r.verified;
    q.slug = r.slug;
    q.description = r.description;
    q.company_tags = Some(r.company_tags.unwrap_or_default());
    q.similar_questions = Some(r.similar_questions.unwrap_or_default());
    q.session = raw.session;
    q.is_public = raw.is_public;
    q.hotness = raw.hotness;
    q.rank = raw.rank;
    q.popular_sheets = Some(raw.popular_sheets.unwrap_or_default());
    q
}

/// Convert a raw sheet payload into a normalized snapshot.
///
/// Topics named in `config.topicOrder` come first in that order, topics
/// only referenced by questions follow in first-seen order.
#[must_use]
pub fn transform_raw(data: RawSheetData) -> (SheetState, SeedStats) {
    let RawSheetData { sheet, questions } = data;
    let mut builder = SeedBuilder::new();

    builder.state.metadata = Some(SheetMetadata {
        title: sheet.name,
        description: sheet.description,
        banner: sheet.banner,
        author: sheet.author,
        followers: sheet.followers,
    });

    for name in &sheet.config.topic_order {
        builder.topic(name);
    }
    for raw in questions {
        builder.add_question(raw);
    }

    debug!(
        topics = builder.stats.topics,
        sub_topics = builder.stats.sub_topics,
        questions = builder.stats.questions,
        regenerated_ids = builder.stats.regenerated_ids,
        "Transformed raw sheet"
    );
    (builder.state, builder.stats)
}

/// Parse seed file content: an API envelope `{success, data}` or a bare
/// `{sheet, questions}` payload.
///
/// # Errors
///
/// Returns an error if the content is not JSON or has no sheet payload.
pub fn parse_seed(content: &str) -> SyncResult<RawSheetData> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if value.get("data").is_some() {
        let envelope: RawEnvelope = serde_json::from_value(value)?;
        return envelope
            .data
            .ok_or_else(|| SyncError::UnrecognizedFormat("envelope has no data".to_string()));
    }
    if value.get("sheet").is_some() || value.get("questions").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    Err(SyncError::UnrecognizedFormat(
        "expected {data: {sheet, questions}} or {sheet, questions}".to_string(),
    ))
}

/// Read and transform a seed file.
///
/// # Errors
///
/// Returns an error if the file is missing or not a sheet payload.
pub fn seed_from_file(path: &Path) -> SyncResult<(SheetState, SeedStats)> {
    if !path.exists() {
        return Err(SyncError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let raw = parse_seed(&content)?;
    let result = transform_raw(raw);
    info!(path = %path.display(), questions = result.1.questions, "Loaded seed file");
    Ok(result)
}

/// Transform the sample sheet bundled with the binary.
///
/// # Errors
///
/// Returns an error only if the bundled asset is malformed.
pub fn seed_bundled() -> SyncResult<(SheetState, SeedStats)> {
    let raw = parse_seed(BUNDLED_SEED)?;
    Ok(transform_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::{RawQuestionRef, RawSheet, RawSheetConfig};

    fn raw(title: &str, topic: &str, sub_topic: Option<&str>) -> RawQuestion {
        RawQuestion {
            title: title.to_string(),
            topic: topic.to_string(),
            sub_topic: sub_topic.map(ToString::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_maps_question_fields() {
        let mut q = raw("Two Sum", "Arrays", None);
        q.is_solved = true;
        q.question_id = Some(RawQuestionRef {
            difficulty: Some("EASY".to_string()),
            platform: Some("LeetCode".to_string()),
            problem_url: Some("https://x".to_string()),
            ..Default::default()
        });

        let (state, stats) = transform_raw(RawSheetData {
            sheet: RawSheet::default(),
            questions: vec![q],
        });

        assert_eq!(stats.questions, 1);
        let question = state.all_questions().next().unwrap();
        assert_eq!(question.status, QuestionStatus::Done);
        assert_eq!(question.difficulty, Some(Difficulty::Easy));
        assert_eq!(question.platform.as_deref(), Some("LeetCode"));
        assert_eq!(question.link.as_deref(), Some("https://x"));
        assert_eq!(question.tags, Some(vec![]));
        assert_eq!(question.notes.as_deref(), Some(""));
        assert_eq!(question.bookmarked, Some(false));
        assert_eq!(question.parent_type, ParentType::Topic);
        assert!(state.check_integrity().is_empty());
    }

    #[test]
    fn test_unknown_difficulty_is_unset() {
        let mut q = raw("Q", "T", None);
        q.question_id = Some(RawQuestionRef {
            difficulty: Some("Basic".to_string()),
            ..Default::default()
        });
        let (state, _) = transform_raw(RawSheetData {
            sheet: RawSheet::default(),
            questions: vec![q],
        });
        assert_eq!(state.all_questions().next().unwrap().difficulty, None);
    }

    #[test]
    fn test_topic_order_from_config_then_first_seen() {
        let data = RawSheetData {
            sheet: RawSheet {
                name: "Sheet".to_string(),
                config: RawSheetConfig {
                    topic_order: vec!["Graphs".to_string(), "Arrays".to_string()],
                },
                ..Default::default()
            },
            questions: vec![
                raw("a", "Arrays", None),
                raw("b", "DP", None),
                raw("c", "Graphs", Some("BFS")),
                raw("d", "Graphs", Some("BFS")),
                raw("e", "Arrays", Some("Basics")),
            ],
        };

        let (state, stats) = transform_raw(data);
        let titles: Vec<&str> = state.topics().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Graphs", "Arrays", "DP"]);
        assert_eq!(stats.sub_topics, 2);
        assert_eq!(state.metadata().unwrap().title, "Sheet");

        let graphs = &state.topic_order()[0];
        let bfs = &state.sub_topic_order(graphs)[0];
        assert_eq!(state.question_order(bfs).len(), 2);
        assert!(state.check_integrity().is_empty());
    }

    #[test]
    fn test_subtopics_keyed_by_topic_and_name() {
        let (state, stats) = transform_raw(RawSheetData {
            sheet: RawSheet::default(),
            questions: vec![raw("a", "Arrays", Some("Basics")), raw("b", "Strings", Some("Basics"))],
        });
        assert_eq!(stats.sub_topics, 2);
        assert_eq!(state.sub_topic_count(), 2);
    }

    #[test]
    fn test_duplicate_raw_ids_are_regenerated() {
        let mut a = raw("a", "T", None);
        a.id = Some("dup".to_string());
        let mut b = raw("b", "T", None);
        b.id = Some("dup".to_string());

        let (state, stats) = transform_raw(RawSheetData {
            sheet: RawSheet::default(),
            questions: vec![a, b],
        });
        assert_eq!(state.question_count(), 2);
        assert!(state.question("dup").is_some());
        assert_eq!(stats.regenerated_ids, 1);
        assert!(state.check_integrity().is_empty());
    }

    #[test]
    fn test_parse_seed_accepts_envelope_and_bare() {
        let bare = r#"{"sheet":{"name":"S","config":{"topicOrder":[]}},"questions":[]}"#;
        assert_eq!(parse_seed(bare).unwrap().sheet.name, "S");

        let wrapped = format!(r#"{{"success":true,"data":{bare}}}"#);
        assert_eq!(parse_seed(&wrapped).unwrap().sheet.name, "S");

        assert!(matches!(
            parse_seed(r#"{"topics":{}}"#),
            Err(SyncError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_parse_seed_tolerates_null_and_mistyped_values() {
        let content = r#"{"success":true,"data":{
            "sheet":{"name":"S","config":{"topicOrder":null}},
            "questions":[
                {"_id":"q1","title":"Two Sum","topic":"Arrays","isSolved":null,"questionId":"65ab12"},
                {"_id":"q2","title":"3Sum","topic":"Arrays","isSolved":true,"rank":1.5,
                 "questionId":{"difficulty":"MEDIUM","topics":null}}
            ]}}"#;

        let (state, stats) = transform_raw(parse_seed(content).unwrap());
        assert_eq!(stats.topics, 1);
        assert_eq!(stats.questions, 2);

        let first = state.question("q1").unwrap();
        assert_eq!(first.status, QuestionStatus::Todo);
        assert_eq!(first.difficulty, None);
        assert_eq!(first.link, None);

        let second = state.question("q2").unwrap();
        assert_eq!(second.status, QuestionStatus::Done);
        assert_eq!(second.difficulty, Some(Difficulty::Medium));
        assert_eq!(second.rank, Some(1.5));
        assert_eq!(second.tags, Some(vec![]));
        assert!(state.check_integrity().is_empty());
    }

    #[test]
    fn test_bundled_seed_is_consistent() {
        let (state, stats) = seed_bundled().unwrap();
        assert!(stats.questions > 0);
        assert!(state.check_integrity().is_empty());
    }

    #[test]
    fn test_seed_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = seed_from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SyncError::FileNotFound(_)));
    }
}
