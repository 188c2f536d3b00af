//! Input validation and ID resolution for the CLI.
//!
//! Provides O(1) validation sets and synonym maps so users can type natural
//! words for statuses, difficulties and entity kinds. Three-tier resolution:
//! exact match → synonym lookup → error with suggestion.
//!
//! Entity IDs are UUIDs, so commands also accept any unique prefix.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::model::{Difficulty, EntityKind, ParentType, QuestionStatus, SheetState};

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_STATUSES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["todo", "done"].into_iter().collect());

pub static VALID_DIFFICULTIES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["easy", "medium", "hard"].into_iter().collect());

pub static VALID_KINDS: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["topic", "subtopic", "question"].into_iter().collect());

// ── Synonym maps ─────────────────────────────────────────────

pub static STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("solved", "done"),
        ("complete", "done"),
        ("completed", "done"),
        ("finished", "done"),
        ("closed", "done"),
        ("open", "todo"),
        ("pending", "todo"),
        ("unsolved", "todo"),
        ("new", "todo"),
    ]
    .into_iter()
    .collect()
});

pub static DIFFICULTY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("e", "easy"),
        ("m", "medium"),
        ("med", "medium"),
        ("h", "hard"),
    ]
    .into_iter()
    .collect()
});

pub static KIND_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("t", "topic"),
        ("topics", "topic"),
        ("s", "subtopic"),
        ("sub", "subtopic"),
        ("sub-topic", "subtopic"),
        ("sub_topic", "subtopic"),
        ("subtopics", "subtopic"),
        ("q", "question"),
        ("questions", "question"),
    ]
    .into_iter()
    .collect()
});

/// Three-tier lookup shared by the normalizers.
fn normalize(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> std::result::Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if valid.contains(lower.as_str()) {
        return Ok(lower);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = synonyms.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, valid, synonyms);
    Err((input.to_string(), suggestion))
}

fn with_suggestion(input: &str, suggestion: Option<String>) -> String {
    match suggestion {
        Some(s) => format!("'{input}' (did you mean '{s}'?)"),
        None => format!("'{input}'"),
    }
}

/// Normalize a status string to a [`QuestionStatus`].
///
/// # Errors
///
/// Returns `InvalidStatus` if the input matches no status or synonym.
pub fn normalize_status(input: &str) -> Result<QuestionStatus> {
    match normalize(input, &VALID_STATUSES, &STATUS_SYNONYMS) {
        Ok(s) if s == "done" => Ok(QuestionStatus::Done),
        Ok(_) => Ok(QuestionStatus::Todo),
        Err((input, suggestion)) => Err(Error::InvalidStatus(with_suggestion(&input, suggestion))),
    }
}

/// Normalize a difficulty string to a [`Difficulty`].
///
/// # Errors
///
/// Returns `InvalidDifficulty` if the input matches no difficulty or synonym.
pub fn normalize_difficulty(input: &str) -> Result<Difficulty> {
    let canonical = normalize(input, &VALID_DIFFICULTIES, &DIFFICULTY_SYNONYMS).map_err(
        |(input, suggestion)| Error::InvalidDifficulty(with_suggestion(&input, suggestion)),
    )?;
    Difficulty::parse(&canonical).ok_or_else(|| Error::InvalidDifficulty(input.to_string()))
}

/// Normalize an entity kind (`topic`, `subtopic`, `question`).
///
/// # Errors
///
/// Returns `InvalidArgument` if the input names no kind.
pub fn normalize_kind(input: &str) -> Result<EntityKind> {
    match normalize(input, &VALID_KINDS, &KIND_SYNONYMS) {
        Ok(s) => Ok(match s.as_str() {
            "topic" => EntityKind::Topic,
            "subtopic" => EntityKind::SubTopic,
            _ => EntityKind::Question,
        }),
        Err((input, suggestion)) => Err(Error::InvalidArgument(format!(
            "unknown entity kind {}",
            with_suggestion(&input, suggestion)
        ))),
    }
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 2 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let shown = synonyms.get(v).copied().unwrap_or(v);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}

// ── ID resolution ────────────────────────────────────────────

fn not_found(kind: EntityKind, id: &str, similar: Vec<String>) -> Error {
    let id = id.to_string();
    match (kind, similar.is_empty()) {
        (EntityKind::Topic, true) => Error::TopicNotFound { id },
        (EntityKind::Topic, false) => Error::TopicNotFoundSimilar { id, similar },
        (EntityKind::SubTopic, true) => Error::SubTopicNotFound { id },
        (EntityKind::SubTopic, false) => Error::SubTopicNotFoundSimilar { id, similar },
        (EntityKind::Question, true) => Error::QuestionNotFound { id },
        (EntityKind::Question, false) => Error::QuestionNotFoundSimilar { id, similar },
    }
}

/// Resolve a full ID or unique prefix among `ids`.
///
/// # Errors
///
/// Returns `AmbiguousId` if the prefix matches more than one ID, or the
/// kind's not-found error (with close matches, if any) when nothing matches.
pub fn resolve_id(input: &str, ids: &[String], kind: EntityKind) -> Result<String> {
    let input = input.trim();
    if ids.iter().any(|id| id == input) {
        return Ok(input.to_string());
    }

    let matches: Vec<String> = if input.is_empty() {
        Vec::new()
    } else {
        ids.iter().filter(|id| id.starts_with(input)).cloned().collect()
    };

    match matches.len() {
        1 => Ok(matches.into_iter().next().unwrap_or_default()),
        0 => Err(not_found(kind, input, find_similar_ids(input, ids, 3))),
        _ => Err(Error::AmbiguousId {
            prefix: input.to_string(),
            matches,
        }),
    }
}

/// Resolve an ID of the given kind in the sheet.
///
/// # Errors
///
/// See [`resolve_id`].
pub fn resolve_in(sheet: &SheetState, input: &str, kind: EntityKind) -> Result<String> {
    resolve_id(input, &sheet.ids(kind), kind)
}

/// Resolve a question parent, trying topics first, then subtopics.
///
/// # Errors
///
/// Returns `AmbiguousId` if the prefix matches across or within kinds, or
/// `ParentNotFound` if it matches no container.
pub fn resolve_parent(sheet: &SheetState, input: &str) -> Result<(String, ParentType)> {
    let topic = resolve_in(sheet, input, EntityKind::Topic);
    let sub_topic = resolve_in(sheet, input, EntityKind::SubTopic);

    match (topic, sub_topic) {
        (Ok(t), Ok(s)) if t == s => Ok((t, ParentType::Topic)),
        (Ok(t), Ok(s)) => Err(Error::AmbiguousId {
            prefix: input.to_string(),
            matches: vec![t, s],
        }),
        (Ok(t), Err(_)) => Ok((t, ParentType::Topic)),
        (Err(_), Ok(s)) => Ok((s, ParentType::SubTopic)),
        (Err(e @ Error::AmbiguousId { .. }), _) | (_, Err(e @ Error::AmbiguousId { .. })) => Err(e),
        (Err(_), Err(_)) => Err(Error::ParentNotFound {
            id: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status("done").unwrap(), QuestionStatus::Done);
        assert_eq!(normalize_status("Solved").unwrap(), QuestionStatus::Done);
        assert_eq!(normalize_status("TODO").unwrap(), QuestionStatus::Todo);
        assert_eq!(normalize_status("pending").unwrap(), QuestionStatus::Todo);
        assert!(matches!(normalize_status("nonsense"), Err(Error::InvalidStatus(_))));
    }

    #[test]
    fn test_status_typo_suggests() {
        let Err(Error::InvalidStatus(msg)) = normalize_status("dne") else {
            panic!("expected InvalidStatus");
        };
        assert!(msg.contains("did you mean 'done'"));
    }

    #[test]
    fn test_normalize_difficulty() {
        assert_eq!(normalize_difficulty("EASY").unwrap(), Difficulty::Easy);
        assert_eq!(normalize_difficulty("med").unwrap(), Difficulty::Medium);
        assert_eq!(normalize_difficulty("h").unwrap(), Difficulty::Hard);
        assert!(matches!(normalize_difficulty("extreme"), Err(Error::InvalidDifficulty(_))));
    }

    #[test]
    fn test_normalize_kind() {
        assert_eq!(normalize_kind("topic").unwrap(), EntityKind::Topic);
        assert_eq!(normalize_kind("sub-topic").unwrap(), EntityKind::SubTopic);
        assert_eq!(normalize_kind("q").unwrap(), EntityKind::Question);
        assert!(matches!(normalize_kind("sheet"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar_ids() {
        let ids = vec!["a1b2".to_string(), "a1b3".to_string(), "zzzzzzzz".to_string()];
        let result = find_similar_ids("a1b1", &ids, 3);
        assert_eq!(result, vec!["a1b2".to_string(), "a1b3".to_string()]);
    }

    #[test]
    fn test_resolve_id_prefix() {
        let ids = vec!["abc-111".to_string(), "abd-222".to_string()];
        assert_eq!(resolve_id("abc-111", &ids, EntityKind::Topic).unwrap(), "abc-111");
        assert_eq!(resolve_id("abd", &ids, EntityKind::Topic).unwrap(), "abd-222");
        assert!(matches!(
            resolve_id("ab", &ids, EntityKind::Topic),
            Err(Error::AmbiguousId { matches, .. }) if matches.len() == 2
        ));
        assert!(matches!(
            resolve_id("xyz-999", &ids, EntityKind::Question),
            Err(Error::QuestionNotFound { .. })
        ));
        assert!(matches!(
            resolve_id("abc-112", &ids, EntityKind::SubTopic),
            Err(Error::SubTopicNotFoundSimilar { .. })
        ));
    }

    #[test]
    fn test_resolve_parent() {
        let mut store = Store::new();
        let t = store.add_topic("Arrays");
        let s = store.add_sub_topic(&t, "Two Pointers").unwrap();
        let sheet = store.sheet();

        assert_eq!(resolve_parent(sheet, &t).unwrap(), (t.clone(), ParentType::Topic));
        assert_eq!(resolve_parent(sheet, &s).unwrap(), (s.clone(), ParentType::SubTopic));
        assert!(matches!(
            resolve_parent(sheet, "no-such-parent"),
            Err(Error::ParentNotFound { .. })
        ));
    }
}
