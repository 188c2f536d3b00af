//! Audit event storage and retrieval.
//!
//! Every persisted sheet mutation records one or more events, which back
//! the `history` command.

use rusqlite::{Connection, Result};
use serde::Serialize;

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // Topic events
    TopicCreated,
    TopicRenamed,
    TopicDeleted,
    TopicMoved,

    // Subtopic events
    SubTopicCreated,
    SubTopicRenamed,
    SubTopicDeleted,
    SubTopicMoved,

    // Question events
    QuestionCreated,
    QuestionUpdated,
    QuestionDeleted,
    QuestionMoved,

    // Whole-sheet events
    SheetSeeded,
    SheetImported,
    SheetCleared,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TopicCreated => "topic_created",
            Self::TopicRenamed => "topic_renamed",
            Self::TopicDeleted => "topic_deleted",
            Self::TopicMoved => "topic_moved",
            Self::SubTopicCreated => "subtopic_created",
            Self::SubTopicRenamed => "subtopic_renamed",
            Self::SubTopicDeleted => "subtopic_deleted",
            Self::SubTopicMoved => "subtopic_moved",
            Self::QuestionCreated => "question_created",
            Self::QuestionUpdated => "question_updated",
            Self::QuestionDeleted => "question_deleted",
            Self::QuestionMoved => "question_moved",
            Self::SheetSeeded => "sheet_seeded",
            Self::SheetImported => "sheet_imported",
            Self::SheetCleared => "sheet_cleared",
        }
    }

    /// Parse a stored event type. Unknown strings yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "topic_created" => Self::TopicCreated,
            "topic_renamed" => Self::TopicRenamed,
            "topic_deleted" => Self::TopicDeleted,
            "topic_moved" => Self::TopicMoved,
            "subtopic_created" => Self::SubTopicCreated,
            "subtopic_renamed" => Self::SubTopicRenamed,
            "subtopic_deleted" => Self::SubTopicDeleted,
            "subtopic_moved" => Self::SubTopicMoved,
            "question_created" => Self::QuestionCreated,
            "question_updated" => Self::QuestionUpdated,
            "question_deleted" => Self::QuestionDeleted,
            "question_moved" => Self::QuestionMoved,
            "sheet_seeded" => Self::SheetSeeded,
            "sheet_imported" => Self::SheetImported,
            "sheet_cleared" => Self::SheetCleared,
            _ => return None,
        })
    }
}

/// An audit event record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            old_value: None,
            new_value: None,
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add old/new values for field change tracking.
    #[must_use]
    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    /// Add a comment to the event.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.old_value,
            event.new_value,
            event.comment,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const EVENT_COLUMNS: &str =
    "id, entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at";

fn map_event_row(row: &rusqlite::Row) -> Result<Option<Event>> {
    let Some(event_type) = EventType::parse(row.get::<_, String>(3)?.as_str()) else {
        return Ok(None);
    };
    Ok(Some(Event {
        id: row.get(0)?,
        entity_type: row.get(1)?,
        entity_id: row.get(2)?,
        event_type,
        actor: row.get(4)?,
        old_value: row.get(5)?,
        new_value: row.get(6)?,
        comment: row.get(7)?,
        created_at: row.get(8)?,
    }))
}

/// Get events for an entity, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
    limit: Option<u32>,
) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(100);
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY created_at DESC, id DESC
         LIMIT ?3"
    ))?;

    let rows = stmt.query_map(rusqlite::params![entity_type, entity_id, limit], map_event_row)?;
    rows.filter_map(Result::transpose).collect()
}

/// Get the most recent events across all entities, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn recent_events(conn: &Connection, limit: u32) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC LIMIT ?1"
    ))?;

    let rows = stmt.query_map([limit], map_event_row)?;
    rows.filter_map(Result::transpose).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_get() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let event = Event::new("topic", "t_123", EventType::TopicCreated, "test-actor")
            .with_comment("Arrays");

        let id = insert_event(&conn, &event).unwrap();
        assert!(id > 0);

        let events = get_events(&conn, "topic", "t_123", Some(10)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, "test-actor");
        assert_eq!(events[0].comment, Some("Arrays".to_string()));
        assert_eq!(events[0].event_type, EventType::TopicCreated);
    }

    #[test]
    fn test_recent_events_skips_unknown_types() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        insert_event(&conn, &Event::new("question", "q1", EventType::QuestionCreated, "a")).unwrap();
        conn.execute(
            "INSERT INTO events (entity_type, entity_id, event_type, actor, created_at)
             VALUES ('x', 'y', 'retired_event', 'a', 0)",
            [],
        )
        .unwrap();
        insert_event(&conn, &Event::new("question", "q1", EventType::QuestionDeleted, "a")).unwrap();

        let events = recent_events(&conn, 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::QuestionDeleted);
    }

    #[test]
    fn test_event_type_parse_roundtrip() {
        for ty in [EventType::SubTopicMoved, EventType::SheetCleared, EventType::QuestionUpdated] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("nope"), None);
    }
}
