//! Audit history of sheet mutations.

use crate::error::Result;
use crate::storage::Event;
use crate::validate::{normalize_kind, resolve_in};
use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_sheet, short_id};

#[derive(Serialize)]
struct HistoryOutput {
    count: usize,
    events: Vec<Event>,
}

/// Execute the history command.
///
/// With an entity ID only that entity's events are shown; the ID is matched
/// against the live sheet first, so deleted entities need their full ID.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened, the kind is unknown, or
/// the query fails.
pub fn execute(
    id: Option<&str>,
    kind: &str,
    limit: u32,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let sheet = open_sheet(db_path, actor)?;
    let storage = sheet.workspace.storage();

    let events = match id {
        Some(id) => {
            let kind = normalize_kind(kind)?;
            let id = resolve_in(sheet.sheet(), id, kind).unwrap_or_else(|_| id.to_string());
            storage.entity_events(kind.as_str(), &id, limit)?
        }
        None => storage.list_events(limit)?,
    };

    if crate::is_csv() {
        println!("created_at,actor,event_type,entity_type,entity_id,old_value,new_value,comment");
        for e in &events {
            println!(
                "{},{},{},{},{},{},{},{}",
                timestamp(e.created_at),
                crate::csv_escape(&e.actor),
                e.event_type.as_str(),
                e.entity_type,
                e.entity_id,
                crate::csv_escape(e.old_value.as_deref().unwrap_or("")),
                crate::csv_escape(e.new_value.as_deref().unwrap_or("")),
                crate::csv_escape(e.comment.as_deref().unwrap_or("")),
            );
        }
    } else if json {
        let output = HistoryOutput {
            count: events.len(),
            events,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if events.is_empty() {
        println!("No history yet.");
    } else {
        for e in &events {
            println!(
                "{}  {:<10} {:<18} {} [{}] {}",
                timestamp(e.created_at).dimmed(),
                e.actor,
                e.event_type.as_str(),
                e.entity_type,
                short_id(&e.entity_id),
                detail(e)
            );
        }
    }

    Ok(())
}

fn timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn detail(event: &Event) -> String {
    match (&event.old_value, &event.new_value, &event.comment) {
        (old, Some(new), _) => format!("{} → {new}", old.as_deref().unwrap_or("∅")),
        (_, None, Some(comment)) => comment.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EventType;

    #[test]
    fn test_detail() {
        let e = Event::new("question", "q1", EventType::QuestionUpdated, "me")
            .with_values(Some("todo".to_string()), Some("done".to_string()));
        assert_eq!(detail(&e), "todo → done");

        let e = Event::new("topic", "t1", EventType::TopicCreated, "me").with_comment("Arrays");
        assert_eq!(detail(&e), "Arrays");

        let e = Event::new("sheet", "sheet", EventType::SheetSeeded, "me");
        assert_eq!(detail(&e), "");
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(0), "1970-01-01 00:00:00");
    }
}
