//! Topic command implementations.

use crate::cli::TopicCommands;
use crate::error::{Error, Result};
use crate::model::EntityKind;
use crate::storage::EventType;
use crate::validate::resolve_in;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_sheet, rejected, short_id};

const ENTITY: &str = EntityKind::Topic.as_str();

#[derive(Serialize)]
struct TopicOutput {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicDeleteOutput {
    id: String,
    title: String,
    deleted_sub_topics: usize,
    deleted_questions: usize,
}

/// Execute topic commands.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened, the topic does not exist,
/// or persisting fails.
pub fn execute(
    command: &TopicCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        TopicCommands::Add { title } => add(title, db_path, actor, json),
        TopicCommands::Rename { id, title } => rename(id, title, db_path, actor, json),
        TopicCommands::Delete { id } => delete(id, db_path, actor, json),
        TopicCommands::Move { id, to } => move_topic(id, *to, db_path, actor, json),
    }
}

fn add(title: &str, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("topic title must not be empty".to_string()));
    }

    let mut sheet = open_sheet(db_path, actor)?;
    let id = sheet.workspace.mutate("add_topic", |store, ctx| {
        let id = store.add_topic(title);
        ctx.record_comment(ENTITY, &id, EventType::TopicCreated, title);
        id
    })?;
    sheet.save_ui();

    let position = sheet.sheet().topic_order().len().saturating_sub(1);
    print_topic(
        &TopicOutput {
            id,
            title: title.to_string(),
            position: Some(position),
        },
        "Created topic",
        json,
    )
}

fn rename(
    id: &str,
    title: &str,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("topic title must not be empty".to_string()));
    }

    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::Topic)?;
    let old = sheet.sheet().topic(&id).map(|t| t.title.clone());

    let renamed = sheet.workspace.mutate("edit_topic", |store, ctx| {
        let renamed = store.edit_topic(&id, title);
        if renamed {
            store.set_renaming(None);
            ctx.record_change(ENTITY, &id, EventType::TopicRenamed, old, Some(title.to_string()));
        }
        renamed
    })?;
    if !renamed {
        return Err(rejected("edit_topic", Error::TopicNotFound { id }));
    }
    sheet.save_ui();

    print_topic(
        &TopicOutput {
            id,
            title: title.to_string(),
            position: None,
        },
        "Renamed topic",
        json,
    )
}

fn delete(id: &str, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::Topic)?;

    let before = (sheet.sheet().sub_topic_count(), sheet.sheet().question_count());
    let title = sheet
        .sheet()
        .topic(&id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    let deleted = sheet.workspace.mutate("delete_topic", |store, ctx| {
        let deleted = store.delete_topic(&id);
        if deleted {
            ctx.record_comment(ENTITY, &id, EventType::TopicDeleted, &title);
        }
        deleted
    })?;
    if !deleted {
        return Err(rejected("delete_topic", Error::TopicNotFound { id }));
    }
    sheet.save_ui();

    let output = TopicDeleteOutput {
        id,
        title,
        deleted_sub_topics: before.0 - sheet.sheet().sub_topic_count(),
        deleted_questions: before.1 - sheet.sheet().question_count(),
    };

    if crate::is_silent() {
        println!("{}", output.id);
    } else if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted topic: {} [{}]", output.title, short_id(&output.id));
        println!(
            "  Removed {} subtopics and {} questions",
            output.deleted_sub_topics, output.deleted_questions
        );
    }
    Ok(())
}

fn move_topic(
    id: &str,
    to: usize,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::Topic)?;

    let order = sheet.sheet().topic_order();
    let len = order.len();
    let from = order
        .iter()
        .position(|t| *t == id)
        .ok_or_else(|| Error::TopicNotFound { id: id.clone() })?;
    if to >= len {
        return Err(rejected("reorder_topics", Error::IndexOutOfRange { index: to, len }));
    }

    sheet.workspace.mutate("reorder_topics", |store, ctx| {
        if store.reorder_topics(from, to) && from != to {
            ctx.record_change(
                ENTITY,
                &id,
                EventType::TopicMoved,
                Some(from.to_string()),
                Some(to.to_string()),
            );
        }
    })?;

    let title = sheet
        .sheet()
        .topic(&id)
        .map(|t| t.title.clone())
        .unwrap_or_default();
    print_topic(
        &TopicOutput {
            id,
            title,
            position: Some(to),
        },
        "Moved topic",
        json,
    )
}

fn print_topic(output: &TopicOutput, verb: &str, json: bool) -> Result<()> {
    if crate::is_silent() {
        println!("{}", output.id);
    } else if json {
        println!("{}", serde_json::to_string(output)?);
    } else {
        match output.position {
            Some(pos) => println!("{verb}: {} [{}] at position {pos}", output.title, short_id(&output.id)),
            None => println!("{verb}: {} [{}]", output.title, short_id(&output.id)),
        }
    }
    Ok(())
}
