//! Subtopic command implementations.

use crate::cli::SubTopicCommands;
use crate::error::{Error, Result};
use crate::model::EntityKind;
use crate::storage::EventType;
use crate::validate::resolve_in;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_sheet, rejected, short_id, OpenSheet};

const ENTITY: &str = EntityKind::SubTopic.as_str();

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubTopicOutput {
    id: String,
    title: String,
    topic_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_questions: Option<usize>,
}

/// Execute subtopic commands.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened, an ID does not resolve,
/// or persisting fails.
pub fn execute(
    command: &SubTopicCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        SubTopicCommands::Add { topic, title } => add(topic, title, db_path, actor, json),
        SubTopicCommands::Rename { id, title } => rename(id, title, db_path, actor, json),
        SubTopicCommands::Delete { id } => delete(id, db_path, actor, json),
        SubTopicCommands::Move { id, topic, to } => {
            move_sub_topic(id, topic.as_deref(), *to, db_path, actor, json)
        }
    }
}

fn non_empty(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("subtopic title must not be empty".to_string()));
    }
    Ok(title)
}

fn add(
    topic: &str,
    title: &str,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let title = non_empty(title)?;
    let mut sheet = open_sheet(db_path, actor)?;
    let topic_id = resolve_in(sheet.sheet(), topic, EntityKind::Topic)?;

    let id = sheet.workspace.mutate("add_sub_topic", |store, ctx| {
        let id = store.add_sub_topic(&topic_id, title)?;
        ctx.record_comment(ENTITY, &id, EventType::SubTopicCreated, title);
        Some(id)
    })?;
    let Some(id) = id else {
        return Err(rejected("add_sub_topic", Error::TopicNotFound { id: topic_id }));
    };
    sheet.save_ui();

    let position = sheet.sheet().sub_topic_order(&topic_id).len().saturating_sub(1);
    print_sub_topic(&sheet, id, Some(position), "Created subtopic", json)
}

fn rename(
    id: &str,
    title: &str,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let title = non_empty(title)?;
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::SubTopic)?;
    let old = sheet.sheet().sub_topic(&id).map(|st| st.title.clone());

    let renamed = sheet.workspace.mutate("edit_sub_topic", |store, ctx| {
        let renamed = store.edit_sub_topic(&id, title);
        if renamed {
            store.set_renaming(None);
            ctx.record_change(ENTITY, &id, EventType::SubTopicRenamed, old, Some(title.to_string()));
        }
        renamed
    })?;
    if !renamed {
        return Err(rejected("edit_sub_topic", Error::SubTopicNotFound { id }));
    }
    sheet.save_ui();

    print_sub_topic(&sheet, id, None, "Renamed subtopic", json)
}

fn delete(id: &str, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::SubTopic)?;

    let Some(sub_topic) = sheet.sheet().sub_topic(&id).cloned() else {
        return Err(Error::SubTopicNotFound { id });
    };
    let questions = sheet.sheet().question_order(&id).len();

    let deleted = sheet.workspace.mutate("delete_sub_topic", |store, ctx| {
        let deleted = store.delete_sub_topic(&id);
        if deleted {
            ctx.record_comment(ENTITY, &id, EventType::SubTopicDeleted, &sub_topic.title);
        }
        deleted
    })?;
    if !deleted {
        return Err(rejected("delete_sub_topic", Error::SubTopicNotFound { id }));
    }
    sheet.save_ui();

    let output = SubTopicOutput {
        id,
        title: sub_topic.title,
        topic_id: sub_topic.topic_id,
        position: None,
        deleted_questions: Some(questions),
    };
    if crate::is_silent() {
        println!("{}", output.id);
    } else if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted subtopic: {} [{}]", output.title, short_id(&output.id));
        println!("  Removed {questions} questions");
    }
    Ok(())
}

/// Reorder within the current topic, or move to another topic when
/// `to_topic` names a different one.
fn move_sub_topic(
    id: &str,
    to_topic: Option<&str>,
    to: Option<usize>,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::SubTopic)?;
    let from_topic = sheet
        .sheet()
        .sub_topic(&id)
        .map(|st| st.topic_id.clone())
        .ok_or_else(|| Error::SubTopicNotFound { id: id.clone() })?;
    let to_topic = match to_topic {
        Some(t) => resolve_in(sheet.sheet(), t, EntityKind::Topic)?,
        None => from_topic.clone(),
    };

    let position = if to_topic == from_topic {
        let Some(to) = to else {
            return Err(Error::InvalidArgument(
                "give --to for a reorder, or --topic to move to another topic".to_string(),
            ));
        };
        let order = sheet.sheet().sub_topic_order(&from_topic);
        let len = order.len();
        let from = order.iter().position(|st| *st == id).unwrap_or(len);
        if to >= len || from >= len {
            return Err(rejected("reorder_entity", Error::IndexOutOfRange { index: to, len }));
        }

        sheet.workspace.mutate("reorder_entity", |store, ctx| {
            if store.reorder_entity(EntityKind::SubTopic, Some(from_topic.as_str()), from, to) && from != to {
                ctx.record_change(
                    ENTITY,
                    &id,
                    EventType::SubTopicMoved,
                    Some(from.to_string()),
                    Some(to.to_string()),
                );
            }
        })?;
        to
    } else {
        let index = to.unwrap_or(usize::MAX);
        let moved = sheet.workspace.mutate("move_sub_topic", |store, ctx| {
            let moved = store.move_sub_topic(&id, &from_topic, &to_topic, index);
            if moved {
                ctx.record_change(
                    ENTITY,
                    &id,
                    EventType::SubTopicMoved,
                    Some(from_topic.clone()),
                    Some(to_topic.clone()),
                );
            }
            moved
        })?;
        if !moved {
            return Err(rejected("move_sub_topic", Error::TopicNotFound { id: to_topic }));
        }
        let order = sheet.sheet().sub_topic_order(&to_topic);
        order.iter().position(|st| *st == id).unwrap_or(order.len())
    };
    sheet.save_ui();

    print_sub_topic(&sheet, id, Some(position), "Moved subtopic", json)
}

fn print_sub_topic(
    sheet: &OpenSheet,
    id: String,
    position: Option<usize>,
    verb: &str,
    json: bool,
) -> Result<()> {
    let (title, topic_id) = sheet
        .sheet()
        .sub_topic(&id)
        .map(|st| (st.title.clone(), st.topic_id.clone()))
        .unwrap_or_default();
    let output = SubTopicOutput {
        id,
        title,
        topic_id,
        position,
        deleted_questions: None,
    };

    if crate::is_silent() {
        println!("{}", output.id);
    } else if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let topic = sheet
            .sheet()
            .topic(&output.topic_id)
            .map_or("?", |t| t.title.as_str());
        print!("{verb}: {} [{}] in {topic}", output.title, short_id(&output.id));
        match output.position {
            Some(pos) => println!(" at position {pos}"),
            None => println!(),
        }
    }
    Ok(())
}
