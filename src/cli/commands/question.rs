//! Question command implementations.

use crate::cli::{QuestionAddArgs, QuestionCommands, QuestionEditArgs};
use crate::error::{Error, Result};
use crate::model::{EntityKind, ParentType, Question, QuestionPatch, QuestionStatus, SheetState};
use crate::storage::{Event, EventType};
use crate::validate::{normalize_difficulty, normalize_status, resolve_in, resolve_parent};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::{clearable, clearable_list, open_sheet, rejected, short_id, OpenSheet};

const ENTITY: &str = EntityKind::Question.as_str();

/// Events shown by `question show`.
const SHOW_HISTORY_LIMIT: u32 = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionOutput<'a> {
    #[serde(flatten)]
    question: &'a Question,
    topic: Option<&'a str>,
    sub_topic: Option<&'a str>,
    active: bool,
}

#[derive(Serialize)]
struct QuestionShowOutput<'a> {
    #[serde(flatten)]
    question: QuestionOutput<'a>,
    history: Vec<Event>,
}

#[derive(Serialize)]
struct StatusOutput {
    updated: Vec<String>,
    status: QuestionStatus,
}

#[derive(Serialize)]
struct DeleteOutput {
    deleted: Vec<String>,
}

/// Execute question commands.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened, an ID does not resolve,
/// a value is invalid, or persisting fails.
pub fn execute(
    command: &QuestionCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        QuestionCommands::Add(args) => add(args, db_path, actor, json),
        QuestionCommands::Edit(args) => edit(args, db_path, actor, json),
        QuestionCommands::Done { ids } => set_status(ids, QuestionStatus::Done, db_path, actor, json),
        QuestionCommands::Todo { ids } => set_status(ids, QuestionStatus::Todo, db_path, actor, json),
        QuestionCommands::Bookmark { id } => bookmark(id, db_path, actor, json),
        QuestionCommands::Delete { ids } => delete(ids, db_path, actor, json),
        QuestionCommands::Move { id, parent, to } => {
            move_question(id, parent.as_deref(), *to, db_path, actor, json)
        }
        QuestionCommands::Show { id } => show(id.as_deref(), db_path, actor, json),
        QuestionCommands::Focus { id } => focus(id.as_deref(), db_path, actor, json),
    }
}

fn add(args: &QuestionAddArgs, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("question title must not be empty".to_string()));
    }
    let difficulty = args.difficulty.as_deref().map(normalize_difficulty).transpose()?;

    let mut patch = QuestionPatch::default();
    if difficulty.is_some() {
        patch = patch.difficulty(difficulty);
    }
    if let Some(platform) = clearable(args.platform.as_ref()) {
        patch = patch.platform(platform);
    }
    if let Some(link) = clearable(args.link.as_ref()) {
        patch = patch.link(link);
    }
    if let Some(video) = clearable(args.video.as_ref()) {
        patch = patch.video_url(video);
    }
    if let Some(tags) = clearable_list(args.tags.as_ref()) {
        patch = patch.tags(tags);
    }

    let mut sheet = open_sheet(db_path, actor)?;
    let (parent_id, parent_type) = resolve_parent(sheet.sheet(), &args.parent)?;

    let id = sheet.workspace.mutate("add_question", |store, ctx| {
        let id = store.add_question(&parent_id, parent_type, title)?;
        if !patch.is_empty() {
            store.edit_question(&id, patch);
        }
        ctx.record_comment(ENTITY, &id, EventType::QuestionCreated, title);
        Some(id)
    })?;
    let Some(id) = id else {
        return Err(rejected("add_question", Error::ParentNotFound { id: parent_id }));
    };
    sheet.save_ui();

    print_question(&sheet, &id, "Created question", json)
}

fn build_patch(args: &QuestionEditArgs) -> Result<QuestionPatch> {
    let mut patch = QuestionPatch::default();

    if let Some(title) = args.title.as_deref().map(str::trim) {
        if title.is_empty() {
            return Err(Error::InvalidArgument("question title must not be empty".to_string()));
        }
        patch = patch.title(title);
    }
    if let Some(ref status) = args.status {
        patch = patch.status(normalize_status(status)?);
    }
    if args.clear_difficulty {
        patch = patch.difficulty(None);
    } else if let Some(ref difficulty) = args.difficulty {
        patch = patch.difficulty(Some(normalize_difficulty(difficulty)?));
    }

    patch.platform = clearable(args.platform.as_ref());
    patch.link = clearable(args.link.as_ref());
    patch.video_url = clearable(args.video.as_ref());
    patch.notes = clearable(args.notes.as_ref());
    patch.tags = clearable_list(args.tags.as_ref());
    patch.custom_tags = clearable_list(args.custom_tags.as_ref());
    patch.custom_sheets = clearable_list(args.custom_sheets.as_ref());

    Ok(patch)
}

/// Names of the fields a patch touches, for the audit comment.
fn patched_fields(patch: &QuestionPatch) -> String {
    [
        ("title", patch.title.is_some()),
        ("status", patch.status.is_some()),
        ("difficulty", patch.difficulty.is_some()),
        ("videoUrl", patch.video_url.is_some()),
        ("link", patch.link.is_some()),
        ("tags", patch.tags.is_some()),
        ("notes", patch.notes.is_some()),
        ("bookmarked", patch.bookmarked.is_some()),
        ("platform", patch.platform.is_some()),
        ("customTags", patch.custom_tags.is_some()),
        ("customSheets", patch.custom_sheets.is_some()),
        ("similarQuestions", patch.similar_questions.is_some()),
    ]
    .into_iter()
    .filter(|(_, set)| *set)
    .map(|(name, _)| name)
    .collect::<Vec<_>>()
    .join(",")
}

fn edit(args: &QuestionEditArgs, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let patch = build_patch(args)?;
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit; pass at least one field flag".to_string(),
        ));
    }

    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), &args.id, EntityKind::Question)?;
    apply_patch(&mut sheet, &id, patch)?;
    sheet.save_ui();

    print_question(&sheet, &id, "Updated question", json)
}

/// Apply a patch to one question and record it.
fn apply_patch(sheet: &mut OpenSheet, id: &str, patch: QuestionPatch) -> Result<()> {
    let fields = patched_fields(&patch);
    let status = patch.status;
    let old_status = sheet.sheet().question(id).map(|q| q.status);

    let updated = sheet.workspace.mutate("edit_question", |store, ctx| {
        let updated = store.edit_question(id, patch);
        if updated {
            match status {
                Some(new) if fields == "status" => ctx.record_change(
                    ENTITY,
                    id,
                    EventType::QuestionUpdated,
                    old_status.map(|s| s.as_str().to_string()),
                    Some(new.as_str().to_string()),
                ),
                _ => ctx.record_comment(ENTITY, id, EventType::QuestionUpdated, &fields),
            }
        }
        updated
    })?;

    if updated {
        Ok(())
    } else {
        Err(rejected("edit_question", Error::QuestionNotFound { id: id.to_string() }))
    }
}

fn set_status(
    ids: &[String],
    status: QuestionStatus,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let resolved = ids
        .iter()
        .map(|id| resolve_in(sheet.sheet(), id, EntityKind::Question))
        .collect::<Result<Vec<_>>>()?;

    for id in &resolved {
        apply_patch(&mut sheet, id, QuestionPatch::default().status(status))?;
    }
    sheet.save_ui();

    if crate::is_silent() {
        for id in &resolved {
            println!("{id}");
        }
    } else if json {
        let output = StatusOutput {
            updated: resolved,
            status,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for id in &resolved {
            let title = sheet.sheet().question(id).map_or("", |q| q.title.as_str());
            println!("{} {title} [{}]", status_icon(status), short_id(id));
        }
        let noun = if resolved.len() == 1 { "question" } else { "questions" };
        println!("Marked {} {noun} as {}", resolved.len(), status.as_str());
    }
    Ok(())
}

fn bookmark(id: &str, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::Question)?;
    let bookmarked = !sheet
        .sheet()
        .question(&id)
        .is_some_and(Question::is_bookmarked);

    apply_patch(&mut sheet, &id, QuestionPatch::default().bookmarked(bookmarked))?;
    sheet.save_ui();

    let verb = if bookmarked { "Bookmarked" } else { "Removed bookmark from" };
    print_question(&sheet, &id, verb, json)
}

fn delete(ids: &[String], db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let resolved = ids
        .iter()
        .map(|id| resolve_in(sheet.sheet(), id, EntityKind::Question))
        .collect::<Result<Vec<_>>>()?;

    let titles: Vec<String> = resolved
        .iter()
        .map(|id| sheet.sheet().question(id).map(|q| q.title.clone()).unwrap_or_default())
        .collect();

    let missing = sheet.workspace.mutate("delete_question", |store, ctx| {
        let mut missing = None;
        for (id, title) in resolved.iter().zip(&titles) {
            if store.delete_question(id) {
                ctx.record_comment(ENTITY, id, EventType::QuestionDeleted, title);
            } else if missing.is_none() {
                missing = Some(id.clone());
            }
        }
        missing
    })?;
    if let Some(id) = missing {
        return Err(rejected("delete_question", Error::QuestionNotFound { id }));
    }
    sheet.save_ui();

    if crate::is_silent() {
        for id in &resolved {
            println!("{id}");
        }
    } else if json {
        println!("{}", serde_json::to_string(&DeleteOutput { deleted: resolved })?);
    } else {
        for (id, title) in resolved.iter().zip(&titles) {
            println!("Deleted question: {title} [{}]", short_id(id));
        }
    }
    Ok(())
}

/// Reorder under the current parent, or move under another parent when
/// `to_parent` names a different container.
fn move_question(
    id: &str,
    to_parent: Option<&str>,
    to: Option<usize>,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = resolve_in(sheet.sheet(), id, EntityKind::Question)?;
    let (from_parent, from_type) = sheet
        .sheet()
        .question(&id)
        .map(|q| (q.parent_id.clone(), q.parent_type))
        .ok_or_else(|| Error::QuestionNotFound { id: id.clone() })?;
    let (to_parent, to_type) = match to_parent {
        Some(p) => resolve_parent(sheet.sheet(), p)?,
        None => (from_parent.clone(), from_type),
    };

    if to_parent == from_parent {
        let Some(to) = to else {
            return Err(Error::InvalidArgument(
                "give --to for a reorder, or --parent to move elsewhere".to_string(),
            ));
        };
        let order = sheet.sheet().question_order(&from_parent);
        let len = order.len();
        let from = order.iter().position(|q| *q == id).unwrap_or(len);
        if to >= len || from >= len {
            return Err(rejected("reorder_entity", Error::IndexOutOfRange { index: to, len }));
        }

        sheet.workspace.mutate("reorder_entity", |store, ctx| {
            if store.reorder_entity(EntityKind::Question, Some(from_parent.as_str()), from, to) && from != to {
                ctx.record_change(
                    ENTITY,
                    &id,
                    EventType::QuestionMoved,
                    Some(from.to_string()),
                    Some(to.to_string()),
                );
            }
        })?;
    } else {
        let index = to.unwrap_or(usize::MAX);
        let moved = sheet.workspace.mutate("move_question", |store, ctx| {
            let moved = store.move_question(&id, &from_parent, &to_parent, index, to_type);
            if moved {
                ctx.record_change(
                    ENTITY,
                    &id,
                    EventType::QuestionMoved,
                    Some(from_parent.clone()),
                    Some(to_parent.clone()),
                );
            }
            moved
        })?;
        if !moved {
            return Err(rejected("move_question", Error::ParentNotFound { id: to_parent }));
        }
    }
    sheet.save_ui();

    print_question(&sheet, &id, "Moved question", json)
}

fn show(id: Option<&str>, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let sheet = open_sheet(db_path, actor)?;
    let id = match id {
        Some(id) => resolve_in(sheet.sheet(), id, EntityKind::Question)?,
        None => sheet.workspace.ui().active_question_id.clone().ok_or_else(|| {
            Error::InvalidArgument(
                "no active question; pass an ID or run `qsheet question focus <id>`".to_string(),
            )
        })?,
    };

    let output = question_output(&sheet, &id)?;
    let history = sheet
        .workspace
        .storage()
        .entity_events(ENTITY, &id, SHOW_HISTORY_LIMIT)?;

    if crate::is_silent() {
        println!("{id}");
        return Ok(());
    }
    if json {
        let output = QuestionShowOutput {
            question: output,
            history,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_details(&output);
    if !history.is_empty() {
        println!();
        println!("{}", "History".cyan().bold());
        for event in &history {
            let when = chrono::DateTime::from_timestamp_millis(event.created_at)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("  {when}  {}  {}", event.event_type.as_str(), event.comment.as_deref().unwrap_or(""));
        }
    }
    Ok(())
}

fn focus(id: Option<&str>, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let id = id
        .map(|id| resolve_in(sheet.sheet(), id, EntityKind::Question))
        .transpose()?;

    sheet
        .workspace
        .mutate("set_active_question", |store, _| store.set_active_question(id.as_deref()))?;
    sheet.save_ui();

    match id {
        Some(id) => print_question(&sheet, &id, "Focused question", json),
        None => {
            if json {
                println!("{}", serde_json::json!({ "activeQuestionId": null }));
            } else if !crate::is_silent() {
                println!("Cleared active question");
            }
            Ok(())
        }
    }
}

// ── Output helpers ───────────────────────────────────────────

fn parent_titles<'a>(sheet: &'a SheetState, q: &Question) -> (Option<&'a str>, Option<&'a str>) {
    let topic = sheet.owning_topic(q).map(|t| t.title.as_str());
    let sub_topic = match q.parent_type {
        ParentType::SubTopic => sheet.sub_topic(&q.parent_id).map(|st| st.title.as_str()),
        ParentType::Topic => None,
    };
    (topic, sub_topic)
}

fn question_output<'a>(sheet: &'a OpenSheet, id: &str) -> Result<QuestionOutput<'a>> {
    let question = sheet
        .sheet()
        .question(id)
        .ok_or_else(|| Error::QuestionNotFound { id: id.to_string() })?;
    let (topic, sub_topic) = parent_titles(sheet.sheet(), question);
    Ok(QuestionOutput {
        question,
        topic,
        sub_topic,
        active: sheet.workspace.ui().active_question_id.as_deref() == Some(id),
    })
}

pub(crate) fn status_icon(status: QuestionStatus) -> String {
    match status {
        QuestionStatus::Done => "✓".green().to_string(),
        QuestionStatus::Todo => "○".to_string(),
    }
}

fn print_question(sheet: &OpenSheet, id: &str, verb: &str, json: bool) -> Result<()> {
    if crate::is_silent() {
        println!("{id}");
        return Ok(());
    }

    let output = question_output(sheet, id)?;
    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let location = match (output.topic, output.sub_topic) {
            (Some(t), Some(st)) => format!("{t} › {st}"),
            (Some(t), None) => t.to_string(),
            _ => "?".to_string(),
        };
        println!("{verb}: {} [{}] in {location}", output.question.title, short_id(id));
    }
    Ok(())
}

fn print_details(output: &QuestionOutput<'_>) {
    let q = output.question;
    let bookmark = if q.is_bookmarked() { " ★".yellow().to_string() } else { String::new() };
    println!("{} {}{bookmark}", status_icon(q.status), q.title.bold());
    println!("  ID:         {}", q.id);
    if let Some(topic) = output.topic {
        println!("  Topic:      {topic}");
    }
    if let Some(sub_topic) = output.sub_topic {
        println!("  Subtopic:   {sub_topic}");
    }
    println!("  Status:     {}", q.status.as_str());
    if let Some(d) = q.difficulty {
        println!("  Difficulty: {}", d.as_str());
    }
    if let Some(ref p) = q.platform {
        println!("  Platform:   {p}");
    }
    if let Some(ref link) = q.link {
        println!("  Link:       {link}");
    }
    if let Some(ref video) = q.video_url {
        println!("  Video:      {video}");
    }
    if let Some(tags) = q.tags.as_ref().filter(|t| !t.is_empty()) {
        println!("  Tags:       {}", tags.join(", "));
    }
    if let Some(tags) = q.custom_tags.as_ref().filter(|t| !t.is_empty()) {
        println!("  My tags:    {}", tags.join(", "));
    }
    if let Some(sheets) = q.custom_sheets.as_ref().filter(|s| !s.is_empty()) {
        println!("  My sheets:  {}", sheets.join(", "));
    }
    if let Some(notes) = q.notes.as_deref().filter(|n| !n.is_empty()) {
        println!("  Notes:");
        for line in notes.lines() {
            println!("    {line}");
        }
    }
}
