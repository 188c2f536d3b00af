//! Whole-sheet commands: import, seed, clear and check.

use crate::error::{Error, Result};
use crate::model::SheetState;
use crate::storage::EventType;
use crate::sync::{read_json, SeedStats};
use crate::workspace::SLOT_NAME;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{load_seed, open_sheet, OpenSheet};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetOutput {
    topics: usize,
    sub_topics: usize,
    questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<SeedStats>,
}

impl SheetOutput {
    fn of(sheet: &OpenSheet, seed: Option<SeedStats>) -> Self {
        let state = sheet.sheet();
        Self {
            topics: state.topic_count(),
            sub_topics: state.sub_topic_count(),
            questions: state.question_count(),
            seed,
        }
    }

    fn print(&self, verb: &str, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
        } else if !crate::is_silent() {
            println!(
                "{verb}: {} topics, {} subtopics, {} questions",
                self.topics, self.sub_topics, self.questions
            );
        }
        Ok(())
    }
}

/// Replace the sheet with an exported JSON snapshot.
///
/// The snapshot must pass the integrity check before anything is written.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the snapshot is
/// inconsistent, or persisting fails.
pub fn import(file: &Path, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let snapshot: SheetState = read_json(file)?;
    let violations = snapshot.check_integrity();
    if !violations.is_empty() {
        return Err(Error::Integrity { violations });
    }

    let mut sheet = open_sheet(db_path, actor)?;
    sheet.workspace.replace("import", EventType::SheetImported, snapshot)?;
    sheet.save_ui();
    info!(file = %file.display(), "Imported sheet");

    SheetOutput::of(&sheet, None).print("Imported sheet", json)
}

/// Replace the sheet with a freshly seeded one.
///
/// # Errors
///
/// Returns an error if seeding or persisting fails.
pub fn seed(
    file: Option<&Path>,
    slug: Option<&str>,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let (snapshot, stats) = load_seed(file, slug)?;

    sheet.workspace.replace("seed", EventType::SheetSeeded, snapshot)?;
    sheet.save_ui();

    SheetOutput::of(&sheet, Some(stats)).print("Seeded sheet", json)
}

/// Remove every entity.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened or persisting fails.
pub fn clear(db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut sheet = open_sheet(db_path, actor)?;
    let removed = sheet.sheet().question_count();

    sheet.workspace.mutate("clear_data", |store, ctx| {
        store.clear_data();
        ctx.record_comment(
            "sheet",
            SLOT_NAME,
            EventType::SheetCleared,
            &format!("{removed} questions"),
        );
    })?;
    sheet.save_ui();

    if json {
        println!("{}", serde_json::json!({ "cleared": true, "removedQuestions": removed }));
    } else if !crate::is_silent() {
        println!("Cleared sheet ({removed} questions removed)");
    }
    Ok(())
}

/// Verify the stored sheet's cross-table references.
///
/// # Errors
///
/// Returns `Integrity` listing every violation found.
pub fn check(db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let sheet = open_sheet(db_path, actor)?;
    let violations = sheet.sheet().check_integrity();

    if violations.is_empty() {
        if json {
            println!("{}", serde_json::json!({ "ok": true, "violations": [] }));
        } else if !crate::is_silent() {
            println!(
                "OK: {} topics, {} subtopics, {} questions",
                sheet.sheet().topic_count(),
                sheet.sheet().sub_topic_count(),
                sheet.sheet().question_count()
            );
        }
        return Ok(());
    }

    if !json {
        for v in &violations {
            println!("  {v}");
        }
    }
    Err(Error::Integrity { violations })
}
