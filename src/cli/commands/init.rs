//! Initialize the qsheet database.
//!
//! Creates the database at the resolved path (see
//! [`crate::config::resolve_db_path`]) and seeds the sheet slot from a seed
//! file, a remote slug, or the sample sheet bundled with the binary.
//! With `--force` the existing slot is dropped and seeded again; the audit
//! history is kept.

use crate::cli::SeedSourceArgs;
use crate::config::{clear_ui_cache, resolve_db_path, ui_cache_path};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::sync::SeedStats;
use crate::workspace::{BootstrapSource, SLOT_NAME, Workspace};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::{load_seed, resolve_actor};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitOutput {
    database: PathBuf,
    seeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    topics: usize,
    sub_topics: usize,
    questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<SeedStats>,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `--force` was not
/// given, or an error if seeding or persisting fails.
pub fn execute(
    args: &SeedSourceArgs,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or_else(|| {
        Error::Config("Could not determine the qsheet data directory".to_string())
    })?;

    if db_path.exists() && !args.force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let actor = resolve_actor(actor);
    let mut storage = SqliteStorage::open(&db_path)?;
    if args.force {
        storage.clear_slot(SLOT_NAME, &actor)?;
        clear_ui_cache(&ui_cache_path(&db_path));
    }

    let mut seed_stats = None;
    let (workspace, source) = Workspace::bootstrap(storage, SLOT_NAME, &actor, || {
        let (sheet, stats) = load_seed(args.seed_file.as_deref(), args.slug.as_deref())?;
        seed_stats = Some(stats);
        Ok(sheet)
    })?;

    let sheet = workspace.sheet();
    let output = InitOutput {
        database: db_path,
        seeded: source == BootstrapSource::Seeded,
        title: sheet.metadata().map(|m| m.title.clone()),
        topics: sheet.topic_count(),
        sub_topics: sheet.sub_topic_count(),
        questions: sheet.question_count(),
        seed: seed_stats,
    };

    if crate::is_silent() {
        println!("{}", output.database.display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized qsheet database");
        println!("  Database: {}", output.database.display());
        if let Some(ref title) = output.title {
            println!("  Sheet: {title}");
        }
        println!(
            "  {} topics, {} subtopics, {} questions",
            output.topics, output.sub_topics, output.questions
        );
        if let Some(regenerated) = output.seed.as_ref().map(|s| s.regenerated_ids).filter(|n| *n > 0) {
            println!("  {regenerated} questions got fresh IDs (missing or duplicate _id)");
        }
        println!();
        println!("Next: run 'qsheet list' to see the sheet.");
    }

    Ok(())
}
