//! List the sheet as a filtered tree.

use crate::cli::ListArgs;
use crate::error::{Error, Result};
use crate::model::{Question, SheetState};
use crate::store::UiState;
use crate::validate::{normalize_difficulty, normalize_status, resolve_parent};
use crate::view::{FilterState, Progress, SheetView};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::question::status_icon;
use super::{open_sheet, rejected, short_id};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput<'a> {
    #[serde(flatten)]
    view: &'a SheetView<'a>,
    visible_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_question_id: Option<&'a str>,
}

/// How a container's expansion toggle is changed.
#[derive(Debug, Clone, Copy)]
enum Expansion {
    Expand,
    Collapse,
    Toggle,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened, a filter value is
/// invalid, or an expansion target does not resolve.
pub fn execute(args: &ListArgs, db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let filter = build_filter(args)?;
    let mut sheet = open_sheet(db_path, actor)?;

    let changes = expansion_changes(sheet.sheet(), args)?;
    if !changes.is_empty() {
        let missing = sheet.workspace.mutate("set_expanded", |store, _| {
            changes.iter().find_map(|(id, change)| {
                let applied = match change {
                    Expansion::Expand => store.set_expanded(id, true),
                    Expansion::Collapse => store.set_expanded(id, false),
                    Expansion::Toggle => store.toggle_expanded(id).is_some(),
                };
                (!applied).then(|| id.clone())
            })
        })?;
        if let Some(id) = missing {
            return Err(rejected("set_expanded", Error::ParentNotFound { id }));
        }
        sheet.save_ui();
    }

    let ui = if args.expand_all {
        expand_everything(sheet.sheet(), sheet.workspace.ui())
    } else {
        sheet.workspace.ui().clone()
    };
    let view = SheetView::build(sheet.sheet(), &filter, &ui);

    if crate::is_csv() {
        print_csv(&view);
    } else if json {
        let output = ListOutput {
            view: &view,
            visible_questions: view.visible_question_count(),
            active_question_id: ui.active_question_id.as_deref(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_tree(&view, sheet.sheet(), &ui);
    }

    Ok(())
}

/// Translate list flags into filter criteria.
fn build_filter(args: &ListArgs) -> Result<FilterState> {
    let mut filter = FilterState {
        search: args.search.clone().unwrap_or_default(),
        ..FilterState::default()
    };
    for status in &args.status {
        filter.statuses.insert(normalize_status(status)?);
    }
    for difficulty in &args.difficulty {
        filter.difficulties.insert(normalize_difficulty(difficulty)?);
    }
    filter.platforms.extend(
        args.platform
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    );
    Ok(filter)
}

/// Resolve `--expand`, `--collapse` and `--toggle` targets to container IDs.
fn expansion_changes(sheet: &SheetState, args: &ListArgs) -> Result<Vec<(String, Expansion)>> {
    let requested = [
        (&args.expand, Expansion::Expand),
        (&args.collapse, Expansion::Collapse),
        (&args.toggle, Expansion::Toggle),
    ];

    let mut changes = Vec::new();
    for (inputs, change) in requested {
        for input in inputs {
            let (id, _) = resolve_parent(sheet, input)?;
            changes.push((id, change));
        }
    }
    Ok(changes)
}

/// A copy of the UI state with every container expanded, for one render.
fn expand_everything(sheet: &SheetState, ui: &UiState) -> UiState {
    let mut ui = ui.clone();
    for topic in sheet.topics() {
        ui.set_expanded(&topic.id, true);
        for sub_topic in sheet.sub_topics_of(&topic.id) {
            ui.set_expanded(&sub_topic.id, true);
        }
    }
    ui
}

fn print_csv(view: &SheetView<'_>) {
    println!("id,title,status,difficulty,platform,topic,subtopic");
    let row = |q: &Question, topic: &str, sub_topic: &str| {
        println!(
            "{},{},{},{},{},{},{}",
            q.id,
            crate::csv_escape(&q.title),
            q.status.as_str(),
            q.difficulty.map_or("", |d| d.as_str()),
            crate::csv_escape(q.platform.as_deref().unwrap_or("")),
            crate::csv_escape(topic),
            crate::csv_escape(sub_topic),
        );
    };

    for topic in &view.topics {
        for &q in &topic.questions {
            row(q, &topic.topic.title, "");
        }
        for sub_topic in &topic.sub_topics {
            for &q in &sub_topic.questions {
                row(q, &topic.topic.title, &sub_topic.sub_topic.title);
            }
        }
    }
}

fn progress_label(progress: Progress) -> String {
    let label = format!("{}/{} ({}%)", progress.done, progress.total, progress.percent());
    if progress.total > 0 && progress.done == progress.total {
        label.green().to_string()
    } else {
        label.dimmed().to_string()
    }
}

fn caret(expanded: bool) -> &'static str {
    if expanded { "▾" } else { "▸" }
}

fn print_question_line(q: &Question, indent: &str, active: Option<&str>) {
    let marker = if active == Some(q.id.as_str()) { "→" } else { " " };
    let bookmark = if q.is_bookmarked() { " ★".yellow().to_string() } else { String::new() };
    let difficulty = match q.difficulty {
        Some(d) => {
            let label = d.as_str();
            match d {
                crate::model::Difficulty::Easy => label.green().to_string(),
                crate::model::Difficulty::Medium => label.yellow().to_string(),
                crate::model::Difficulty::Hard => label.red().to_string(),
            }
        }
        None => String::new(),
    };
    let platform = q.platform.as_deref().unwrap_or("").dimmed();
    println!(
        "{indent}{marker}{} [{}] {}{bookmark} {difficulty} {platform}",
        status_icon(q.status),
        short_id(&q.id),
        q.title,
    );
}

fn print_tree(view: &SheetView<'_>, sheet: &SheetState, ui: &UiState) {
    if sheet.topic_count() == 0 {
        println!("No topics yet. Add one with 'qsheet topic add <title>'.");
        return;
    }
    if view.filtered && view.topics.is_empty() {
        println!("No questions match the filter.");
        return;
    }

    let title = sheet.metadata().map_or("Sheet", |m| m.title.as_str());
    println!("{} {}", title.bold(), progress_label(view.progress));
    println!();

    let active = ui.active_question_id.as_deref();
    for topic in &view.topics {
        println!(
            "{} {} [{}] {}",
            caret(topic.expanded),
            topic.topic.title.cyan().bold(),
            short_id(&topic.topic.id),
            progress_label(topic.progress)
        );
        if !topic.expanded {
            continue;
        }
        for q in &topic.questions {
            print_question_line(q, "   ", active);
        }
        for sub_topic in &topic.sub_topics {
            println!(
                "  {} {} [{}] {}",
                caret(sub_topic.expanded),
                sub_topic.sub_topic.title.bold(),
                short_id(&sub_topic.sub_topic.id),
                progress_label(sub_topic.progress)
            );
            if sub_topic.expanded {
                for q in &sub_topic.questions {
                    print_question_line(q, "     ", active);
                }
            }
        }
    }

    if view.filtered {
        println!();
        println!(
            "Showing {} of {} questions",
            view.visible_question_count(),
            sheet.question_count()
        );
    }
}
