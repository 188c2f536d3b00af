//! JSON and CSV export.
//!
//! # JSON
//!
//! A pretty-printed serialization of the whole snapshot. Parsing it back and
//! importing it reproduces an equal sheet.
//!
//! # CSV
//!
//! One row per question, every cell quoted, multi-valued fields joined with
//! `"; "`. Rows follow display order: per topic its direct questions, then
//! each subtopic's questions. Questions not reachable from the tree follow.

use std::path::Path;

use serde::Serialize;

use crate::csv_quote;
use crate::model::{ParentType, Question, SheetState};
use crate::sync::file::atomic_write;
use crate::sync::types::{ExportFormat, SyncResult};

/// CSV header row.
pub const CSV_HEADERS: [&str; 11] = [
    "Title",
    "Status",
    "Difficulty",
    "Platform",
    "Topic",
    "SubTopic",
    "Question Link",
    "Video URL",
    "Tags",
    "Custom Tags",
    "Custom Sheets",
];

/// Summary of a written export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub path: String,
    pub questions: usize,
    pub bytes: usize,
}

/// Serialize the full snapshot as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(sheet: &SheetState) -> SyncResult<String> {
    Ok(serde_json::to_string_pretty(sheet)?)
}

/// Render the snapshot as CSV.
#[must_use]
pub fn to_csv(sheet: &SheetState) -> String {
    let mut rows = Vec::with_capacity(sheet.question_count() + 1);
    rows.push(join_row(CSV_HEADERS.iter().copied()));

    for q in sheet.questions_in_display_order() {
        rows.push(join_row(csv_cells(sheet, q).iter().map(String::as_str)));
    }

    rows.join("\n")
}

fn join_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(csv_quote).collect::<Vec<_>>().join(",")
}

fn join_list(values: Option<&Vec<String>>) -> String {
    values.map(|v| v.join("; ")).unwrap_or_default()
}

fn csv_cells(sheet: &SheetState, q: &Question) -> [String; 11] {
    let topic = sheet
        .owning_topic(q)
        .map(|t| t.title.clone())
        .unwrap_or_default();
    let sub_topic = match q.parent_type {
        ParentType::SubTopic => sheet
            .sub_topic(&q.parent_id)
            .map(|st| st.title.clone())
            .unwrap_or_default(),
        ParentType::Topic => String::new(),
    };

    [
        q.title.clone(),
        q.effective_status().as_str().to_string(),
        q.difficulty.map(|d| d.as_str().to_string()).unwrap_or_default(),
        q.platform.clone().unwrap_or_default(),
        topic,
        sub_topic,
        q.link.clone().unwrap_or_default(),
        q.video_url.clone().unwrap_or_default(),
        join_list(q.tags.as_ref()),
        join_list(q.custom_tags.as_ref()),
        join_list(q.custom_sheets.as_ref()),
    ]
}

/// Render and atomically write an export file.
///
/// # Errors
///
/// Returns an error if rendering or the write fails.
pub fn export_to(sheet: &SheetState, format: ExportFormat, path: &Path) -> SyncResult<ExportStats> {
    let content = render(sheet, format)?;
    atomic_write(path, &content)?;

    Ok(ExportStats {
        format,
        path: path.display().to_string(),
        questions: sheet.question_count(),
        bytes: content.len(),
    })
}

/// Render an export in the given format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(sheet: &SheetState, format: ExportFormat) -> SyncResult<String> {
    match format {
        ExportFormat::Json => to_json(sheet),
        ExportFormat::Csv => Ok(to_csv(sheet)),
    }
}
