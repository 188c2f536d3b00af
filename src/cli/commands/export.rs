//! Export the sheet to JSON or CSV.
//!
//! Without `--output` the file is written to the current directory under
//! the default download name (`question-sheet-export.json` / `.csv`).

use crate::cli::ExportFormatArg;
use crate::error::Result;
use crate::sync::{export_to, render, ExportFormat};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::open_sheet;

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened or the export fails.
pub fn execute(
    format: ExportFormatArg,
    output: Option<&PathBuf>,
    stdout: bool,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let sheet = open_sheet(db_path, actor)?;
    let format = ExportFormat::from(format);

    if stdout {
        let content = render(sheet.sheet(), format)?;
        let mut out = std::io::stdout().lock();
        out.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            writeln!(out)?;
        }
        return Ok(());
    }

    let path = output
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format.default_file_name()));
    let stats = export_to(sheet.sheet(), format, &path)?;
    info!(path = %stats.path, bytes = stats.bytes, "Exported sheet");

    if crate::is_silent() {
        println!("{}", stats.path);
    } else if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!(
            "Exported {} questions to {} ({} bytes)",
            stats.questions, stats.path, stats.bytes
        );
    }
    Ok(())
}
