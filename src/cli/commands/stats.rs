//! Sheet statistics.

use crate::error::Result;
use crate::view::{platforms, BucketStats, FilterState, SheetStats, SheetView};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::open_sheet;

/// Width of the text progress bar.
const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOutput {
    #[serde(flatten)]
    stats: SheetStats,
    topics: Vec<BucketStats>,
    /// Every distinct platform, as offered by the platform filter
    platform_choices: Vec<String>,
}

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the sheet cannot be opened.
pub fn execute(db_path: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let sheet = open_sheet(db_path, actor)?;
    let state = sheet.sheet();

    let view = SheetView::build(state, &FilterState::default(), sheet.workspace.ui());
    let topics = view
        .topics
        .iter()
        .map(|t| BucketStats {
            label: t.topic.title.clone(),
            done: t.progress.done,
            total: t.progress.total,
            percent: t.progress.percent(),
        })
        .collect();

    let output = StatsOutput {
        stats: SheetStats::compute(state),
        topics,
        platform_choices: platforms(state),
    };

    if crate::is_csv() {
        println!("group,label,done,total,percent");
        let groups = [
            ("difficulty", &output.stats.difficulties),
            ("platform", &output.stats.platforms),
            ("topic", &output.topics),
        ];
        for (group, buckets) in groups {
            for b in buckets {
                println!("{group},{},{},{},{}", crate::csv_escape(&b.label), b.done, b.total, b.percent);
            }
        }
    } else if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_stats(&output);
    }

    Ok(())
}

fn bar(percent: u32) -> String {
    let filled = (percent as usize * BAR_WIDTH / 100).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled).green(), "░".repeat(BAR_WIDTH - filled).dimmed())
}

fn print_buckets(heading: &str, buckets: &[BucketStats]) {
    if buckets.is_empty() {
        return;
    }
    println!();
    println!("{}", heading.cyan().bold());
    let width = buckets.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for b in buckets {
        println!(
            "  {:<width$}  {} {:>4}/{:<4} {:>3}%",
            b.label,
            bar(b.percent),
            b.done,
            b.total,
            b.percent
        );
    }
}

fn print_stats(output: &StatsOutput) {
    let stats = &output.stats;
    if stats.total == 0 {
        println!("No questions yet.");
        return;
    }

    println!(
        "{} {}/{} solved ({}%)",
        "Progress:".bold(),
        stats.solved,
        stats.total,
        stats.percent
    );
    println!("  {}", bar(stats.percent));

    print_buckets("Difficulty", &stats.difficulties);
    print_buckets("Platforms", &stats.platforms);
    print_buckets("Topics", &output.topics);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_bounds() {
        colored::control::set_override(false);
        assert_eq!(bar(0), "░".repeat(BAR_WIDTH));
        assert_eq!(bar(100), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(50).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }
}
