//! Aggregate statistics over the whole sheet.

use std::collections::HashMap;

use serde::Serialize;

use super::percent;
use crate::model::{Difficulty, SheetState};

/// Number of platforms reported in [`SheetStats::platforms`].
const TOP_PLATFORMS: usize = 5;

/// Done/total counts for one group of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketStats {
    pub label: String,
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

impl BucketStats {
    fn new(label: impl Into<String>, done: usize, total: usize) -> Self {
        Self {
            label: label.into(),
            done,
            total,
            percent: percent(done, total),
        }
    }
}

/// Overall, per-difficulty and per-platform progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub total: usize,
    pub solved: usize,
    pub percent: u32,
    /// Easy, medium, hard. Questions without a difficulty are not counted.
    pub difficulties: Vec<BucketStats>,
    /// Largest platforms first, missing platform grouped as "Other"
    pub platforms: Vec<BucketStats>,
}

impl SheetStats {
    #[must_use]
    pub fn compute(sheet: &SheetState) -> Self {
        let mut total = 0;
        let mut solved = 0;
        let mut by_difficulty: HashMap<Difficulty, (usize, usize)> = HashMap::new();
        let mut by_platform: HashMap<&str, (usize, usize)> = HashMap::new();

        for q in sheet.all_questions() {
            let done = usize::from(q.is_done());
            total += 1;
            solved += done;

            if let Some(d) = q.difficulty {
                let entry = by_difficulty.entry(d).or_default();
                entry.0 += done;
                entry.1 += 1;
            }
            let entry = by_platform.entry(q.platform_label()).or_default();
            entry.0 += done;
            entry.1 += 1;
        }

        let difficulties = Difficulty::ALL
            .iter()
            .map(|d| {
                let (done, total) = by_difficulty.get(d).copied().unwrap_or_default();
                BucketStats::new(d.as_str(), done, total)
            })
            .collect();

        let mut platforms: Vec<BucketStats> = by_platform
            .into_iter()
            .map(|(label, (done, total))| BucketStats::new(label, done, total))
            .collect();
        // Ties broken by label so output is stable
        platforms.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
        platforms.truncate(TOP_PLATFORMS);

        Self {
            total,
            solved,
            percent: percent(solved, total),
            difficulties,
            platforms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParentType, QuestionPatch, QuestionStatus};
    use crate::store::Store;

    #[test]
    fn test_empty_sheet() {
        let stats = SheetStats::compute(&SheetState::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percent, 0);
        assert!(stats.platforms.is_empty());
        assert!(stats.difficulties.iter().all(|d| d.total == 0));
    }

    #[test]
    fn test_counts_and_rounding() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        for (i, platform) in ["LeetCode", "LeetCode", ""].iter().enumerate() {
            let q = store.add_question(&t, ParentType::Topic, "q").unwrap();
            let mut patch = QuestionPatch::default().platform(Some((*platform).to_string()));
            if i == 0 {
                patch = patch.status(QuestionStatus::Done).difficulty(Some(Difficulty::Hard));
            }
            store.edit_question(&q, patch);
        }

        let stats = SheetStats::compute(store.sheet());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.solved, 1);
        assert_eq!(stats.percent, 33);

        let hard = stats.difficulties.iter().find(|d| d.label == "hard").unwrap();
        assert_eq!((hard.done, hard.total, hard.percent), (1, 1, 100));
        // Unset difficulty is not counted as medium here
        let medium = stats.difficulties.iter().find(|d| d.label == "medium").unwrap();
        assert_eq!(medium.total, 0);

        assert_eq!(stats.platforms[0].label, "LeetCode");
        assert_eq!(stats.platforms[0].total, 2);
        assert_eq!(stats.platforms[1].label, "Other");
    }

    #[test]
    fn test_keeps_top_five_platforms() {
        let mut store = Store::new();
        let t = store.add_topic("T");
        for (n, platform) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            for _ in 0..=n {
                let q = store.add_question(&t, ParentType::Topic, "q").unwrap();
                store.edit_question(&q, QuestionPatch::default().platform(Some((*platform).to_string())));
            }
        }

        let stats = SheetStats::compute(store.sheet());
        let labels: Vec<&str> = stats.platforms.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["F", "E", "D", "C", "B"]);
    }
}
