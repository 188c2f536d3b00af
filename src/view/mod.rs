//! Derived view over a sheet.
//!
//! Everything here is a pure function of a [`SheetState`], a [`FilterState`]
//! and the [`UiState`] expansion toggles. Nothing is cached, so the view can
//! never drift from the tables it was built from.

mod filter;
mod stats;

pub use filter::FilterState;
pub use stats::{BucketStats, SheetStats};

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Question, SheetState, SubTopic, Topic};
use crate::store::UiState;

/// Done/total counters, always computed from the unfiltered sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    fn of<'a>(questions: impl Iterator<Item = &'a Question>) -> Self {
        questions.fold(Self::default(), |acc, q| Self {
            done: acc.done + usize::from(q.is_done()),
            total: acc.total + 1,
        })
    }

    fn add(self, other: Self) -> Self {
        Self {
            done: self.done + other.done,
            total: self.total + other.total,
        }
    }

    /// Completion as a whole percentage (0 for an empty container).
    #[must_use]
    pub fn percent(&self) -> u32 {
        percent(self.done, self.total)
    }
}

/// Rounded percentage of `part` in `total`, 0 when `total` is 0.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as u32
    }
}

/// A visible topic with its visible children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView<'a> {
    pub topic: &'a Topic,
    pub expanded: bool,
    pub progress: Progress,
    pub questions: Vec<&'a Question>,
    pub sub_topics: Vec<SubTopicView<'a>>,
}

/// A visible subtopic with its visible questions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopicView<'a> {
    pub sub_topic: &'a SubTopic,
    pub expanded: bool,
    pub progress: Progress,
    pub questions: Vec<&'a Question>,
}

/// The visible tree of a sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetView<'a> {
    /// Whether any filter criterion was active
    pub filtered: bool,
    pub progress: Progress,
    pub topics: Vec<TopicView<'a>>,
}

impl<'a> SheetView<'a> {
    /// Build the visible tree.
    ///
    /// With an inactive filter every entity is visible and expansion follows
    /// the UI toggles. With an active filter, containers without a visible
    /// descendant are dropped and every remaining container is expanded.
    #[must_use]
    pub fn build(sheet: &'a SheetState, filter: &FilterState, ui: &UiState) -> Self {
        let filtered = filter.is_active();
        let mut overall = Progress::default();
        let mut topics = Vec::new();

        for topic in sheet.topics() {
            let direct_progress = Progress::of(sheet.questions_of(&topic.id));
            let questions: Vec<&Question> = sheet
                .questions_of(&topic.id)
                .filter(|q| filter.question_visible(q))
                .collect();

            let mut topic_progress = direct_progress;
            let mut sub_topics = Vec::new();
            for sub_topic in sheet.sub_topics_of(&topic.id) {
                let progress = Progress::of(sheet.questions_of(&sub_topic.id));
                topic_progress = topic_progress.add(progress);

                let sub_questions: Vec<&Question> = sheet
                    .questions_of(&sub_topic.id)
                    .filter(|q| filter.question_visible(q))
                    .collect();
                if filtered && sub_questions.is_empty() {
                    continue;
                }
                sub_topics.push(SubTopicView {
                    sub_topic,
                    expanded: filtered || ui.is_expanded(&sub_topic.id),
                    progress,
                    questions: sub_questions,
                });
            }
            overall = overall.add(topic_progress);

            if filtered && questions.is_empty() && sub_topics.is_empty() {
                continue;
            }
            topics.push(TopicView {
                topic,
                expanded: filtered || ui.is_expanded(&topic.id),
                progress: topic_progress,
                questions,
                sub_topics,
            });
        }

        Self {
            filtered,
            progress: overall,
            topics,
        }
    }

    /// Number of questions left visible by the filter.
    #[must_use]
    pub fn visible_question_count(&self) -> usize {
        self.topics
            .iter()
            .map(|t| t.questions.len() + t.sub_topics.iter().map(|st| st.questions.len()).sum::<usize>())
            .sum()
    }
}

/// Sorted distinct platform values, used as filter choices.
#[must_use]
pub fn platforms(sheet: &SheetState) -> Vec<String> {
    sheet
        .all_questions()
        .filter_map(|q| q.platform.as_deref())
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, ParentType, QuestionPatch, QuestionStatus};
    use crate::store::Store;

    struct Fixture {
        store: Store,
        arrays: String,
        graphs: String,
        bfs: String,
    }

    fn fixture() -> Fixture {
        let mut store = Store::new();
        let arrays = store.add_topic("Arrays");
        let graphs = store.add_topic("Graphs");
        let bfs = store.add_sub_topic(&graphs, "BFS").unwrap();

        let two_sum = store.add_question(&arrays, ParentType::Topic, "Two Sum").unwrap();
        store.edit_question(
            &two_sum,
            QuestionPatch::default()
                .status(QuestionStatus::Done)
                .difficulty(Some(Difficulty::Easy))
                .platform(Some("LeetCode".into())),
        );
        store.add_question(&arrays, ParentType::Topic, "Rotate Array").unwrap();
        let islands = store.add_question(&bfs, ParentType::SubTopic, "Number of Islands").unwrap();
        store.edit_question(&islands, QuestionPatch::default().platform(Some("GFG".into())));
        store.add_question(&graphs, ParentType::Topic, "Clone Graph").unwrap();

        Fixture { store, arrays, graphs, bfs }
    }

    #[test]
    fn test_unfiltered_view_follows_toggles() {
        let mut f = fixture();
        f.store.toggle_expanded(&f.graphs);

        let view = SheetView::build(f.store.sheet(), &FilterState::default(), f.store.ui());
        assert!(!view.filtered);
        assert_eq!(view.topics.len(), 2);
        assert!(!view.topics[0].expanded);
        assert!(view.topics[1].expanded);
        assert!(!view.topics[1].sub_topics[0].expanded);
        assert_eq!(view.visible_question_count(), 4);
    }

    #[test]
    fn test_progress_counts_subtopics_into_topic() {
        let f = fixture();
        let view = SheetView::build(f.store.sheet(), &FilterState::default(), f.store.ui());

        assert_eq!(view.topics[0].progress, Progress { done: 1, total: 2 });
        assert_eq!(view.topics[1].progress, Progress { done: 0, total: 2 });
        assert_eq!(view.topics[1].sub_topics[0].progress, Progress { done: 0, total: 1 });
        assert_eq!(view.progress, Progress { done: 1, total: 4 });
        assert_eq!(view.progress.percent(), 25);
    }

    #[test]
    fn test_search_prunes_and_expands() {
        let f = fixture();
        let filter = FilterState {
            search: "islands".into(),
            ..Default::default()
        };
        let view = SheetView::build(f.store.sheet(), &filter, f.store.ui());

        assert_eq!(view.topics.len(), 1);
        let graphs = &view.topics[0];
        assert_eq!(graphs.topic.id, f.graphs);
        assert!(graphs.expanded);
        assert!(graphs.questions.is_empty());
        assert_eq!(graphs.sub_topics.len(), 1);
        assert_eq!(graphs.sub_topics[0].sub_topic.id, f.bfs);
        assert!(graphs.sub_topics[0].expanded);
        // Progress ignores the filter
        assert_eq!(graphs.progress.total, 2);
    }

    #[test]
    fn test_filter_keeps_topic_with_direct_match_only() {
        let f = fixture();
        let filter = FilterState {
            statuses: [QuestionStatus::Done].into_iter().collect(),
            ..Default::default()
        };
        let view = SheetView::build(f.store.sheet(), &filter, f.store.ui());

        assert_eq!(view.topics.len(), 1);
        assert_eq!(view.topics[0].topic.id, f.arrays);
        assert_eq!(view.topics[0].questions.len(), 1);
        assert!(view.topics[0].sub_topics.is_empty());
    }

    #[test]
    fn test_platform_filter_counts_as_active() {
        let f = fixture();
        let filter = FilterState {
            platforms: ["GFG".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let view = SheetView::build(f.store.sheet(), &filter, f.store.ui());
        assert!(view.filtered);
        assert_eq!(view.visible_question_count(), 1);
    }

    #[test]
    fn test_platforms_are_sorted_and_distinct() {
        let f = fixture();
        assert_eq!(platforms(f.store.sheet()), vec!["GFG", "LeetCode"]);
    }
}
