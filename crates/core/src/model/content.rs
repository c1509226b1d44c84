use serde::{Deserialize, Serialize};

use crate::model::ContentId;

/// Assumed time limit when the backend omits one (minutes).
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 5;

/// Whether a sequence entry is a lesson or a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Lesson,
    Quiz,
}

/// One lesson or quiz as a position in the course sequence.
///
/// Items are produced once at the API boundary and never re-inspected from
/// raw backend shapes downstream. `completed` and `is_currently_learning`
/// are learner-specific and assigned during sequence resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    id: ContentId,
    kind: ContentKind,
    title: String,
    short_description: String,
    position: i64,
    completed: bool,
    is_currently_learning: bool,
    time_limit_minutes: Option<u32>,
}

impl ContentItem {
    #[must_use]
    pub fn new(
        id: ContentId,
        kind: ContentKind,
        title: impl Into<String>,
        short_description: impl Into<String>,
        position: i64,
        time_limit_minutes: Option<u32>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            short_description: short_description.into(),
            position,
            completed: false,
            is_currently_learning: false,
            time_limit_minutes,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ContentId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    #[must_use]
    pub fn is_lesson(&self) -> bool {
        self.kind == ContentKind::Lesson
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_currently_learning(&self) -> bool {
        self.is_currently_learning
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit_minutes
    }

    /// Viewing time (seconds) after which the item counts as engaged with:
    /// 75% of the time limit, defaulting the limit to
    /// [`DEFAULT_TIME_LIMIT_MINUTES`] when absent.
    #[must_use]
    pub fn threshold_seconds(&self) -> u64 {
        // 60 * 0.75 = 45 seconds per minute of limit, exact in integer math.
        u64::from(self.time_limit_minutes.unwrap_or(DEFAULT_TIME_LIMIT_MINUTES)) * 45
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub(crate) fn mark_currently_learning(&mut self) {
        self.is_currently_learning = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str) -> ContentItem {
        ContentItem::new(
            ContentId::new(id),
            ContentKind::Lesson,
            "Intro",
            "First steps",
            1,
            Some(4),
        )
    }

    #[test]
    fn new_items_start_incomplete_and_unmarked() {
        let item = lesson("l1");
        assert!(!item.completed());
        assert!(!item.is_currently_learning());
    }

    #[test]
    fn threshold_is_three_quarters_of_limit() {
        let item = lesson("l1");
        // 4 minutes -> 240 seconds -> 180 at 75%.
        assert_eq!(item.threshold_seconds(), 180);
    }

    #[test]
    fn threshold_defaults_to_five_minutes() {
        let quiz = ContentItem::new(
            ContentId::new("q1"),
            ContentKind::Quiz,
            "Checkpoint",
            "",
            2,
            None,
        );
        assert_eq!(quiz.threshold_seconds(), 225);
    }
}
