//! Merges the backend's learned / not-learned buckets into one
//! position-ordered course sequence and derives navigation state.

use crate::model::{ContentId, ContentItem, ContentKind};

/// Position-ordered view of a course's lessons and quizzes for one learner,
/// anchored on the lesson currently being viewed.
///
/// An empty sequence means "unknown" (for example a failed content fetch),
/// not "course has no content" — callers must not treat it as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseSequence {
    items: Vec<ContentItem>,
    viewed: Option<usize>,
    first_incomplete: Option<usize>,
}

impl CourseSequence {
    /// Sequence with no items and no neighbors, used when progress data is
    /// unavailable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the resolved sequence from the two backend buckets.
    ///
    /// Items from `learned` are forced complete and items from `not_learned`
    /// incomplete, the concatenation is stable-sorted ascending by position
    /// (ties keep fetch order), and the `is_currently_learning` flag is
    /// assigned with the tie-break rule below.
    ///
    /// Tie-break: the first incomplete item is always marked. If the viewed
    /// lesson is a different item and itself incomplete, it is marked as
    /// well, so two items may carry the flag at once. This mirrors the
    /// backend contract as observed and is intentionally not corrected.
    #[must_use]
    pub fn resolve(
        not_learned: Vec<ContentItem>,
        learned: Vec<ContentItem>,
        viewing: &ContentId,
    ) -> Self {
        let mut items: Vec<ContentItem> = Vec::with_capacity(not_learned.len() + learned.len());
        for mut item in not_learned {
            item.set_completed(false);
            items.push(item);
        }
        for mut item in learned {
            item.set_completed(true);
            items.push(item);
        }
        // Stable: equal positions keep their fetch order.
        items.sort_by_key(ContentItem::position);

        let first_incomplete = items.iter().position(|item| !item.completed());
        let viewed = items.iter().position(|item| item.id() == viewing);

        if let Some(fi) = first_incomplete {
            let fi_is_viewed_lesson =
                items[fi].kind() == ContentKind::Lesson && items[fi].id() == viewing;
            if fi_is_viewed_lesson {
                items[fi].mark_currently_learning();
            } else {
                if let Some(vi) = viewed
                    && !items[vi].completed()
                {
                    items[vi].mark_currently_learning();
                }
                items[fi].mark_currently_learning();
            }
        }

        Self {
            items,
            viewed,
            first_incomplete,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the lesson the learner is viewing, if it appears in the
    /// sequence.
    #[must_use]
    pub fn viewed_index(&self) -> Option<usize> {
        self.viewed
    }

    #[must_use]
    pub fn viewed(&self) -> Option<&ContentItem> {
        self.viewed.map(|i| &self.items[i])
    }

    /// Index of the first item the learner has not completed, if any.
    #[must_use]
    pub fn first_incomplete_index(&self) -> Option<usize> {
        self.first_incomplete
    }

    #[must_use]
    pub fn index_of(&self, id: &ContentId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Sequence neighbor before the viewed lesson, absent at the boundary or
    /// when the viewed lesson is not in the sequence.
    #[must_use]
    pub fn prev_item(&self) -> Option<&ContentItem> {
        let vi = self.viewed?;
        vi.checked_sub(1).map(|i| &self.items[i])
    }

    /// Sequence neighbor after the viewed lesson.
    #[must_use]
    pub fn next_item(&self) -> Option<&ContentItem> {
        let vi = self.viewed?;
        self.items.get(vi + 1)
    }
}
