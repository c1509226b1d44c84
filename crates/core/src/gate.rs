//! Linear progression gate: decides whether a target lesson or quiz is
//! navigable given the resolved sequence and the viewer's elapsed time.

use crate::model::{ContentId, ContentItem};
use crate::sequence::CourseSequence;

/// Pure access decision over a resolved [`CourseSequence`].
///
/// `elapsed_seconds` is the viewing time accumulated on the viewed lesson,
/// used as an engagement proxy for unlocking the immediate next item.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate<'a> {
    sequence: &'a CourseSequence,
    elapsed_seconds: u64,
}

impl<'a> AccessGate<'a> {
    #[must_use]
    pub fn new(sequence: &'a CourseSequence, elapsed_seconds: u64) -> Self {
        Self {
            sequence,
            elapsed_seconds,
        }
    }

    /// Whether the viewed lesson's time-engagement threshold has been met.
    #[must_use]
    pub fn threshold_met(&self) -> bool {
        self.sequence
            .viewed()
            .is_some_and(|item| self.elapsed_seconds >= item.threshold_seconds())
    }

    /// Whether the learner may navigate to `target`.
    ///
    /// Rules, in priority order: the viewed lesson itself and anything
    /// already completed are always accessible; if the viewed lesson is not
    /// in the sequence, nothing else is (fail closed); past items are never
    /// re-locked; the immediate next item unlocks on completion of the
    /// current one or on its time threshold; anything further requires every
    /// item from the viewed one up to the target to be completed. Unknown
    /// targets are inaccessible.
    #[must_use]
    pub fn is_accessible(&self, target: &ContentId) -> bool {
        let Some(t) = self.sequence.index_of(target) else {
            return false;
        };
        let items = self.sequence.items();

        if self.sequence.viewed_index() == Some(t) {
            return true;
        }
        if items[t].completed() {
            return true;
        }
        let Some(v) = self.sequence.viewed_index() else {
            return false;
        };
        if t < v {
            return true;
        }
        if t == v + 1 {
            let current = &items[v];
            return current.completed() || self.elapsed_seconds >= current.threshold_seconds();
        }
        // Beyond the immediate next item: the current lesson's completion
        // stands in for its own gating check, so the whole span up to the
        // target must be complete.
        items[v..t].iter().all(ContentItem::completed)
    }
}
