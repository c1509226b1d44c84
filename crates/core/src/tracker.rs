//! Viewing-time state machine for one lesson visit.
//!
//! The session is an explicit owned value: the host event loop calls
//! [`ViewingSession::resume`], [`ViewingSession::tick`] and
//! [`ViewingSession::pause`] with the current wall-clock time, and acts on
//! the returned [`TickOutcome`] (persist the elapsed value, fire the
//! completion call). The session itself performs no I/O.

use chrono::{DateTime, Utc};

use crate::model::{ContentId, CourseId};

/// Elapsed viewing time is persisted at most once per this many seconds of
/// active viewing (plus a final write on pause).
pub const PERSIST_INTERVAL_SECONDS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Stopped,
    Running,
}

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Whole seconds accumulated by this tick (0 for sub-second calls).
    pub delta_seconds: u64,
    /// The throttled persistence policy asks for a write now.
    pub should_persist: bool,
    /// Elapsed time has reached the engagement threshold; the caller may
    /// trigger auto-completion (guarding against calls already in flight).
    pub threshold_met: bool,
}

/// Per-lesson, per-learner elapsed-time record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewingSession {
    lesson_id: ContentId,
    course_id: CourseId,
    elapsed_seconds: u64,
    threshold_seconds: u64,
    // Wall-clock time of the last accumulation; never persisted.
    last_tick: Option<DateTime<Utc>>,
    // Elapsed value at the last persist, for boundary detection.
    persisted_seconds: u64,
    state: TrackerState,
    completed: bool,
}

impl ViewingSession {
    /// Starts a session in `Stopped` with time restored from storage
    /// (0 when nothing usable was persisted).
    #[must_use]
    pub fn new(
        lesson_id: ContentId,
        course_id: CourseId,
        restored_seconds: u64,
        threshold_seconds: u64,
    ) -> Self {
        Self {
            lesson_id,
            course_id,
            elapsed_seconds: restored_seconds,
            threshold_seconds,
            last_tick: None,
            persisted_seconds: restored_seconds,
            state: TrackerState::Stopped,
            completed: false,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> &ContentId {
        &self.lesson_id
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn threshold_seconds(&self) -> u64 {
        self.threshold_seconds
    }

    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TrackerState::Running
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Stopped → Running, when the page becomes visible. No effect while
    /// already running or after completion.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.completed || self.state == TrackerState::Running {
            return;
        }
        self.state = TrackerState::Running;
        self.last_tick = Some(now);
    }

    /// Accumulates whole seconds since the last tick.
    ///
    /// Negative deltas (clock skew) are ignored, not subtracted, and
    /// sub-second remainders stay pending by keeping `last_tick` in place.
    /// Returns a no-op outcome while stopped or completed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.state != TrackerState::Running || self.completed {
            return TickOutcome::default();
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return TickOutcome::default();
        };

        let millis = (now - last).num_milliseconds();
        let delta = if millis > 0 {
            (millis / 1000).unsigned_abs()
        } else {
            0
        };
        if delta > 0 {
            self.elapsed_seconds += delta;
            self.last_tick = Some(now);
        }

        let crossed_boundary = self.elapsed_seconds / PERSIST_INTERVAL_SECONDS
            != self.persisted_seconds / PERSIST_INTERVAL_SECONDS;
        let should_persist = delta >= PERSIST_INTERVAL_SECONDS || crossed_boundary;
        if should_persist {
            self.persisted_seconds = self.elapsed_seconds;
        }

        TickOutcome {
            delta_seconds: delta,
            should_persist,
            threshold_met: self.elapsed_seconds >= self.threshold_seconds,
        }
    }

    /// Running → Stopped, when the page is hidden or unmounted. Performs one
    /// final tick so up to a second of viewing is not lost, and always asks
    /// for a persist unless the lesson already completed.
    pub fn pause(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let mut outcome = self.tick(now);
        if self.state == TrackerState::Running {
            self.state = TrackerState::Stopped;
            self.last_tick = None;
        }
        if !self.completed {
            outcome.should_persist = true;
            self.persisted_seconds = self.elapsed_seconds;
        }
        outcome
    }

    /// Terminal transition: the lesson was marked complete. The tracker
    /// stops permanently for this session; the caller clears the persisted
    /// entry.
    pub fn complete(&mut self) {
        self.completed = true;
        self.state = TrackerState::Stopped;
        self.last_tick = None;
    }
}
