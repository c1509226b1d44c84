//! Drives one lesson's [`ViewingSession`] against the progress store and
//! the completion endpoint.
//!
//! The host event loop owns the cadence: it calls [`LessonTracker::on_visible`]
//! when the page shows, [`LessonTracker::on_tick`] once per second while it
//! is visible, and [`LessonTracker::on_hidden`] on hide or unmount. The tick
//! path never returns an error; persistence and auto-completion failures are
//! logged and viewing continues.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use lms_core::model::{ContentItem, CourseId};
use lms_core::tracker::{TickOutcome, ViewingSession};
use storage::{ProgressStore, TimerRecord, timer_key, timer_ttl};

use crate::completion::{CompletionOutcome, CompletionService};
use crate::error::TrackerError;

/// Viewing-time orchestration for one lesson page visit.
pub struct LessonTracker {
    session: ViewingSession,
    store: Arc<dyn ProgressStore>,
    completion: Arc<CompletionService>,
}

impl LessonTracker {
    /// Builds the tracker for a lesson, restoring previously persisted
    /// elapsed time. An unreadable store entry restores as 0 rather than
    /// blocking the page.
    pub async fn start(
        lesson: &ContentItem,
        course_id: CourseId,
        store: Arc<dyn ProgressStore>,
        completion: Arc<CompletionService>,
    ) -> Self {
        let restored = match store.get(&timer_key(lesson.id())).await {
            Ok(raw) => TimerRecord::restore_elapsed(raw.as_deref(), lesson.id(), &course_id),
            Err(err) => {
                warn!(lesson = %lesson.id(), error = %err, "timer restore failed, starting at 0");
                0
            }
        };

        let mut session = ViewingSession::new(
            lesson.id().clone(),
            course_id,
            restored,
            lesson.threshold_seconds(),
        );
        if lesson.completed() {
            // Already-finished lessons are never tracked again.
            session.complete();
        }

        Self {
            session,
            store,
            completion,
        }
    }

    #[must_use]
    pub fn session(&self) -> &ViewingSession {
        &self.session
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.session.is_completed()
    }

    /// Page became visible.
    pub fn on_visible(&mut self, now: DateTime<Utc>) {
        self.session.resume(now);
    }

    /// Once-per-second heartbeat while the page is visible. Never fails:
    /// store and backend trouble is logged and swallowed so the timer loop
    /// stays alive.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let outcome = self.session.tick(now);
        if outcome.should_persist {
            if let Err(err) = self.persist(now).await {
                warn!(lesson = %self.session.lesson_id(), error = %err, "timer persist failed");
            }
        }
        if outcome.threshold_met && !self.session.is_completed() {
            self.auto_complete().await;
        }
        outcome
    }

    /// Explicit "mark complete" user action.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` when the backend rejects the update, so the
    /// caller can surface a notification. Local state is not rolled back.
    pub async fn mark_complete(&mut self) -> Result<(), TrackerError> {
        if self.session.is_completed() {
            return Ok(());
        }
        let outcome = self
            .completion
            .mark_complete(self.session.course_id(), self.session.lesson_id())
            .await?;
        if outcome == CompletionOutcome::Completed {
            self.finish().await;
        }
        Ok(())
    }

    /// Threshold-triggered completion: same backend call as the manual
    /// action, but failures stay silent to avoid interrupting passive
    /// viewing.
    async fn auto_complete(&mut self) {
        let result = self
            .completion
            .mark_complete(self.session.course_id(), self.session.lesson_id())
            .await;
        match result {
            Ok(CompletionOutcome::Completed) => self.finish().await,
            Ok(CompletionOutcome::AlreadyInFlight | CompletionOutcome::Stale) => {}
            Err(err) => {
                warn!(lesson = %self.session.lesson_id(), error = %err, "auto-completion failed");
            }
        }
    }

    /// Page was hidden or unmounted: final tick, unconditional persist,
    /// stop. In-flight completion results are invalidated rather than
    /// awaited.
    pub async fn on_hidden(&mut self, now: DateTime<Utc>) {
        let outcome = self.session.pause(now);
        if outcome.should_persist {
            if let Err(err) = self.persist(now).await {
                warn!(lesson = %self.session.lesson_id(), error = %err, "final timer persist failed");
            }
        }
        self.completion.invalidate();
    }

    async fn persist(&self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        let record = TimerRecord::new(
            self.session.lesson_id().clone(),
            self.session.course_id().clone(),
            self.session.elapsed_seconds(),
            now,
        );
        let key = timer_key(self.session.lesson_id());
        self.store.set(&key, &record.encode()?, timer_ttl()).await?;
        Ok(())
    }

    /// Terminal bookkeeping once the backend accepted the completion: stop
    /// the session for good and expire the persisted entry.
    async fn finish(&mut self) {
        self.session.complete();
        let key = timer_key(self.session.lesson_id());
        if let Err(err) = self.store.clear(&key).await {
            warn!(lesson = %self.session.lesson_id(), error = %err, "failed to clear timer entry");
        }
    }
}
