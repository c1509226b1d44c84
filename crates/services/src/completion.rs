//! Completion calls with duplicate suppression and stale-result discard.
//!
//! The auto-complete trigger fires from a once-per-second tick, so a slow
//! backend could otherwise stack identical `update-progress` calls. An
//! in-flight flag suppresses duplicates; a generation counter, bumped on
//! session teardown, discards results that land after the viewing session
//! they belonged to is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use lms_core::model::{ContentId, CourseId};

use crate::content::ContentApi;
use crate::error::ApiError;

/// What became of a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The backend accepted the update.
    Completed,
    /// Another completion call was already running; nothing was sent.
    AlreadyInFlight,
    /// The call finished after the session was torn down; the result was
    /// discarded to avoid a stale write into dead state.
    Stale,
}

/// Serializes completion calls for one viewing session.
pub struct CompletionService {
    api: Arc<dyn ContentApi>,
    in_flight: AtomicBool,
    generation: AtomicU64,
}

impl CompletionService {
    #[must_use]
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Invalidates results of calls currently in flight. Called on session
    /// teardown; the calls themselves are not aborted.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Sends the mark-complete update unless one is already in flight.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the backend rejects the update or transport
    /// fails; callers on the automatic path swallow this, the manual path
    /// surfaces it.
    pub async fn mark_complete(
        &self,
        course_id: &CourseId,
        item_id: &ContentId,
    ) -> Result<CompletionOutcome, ApiError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(CompletionOutcome::AlreadyInFlight);
        }
        let generation = self.generation.load(Ordering::SeqCst);

        let result = self.api.update_progress(course_id, item_id).await;
        self.in_flight.store(false, Ordering::SeqCst);

        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(CompletionOutcome::Stale);
        }
        result.map(|()| CompletionOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    use crate::api::types::LessonQuizBody;

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
        reject: bool,
    }

    #[async_trait]
    impl ContentApi for CountingApi {
        async fn lesson_quiz(&self, _course_id: &CourseId) -> Result<LessonQuizBody, ApiError> {
            Ok(LessonQuizBody::default())
        }

        async fn update_progress(
            &self,
            _course_id: &CourseId,
            _item_id: &ContentId,
        ) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                Err(ApiError::Rejected("nope".into()))
            } else {
                Ok(())
            }
        }
    }

    fn ids() -> (CourseId, ContentId) {
        (CourseId::new("c1"), ContentId::new("l1"))
    }

    #[tokio::test]
    async fn successful_call_reports_completed() {
        let api = Arc::new(CountingApi::default());
        let service = CompletionService::new(api.clone());
        let (course, item) = ids();

        let outcome = service.mark_complete(&course, &item).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::Completed);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejection_propagates_and_releases_guard() {
        let api = Arc::new(CountingApi {
            reject: true,
            ..CountingApi::default()
        });
        let service = CompletionService::new(api.clone());
        let (course, item) = ids();

        assert!(service.mark_complete(&course, &item).await.is_err());
        // The guard is released, so a retry reaches the backend again.
        assert!(service.mark_complete(&course, &item).await.is_err());
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    /// Backend double that tears the session down while the update call is
    /// in flight.
    #[derive(Default)]
    struct TearingApi {
        service: std::sync::OnceLock<Arc<CompletionService>>,
    }

    #[async_trait]
    impl ContentApi for TearingApi {
        async fn lesson_quiz(&self, _course_id: &CourseId) -> Result<LessonQuizBody, ApiError> {
            Ok(LessonQuizBody::default())
        }

        async fn update_progress(
            &self,
            _course_id: &CourseId,
            _item_id: &ContentId,
        ) -> Result<(), ApiError> {
            if let Some(service) = self.service.get() {
                service.invalidate();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn teardown_during_flight_marks_result_stale() {
        let api = Arc::new(TearingApi::default());
        let service = Arc::new(CompletionService::new(api.clone()));
        api.service.set(service.clone()).ok();
        let (course, item) = ids();

        let outcome = service.mark_complete(&course, &item).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::Stale);
    }
}
