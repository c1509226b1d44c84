use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use lms_core::model::{ContentId, CourseId};
use lms_core::sequence::CourseSequence;

use crate::api::client::ApiClient;
use crate::api::types::LessonQuizBody;
use crate::error::ApiError;

/// The slice of the backend the progress logic depends on, as a trait so
/// tests can substitute a scripted backend.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Learned / not-learned content split for a course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or backend failure.
    async fn lesson_quiz(&self, course_id: &CourseId) -> Result<LessonQuizBody, ApiError>;

    /// Mark an item complete.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a rejected update.
    async fn update_progress(
        &self,
        course_id: &CourseId,
        item_id: &ContentId,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl ContentApi for ApiClient {
    async fn lesson_quiz(&self, course_id: &CourseId) -> Result<LessonQuizBody, ApiError> {
        ApiClient::lesson_quiz(self, course_id).await
    }

    async fn update_progress(
        &self,
        course_id: &CourseId,
        item_id: &ContentId,
    ) -> Result<(), ApiError> {
        ApiClient::update_progress(self, course_id, item_id).await
    }
}

/// Fetches course content and resolves it into an ordered sequence.
#[derive(Clone)]
pub struct ContentService {
    api: Arc<dyn ContentApi>,
}

impl ContentService {
    #[must_use]
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { api }
    }

    /// Builds the resolved sequence for a course, anchored on the lesson
    /// being viewed.
    ///
    /// A failed fetch degrades to an empty sequence ("unknown", not "no
    /// content") so the lesson page can still render without progress data.
    pub async fn resolve_sequence(
        &self,
        course_id: &CourseId,
        viewing: &ContentId,
    ) -> CourseSequence {
        match self.api.lesson_quiz(course_id).await {
            Ok(body) => CourseSequence::resolve(
                body.not_learned.to_items(),
                body.learned.to_items(),
                viewing,
            ),
            Err(err) => {
                warn!(course = %course_id, error = %err, "content fetch failed, sequence unknown");
                CourseSequence::empty()
            }
        }
    }
}
