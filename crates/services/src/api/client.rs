use serde::de::DeserializeOwned;

use lms_core::model::{ContentId, CourseId};

use crate::api::types::{AuthUser, CourseInfo, Envelope, LessonDetail, LessonQuizBody, StatusEnvelope};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Thin REST client over the LMS backend. Request credentials ride on the
/// underlying HTTP client; this layer only shapes requests and decodes the
/// response envelopes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        let response = self.http.get(self.config.endpoint(path)).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    fn unwrap_body<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
        if envelope.is_ok() {
            Ok(envelope.body)
        } else {
            Err(ApiError::Rejected(
                envelope.message.unwrap_or(envelope.status_code),
            ))
        }
    }

    /// `GET /auth/check`. A non-OK answer means "not authenticated", which
    /// is a regular outcome here, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` only for transport or decode failures.
    pub async fn auth_check(&self) -> Result<Option<AuthUser>, ApiError> {
        let response = self.http.get(self.config.endpoint("/auth/check")).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let envelope: Envelope<AuthUser> = response.json().await?;
        if envelope.is_ok() {
            Ok(Some(envelope.body))
        } else {
            Ok(None)
        }
    }

    /// `GET /course/lesson/{lessonId}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a rejected response;
    /// callers surface this as a page-level error state.
    pub async fn lesson(&self, lesson_id: &ContentId) -> Result<LessonDetail, ApiError> {
        let envelope = self
            .get_envelope(&format!("/course/lesson/{lesson_id}"))
            .await?;
        Self::unwrap_body(envelope)
    }

    /// `GET /course/lesson-quiz/{courseId}` — the learned / not-learned
    /// split consumed by the ordering resolver.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on failure; `ContentService` degrades this to an
    /// empty sequence.
    pub async fn lesson_quiz(&self, course_id: &CourseId) -> Result<LessonQuizBody, ApiError> {
        let envelope = self
            .get_envelope(&format!("/course/lesson-quiz/{course_id}"))
            .await?;
        Self::unwrap_body(envelope)
    }

    /// `GET /course/info/{courseId}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a rejected response.
    pub async fn course_info(&self, course_id: &CourseId) -> Result<CourseInfo, ApiError> {
        let envelope = self
            .get_envelope(&format!("/course/info/{course_id}"))
            .await?;
        Self::unwrap_body(envelope)
    }

    /// `PUT /enrollments/update-progress?courseId=&itemId=` — marks a lesson
    /// or quiz complete for the learner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` unless the backend answers with
    /// `statusCode == "OK"` or the literal success message.
    pub async fn update_progress(
        &self,
        course_id: &CourseId,
        item_id: &ContentId,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.config.endpoint("/enrollments/update-progress"))
            .query(&[("courseId", course_id.as_str()), ("itemId", item_id.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }
        let envelope: StatusEnvelope = response.json().await?;
        if envelope.is_progress_updated() {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                envelope.message.unwrap_or(envelope.status_code),
            ))
        }
    }
}
