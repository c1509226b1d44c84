//! Backend response shapes, resolved once at this boundary.
//!
//! The backend sometimes sends a reference field as a plain string id and
//! sometimes as an embedded object; [`IdRef`] absorbs both so nothing
//! downstream re-inspects raw shapes. Missing order fields collapse to
//! position 0 during mapping, which the resolver intentionally preserves.

use serde::Deserialize;

use lms_core::model::{ContentId, ContentItem, ContentKind, CourseId};

/// Literal success message accepted from the update-progress endpoint in
/// addition to `statusCode == "OK"`.
pub const UPDATE_PROGRESS_SUCCESS: &str = "Update progress successfully";

/// Standard `{ statusCode, message, body }` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: String,
    #[serde(default)]
    pub message: Option<String>,
    pub body: T,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code == "OK"
    }
}

/// Envelope without a body, for write endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    pub status_code: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusEnvelope {
    /// Success contract of `PUT /enrollments/update-progress`.
    #[must_use]
    pub fn is_progress_updated(&self) -> bool {
        self.status_code == "OK"
            || self.message.as_deref() == Some(UPDATE_PROGRESS_SUCCESS)
    }
}

/// A reference that arrives either as a bare id string or as an embedded
/// object carrying `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(String),
    Embedded {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl IdRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            IdRef::Id(id) | IdRef::Embedded { id } => id,
        }
    }
}

/// Authenticated user as returned by `GET /auth/check`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
}

impl AuthUser {
    #[must_use]
    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        self.enrolled_courses.iter().any(|c| c == course_id.as_str())
    }
}

/// Course metadata from `GET /course/info/{courseId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// Lesson detail from `GET /course/lesson/{lessonId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub order_lesson: Option<i64>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub course: Option<IdRef>,
    #[serde(default)]
    pub content: Option<String>,
}

impl LessonDetail {
    #[must_use]
    pub fn to_item(&self) -> ContentItem {
        ContentItem::new(
            ContentId::new(&self.id),
            ContentKind::Lesson,
            &self.title,
            self.short_description.clone().unwrap_or_default(),
            self.order_lesson.unwrap_or(0),
            self.time_limit,
        )
    }
}

/// Quiz entry within the lesson-quiz listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub order_quiz: Option<i64>,
    #[serde(default)]
    pub time_limit: Option<u32>,
}

impl QuizSummary {
    #[must_use]
    pub fn to_item(&self) -> ContentItem {
        ContentItem::new(
            ContentId::new(&self.id),
            ContentKind::Quiz,
            &self.title,
            self.short_description.clone().unwrap_or_default(),
            self.order_quiz.unwrap_or(0),
            self.time_limit,
        )
    }
}

/// One side of the learned / not-learned split.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBuckets {
    #[serde(default)]
    pub lessons: Vec<LessonDetail>,
    #[serde(default)]
    pub quizzes: Vec<QuizSummary>,
}

impl ContentBuckets {
    /// Maps the bucket into canonical items, lessons before quizzes; the
    /// resolver's stable sort settles the final order.
    #[must_use]
    pub fn to_items(&self) -> Vec<ContentItem> {
        self.lessons
            .iter()
            .map(LessonDetail::to_item)
            .chain(self.quizzes.iter().map(QuizSummary::to_item))
            .collect()
    }
}

/// Body of `GET /course/lesson-quiz/{courseId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonQuizBody {
    #[serde(default)]
    pub learned: ContentBuckets,
    #[serde(default)]
    pub not_learned: ContentBuckets,
}
