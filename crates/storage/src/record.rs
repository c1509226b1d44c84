//! Wire format for persisted viewing-time entries.
//!
//! The layout is cookie-compatible: the value under `lesson_timer_{lessonId}`
//! is base64-encoded JSON `{ lessonId, courseId, elapsed, timestamp }` with a
//! 7-day expiry. Any store implementing [`crate::ProgressStore`] can hold it.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lms_core::model::{ContentId, CourseId};

/// Persisted timer entries expire after this many days.
pub const TIMER_TTL_DAYS: i64 = 7;

/// Time-to-live applied to every timer entry write.
#[must_use]
pub fn timer_ttl() -> Duration {
    Duration::days(TIMER_TTL_DAYS)
}

/// Storage key for a lesson's timer entry.
#[must_use]
pub fn timer_key(lesson_id: &ContentId) -> String {
    format!("lesson_timer_{lesson_id}")
}

/// Errors decoding or encoding a persisted timer entry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid record json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One persisted viewing-time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub lesson_id: ContentId,
    pub course_id: CourseId,
    /// Accumulated viewing seconds at the time of the write.
    pub elapsed: u64,
    /// Unix timestamp (seconds) of the write.
    pub timestamp: i64,
}

impl TimerRecord {
    #[must_use]
    pub fn new(
        lesson_id: ContentId,
        course_id: CourseId,
        elapsed: u64,
        written_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lesson_id,
            course_id,
            elapsed,
            timestamp: written_at.timestamp(),
        }
    }

    /// Serializes to the base64-JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Json` if serialization fails.
    pub fn encode(&self) -> Result<String, RecordError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Parses the base64-JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` on invalid base64 or JSON.
    pub fn decode(raw: &str) -> Result<Self, RecordError> {
        let bytes = STANDARD.decode(raw)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Whether this record belongs to the given lesson/course pair.
    #[must_use]
    pub fn matches(&self, lesson_id: &ContentId, course_id: &CourseId) -> bool {
        &self.lesson_id == lesson_id && &self.course_id == course_id
    }

    /// Elapsed seconds restorable from a raw stored value, treating an
    /// absent, unparseable, or mismatched entry as 0.
    #[must_use]
    pub fn restore_elapsed(
        raw: Option<&str>,
        lesson_id: &ContentId,
        course_id: &CourseId,
    ) -> u64 {
        raw.and_then(|value| Self::decode(value).ok())
            .filter(|record| record.matches(lesson_id, course_id))
            .map_or(0, |record| record.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use lms_core::time::fixed_now;

    fn record() -> TimerRecord {
        TimerRecord::new(
            ContentId::new("l1"),
            CourseId::new("c1"),
            95,
            fixed_now(),
        )
    }

    #[test]
    fn key_uses_lesson_id() {
        assert_eq!(timer_key(&ContentId::new("64f0a1")), "lesson_timer_64f0a1");
    }

    #[test]
    fn encode_decode_round_trip() {
        let original = record();
        let encoded = original.encode().unwrap();
        assert_eq!(TimerRecord::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn json_fields_are_camel_case() {
        let encoded = record().encode().unwrap();
        let json = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(json.contains("\"lessonId\":\"l1\""), "{json}");
        assert!(json.contains("\"courseId\":\"c1\""), "{json}");
        assert!(json.contains("\"elapsed\":95"), "{json}");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(TimerRecord::decode("not base64 !!!").is_err());
        let not_json = STANDARD.encode("plain text");
        assert!(TimerRecord::decode(&not_json).is_err());
    }

    #[test]
    fn restore_returns_elapsed_for_matching_entry() {
        let encoded = record().encode().unwrap();
        let elapsed = TimerRecord::restore_elapsed(
            Some(&encoded),
            &ContentId::new("l1"),
            &CourseId::new("c1"),
        );
        assert_eq!(elapsed, 95);
    }

    #[test]
    fn restore_defaults_to_zero() {
        let lesson = ContentId::new("l1");
        let course = CourseId::new("c1");
        assert_eq!(TimerRecord::restore_elapsed(None, &lesson, &course), 0);
        assert_eq!(
            TimerRecord::restore_elapsed(Some("garbage"), &lesson, &course),
            0
        );

        // Entry for a different lesson is ignored, not reused.
        let other = TimerRecord::new(
            ContentId::new("l2"),
            CourseId::new("c1"),
            30,
            fixed_now(),
        )
        .encode()
        .unwrap();
        assert_eq!(TimerRecord::restore_elapsed(Some(&other), &lesson, &course), 0);
    }
}
