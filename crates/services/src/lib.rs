#![forbid(unsafe_code)]

pub mod api;
pub mod completion;
pub mod config;
pub mod content;
pub mod error;
pub mod tracker;

pub use lms_core::time::Clock;

pub use api::client::ApiClient;
pub use api::types::{AuthUser, ContentBuckets, CourseInfo, IdRef, LessonDetail, LessonQuizBody};
pub use completion::{CompletionOutcome, CompletionService};
pub use config::ApiConfig;
pub use content::{ContentApi, ContentService};
pub use error::{ApiError, ConfigError, TrackerError};
pub use tracker::LessonTracker;
