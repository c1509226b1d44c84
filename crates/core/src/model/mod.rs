mod content;
mod ids;

pub use content::{ContentItem, ContentKind, DEFAULT_TIME_LIMIT_MINUTES};
pub use ids::{ContentId, CourseId};
