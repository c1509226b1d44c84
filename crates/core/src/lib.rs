#![forbid(unsafe_code)]

pub mod gate;
pub mod model;
pub mod sequence;
pub mod time;
pub mod tracker;

pub use gate::AccessGate;
pub use model::{ContentId, ContentItem, ContentKind, CourseId};
pub use sequence::CourseSequence;
pub use time::Clock;
pub use tracker::{TickOutcome, TrackerState, ViewingSession};
