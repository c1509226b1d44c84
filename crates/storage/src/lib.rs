#![forbid(unsafe_code)]

pub mod record;
pub mod repository;
pub mod sqlite;

pub use record::{RecordError, TimerRecord, timer_key, timer_ttl};
pub use repository::{InMemoryStore, ProgressStore, StorageError};
pub use sqlite::{SqliteInitError, SqliteStore};
