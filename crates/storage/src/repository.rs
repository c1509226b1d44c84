use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use lms_core::time::Clock;

/// Errors surfaced by progress store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value persistence contract for learner progress state.
///
/// The tracker is written against this interface so the medium (browser
/// cookie, local file, SQLite, server session) is swappable without touching
/// tracker logic. Expired entries read back as absent.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch a value by key, `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value with a time-to-live, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError>;

    /// Remove an entry; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, (String, DateTime<Utc>)>>>,
    clock: Clock,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store evaluating expiry against the given clock, for deterministic
    /// tests.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.get(key) {
            Some((_, expires_at)) if *expires_at <= self.clock.now() => {
                guard.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), (value.to_owned(), self.clock.now() + ttl));
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::time::{fixed_clock, fixed_now};

    #[tokio::test]
    async fn set_get_clear_round_trip() {
        let store = InMemoryStore::new();
        store.set("k", "v", Duration::days(7)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.clear("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = InMemoryStore::new();
        store.set("k", "first", Duration::days(7)).await.unwrap();
        store.set("k", "second", Duration::days(7)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let mut clock = fixed_clock();
        let store = InMemoryStore::with_clock(clock);
        store.set("k", "v", Duration::seconds(10)).await.unwrap();

        clock.advance(Duration::seconds(11));
        let later = InMemoryStore {
            entries: store.entries.clone(),
            clock,
        };
        assert_eq!(later.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clearing_missing_key_is_ok() {
        let store = InMemoryStore::with_clock(Clock::fixed(fixed_now()));
        store.clear("missing").await.unwrap();
    }
}
