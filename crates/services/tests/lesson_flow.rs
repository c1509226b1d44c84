//! End-to-end tracker flow over an in-memory store and a scripted backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Duration;

use lms_core::gate::AccessGate;
use lms_core::model::{ContentId, ContentItem, ContentKind, CourseId};
use lms_core::sequence::CourseSequence;
use lms_core::time::fixed_now;
use services::{ApiError, CompletionService, ContentApi, LessonQuizBody, LessonTracker};
use storage::{InMemoryStore, ProgressStore, TimerRecord, timer_key, timer_ttl};

#[derive(Default)]
struct ScriptedBackend {
    progress_calls: AtomicUsize,
    reject: bool,
}

#[async_trait]
impl ContentApi for ScriptedBackend {
    async fn lesson_quiz(&self, _course_id: &CourseId) -> Result<LessonQuizBody, ApiError> {
        Ok(LessonQuizBody::default())
    }

    async fn update_progress(
        &self,
        _course_id: &CourseId,
        _item_id: &ContentId,
    ) -> Result<(), ApiError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            Err(ApiError::Rejected("not enrolled".into()))
        } else {
            Ok(())
        }
    }
}

fn lesson(id: &str, position: i64, time_limit: Option<u32>) -> ContentItem {
    ContentItem::new(
        ContentId::new(id),
        ContentKind::Lesson,
        id,
        "",
        position,
        time_limit,
    )
}

fn quiz(id: &str, position: i64) -> ContentItem {
    ContentItem::new(ContentId::new(id), ContentKind::Quiz, id, "", position, None)
}

async fn tracker_with(
    item: &ContentItem,
    store: Arc<InMemoryStore>,
    backend: Arc<ScriptedBackend>,
) -> LessonTracker {
    let completion = Arc::new(CompletionService::new(backend));
    LessonTracker::start(item, CourseId::new("c1"), store, completion).await
}

#[tokio::test]
async fn auto_completes_exactly_once_at_threshold() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    // 4-minute lesson: threshold at 180 seconds.
    let item = lesson("l1", 1, Some(4));
    let mut tracker = tracker_with(&item, store.clone(), backend.clone()).await;

    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=179 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    assert!(!tracker.is_completed());
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 0);

    tracker.on_tick(start + Duration::seconds(180)).await;
    assert!(tracker.is_completed());
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 1);
    // The persisted entry is expired on completion.
    assert_eq!(store.get(&timer_key(item.id())).await.unwrap(), None);

    // Further ticks stay inert.
    for i in 181..=190 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.elapsed_seconds(), 180);
}

#[tokio::test]
async fn threshold_unlocks_next_item_in_gate() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    let seq = CourseSequence::resolve(
        vec![lesson("l1", 1, Some(4)), quiz("q1", 2)],
        vec![],
        &ContentId::new("l1"),
    );
    let viewed = seq.viewed().unwrap().clone();
    let mut tracker = tracker_with(&viewed, store, backend).await;

    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=179 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    let gate = AccessGate::new(&seq, tracker.elapsed_seconds());
    assert!(!gate.is_accessible(&ContentId::new("q1")));

    tracker.on_tick(start + Duration::seconds(180)).await;
    let gate = AccessGate::new(&seq, tracker.elapsed_seconds());
    assert!(gate.is_accessible(&ContentId::new("q1")));
}

#[tokio::test]
async fn restores_persisted_time_and_round_trips() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    let item = lesson("l1", 1, Some(4));
    let lesson_id = item.id().clone();
    let course_id = CourseId::new("c1");

    let seeded = TimerRecord::new(lesson_id.clone(), course_id.clone(), 100, fixed_now());
    store
        .set(&timer_key(&lesson_id), &seeded.encode().unwrap(), timer_ttl())
        .await
        .unwrap();

    let mut tracker = tracker_with(&item, store.clone(), backend).await;
    assert_eq!(tracker.elapsed_seconds(), 100);

    // Persisting again without elapsed real time stores the same value.
    let now = fixed_now();
    tracker.on_visible(now);
    tracker.on_hidden(now).await;
    let raw = store.get(&timer_key(&lesson_id)).await.unwrap().unwrap();
    assert_eq!(
        TimerRecord::restore_elapsed(Some(&raw), &lesson_id, &course_id),
        100
    );
}

#[tokio::test]
async fn mismatched_record_restores_as_zero() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    let item = lesson("l1", 1, Some(4));

    // Entry left behind by a different course.
    let foreign = TimerRecord::new(
        item.id().clone(),
        CourseId::new("other-course"),
        500,
        fixed_now(),
    );
    store
        .set(&timer_key(item.id()), &foreign.encode().unwrap(), timer_ttl())
        .await
        .unwrap();

    let tracker = tracker_with(&item, store, backend).await;
    assert_eq!(tracker.elapsed_seconds(), 0);
}

#[tokio::test]
async fn persists_on_throttled_boundaries_only() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    let item = lesson("l1", 1, Some(4));
    let lesson_id = item.id().clone();
    let course_id = CourseId::new("c1");
    let mut tracker = tracker_with(&item, store.clone(), backend).await;

    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=14 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    // No write yet below the 15-second boundary.
    assert_eq!(store.get(&timer_key(&lesson_id)).await.unwrap(), None);

    for i in 15..=20 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    let raw = store.get(&timer_key(&lesson_id)).await.unwrap().unwrap();
    assert_eq!(
        TimerRecord::restore_elapsed(Some(&raw), &lesson_id, &course_id),
        15
    );
}

#[tokio::test]
async fn already_completed_lesson_is_never_tracked() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    // Resolution is the canonical way completed flags are assigned.
    let seq = CourseSequence::resolve(
        vec![lesson("l2", 2, None)],
        vec![lesson("l1", 1, Some(4))],
        &ContentId::new("l1"),
    );
    let viewed = seq.viewed().unwrap().clone();
    assert!(viewed.completed());

    let mut tracker = tracker_with(&viewed, store, backend.clone()).await;
    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=300 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    assert_eq!(tracker.elapsed_seconds(), 0);
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn manual_completion_failure_propagates() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend {
        reject: true,
        ..ScriptedBackend::default()
    });
    let item = lesson("l1", 1, Some(4));
    let mut tracker = tracker_with(&item, store, backend).await;

    assert!(tracker.mark_complete().await.is_err());
    assert!(!tracker.is_completed());
}

#[tokio::test]
async fn auto_completion_failure_is_silent_and_retried() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend {
        reject: true,
        ..ScriptedBackend::default()
    });
    let item = lesson("l1", 1, Some(4));
    let mut tracker = tracker_with(&item, store, backend.clone()).await;

    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=182 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    // Every post-threshold tick retries; the lesson stays incomplete and
    // the tick loop never errors.
    assert!(!tracker.is_completed());
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn manual_completion_clears_persisted_entry() {
    let store = Arc::new(InMemoryStore::new());
    let backend = Arc::new(ScriptedBackend::default());
    let item = lesson("l1", 1, Some(4));
    let mut tracker = tracker_with(&item, store.clone(), backend.clone()).await;

    let start = fixed_now();
    tracker.on_visible(start);
    for i in 1..=30 {
        tracker.on_tick(start + Duration::seconds(i)).await;
    }
    assert!(store.get(&timer_key(item.id())).await.unwrap().is_some());

    tracker.mark_complete().await.unwrap();
    assert!(tracker.is_completed());
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.get(&timer_key(item.id())).await.unwrap(), None);
}
