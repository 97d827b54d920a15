// tests/digest_cadence.rs
mod common;

use std::sync::Arc;

use common::*;
use stock_news_sentinel::ingest::types::{Event, EventSource};
use stock_news_sentinel::scheduler::DigestOutcome;
use stock_news_sentinel::state::{SchedulerState, StateStore};

/// Seed a state file with one buffered event and the given last-digest time.
async fn seed(path: &std::path::Path, last_digest_min_ago: i64) {
    let now = t0();
    let mut st = SchedulerState::default();
    st.digest.add(&Event {
        occurred_at: now - minutes(10),
        source: EventSource::Feed,
        entity: "X".into(),
        title: "X 신제품 공개".into(),
        url: "https://example.test/new".into(),
    });
    st.last_digest_unix = (now - minutes(last_digest_min_ago)).timestamp();
    StateStore::new(path).save(&st).await.unwrap();
}

#[tokio::test]
async fn no_digest_before_interval() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 59).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let summarizer = Arc::new(MockSummarizer::ok());
    let mut s = scheduler(&path, &["X"], notifier.clone(), summarizer.clone());
    s.load_state().await;

    let r = s.run_cycle(t0()).await;
    assert_eq!(r.digest, DigestOutcome::NotDue);
    assert_eq!(s.state().digest.len(), 1);
    assert!(summarizer.inputs.lock().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn digest_fires_after_interval_and_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 61).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut s = scheduler(
        &path,
        &["X"],
        notifier.clone(),
        Arc::new(MockSummarizer::ok()),
    );
    s.load_state().await;

    let r = s.run_cycle(t0()).await;
    assert_eq!(r.digest, DigestOutcome::Sent { entries: 1 });
    assert!(s.state().digest.is_empty());
    assert_eq!(s.state().last_digest_unix, t0().timestamp());
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn failed_delivery_still_flushes_and_resets_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 61).await;

    let notifier = Arc::new(RecordingNotifier::failing_on("다이제스트"));
    let mut s = scheduler(
        &path,
        &["X"],
        notifier.clone(),
        Arc::new(MockSummarizer::ok()),
    );
    s.load_state().await;

    let r = s.run_cycle(t0()).await;
    assert_eq!(r.digest, DigestOutcome::Failed { entries: 1 });
    assert!(s.state().digest.is_empty());
    assert_eq!(s.state().last_digest_unix, t0().timestamp());

    // Flushed state is what got persisted.
    let on_disk = StateStore::new(&path).try_load().await.unwrap().unwrap();
    assert!(on_disk.digest.is_empty());
}

#[tokio::test]
async fn failed_summary_still_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 120).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut s = scheduler(
        &path,
        &["X"],
        notifier.clone(),
        Arc::new(MockSummarizer::failing()),
    );
    s.load_state().await;

    let r = s.run_cycle(t0()).await;
    assert_eq!(r.digest, DigestOutcome::Failed { entries: 1 });
    assert!(s.state().digest.is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn hanging_summary_times_out_and_still_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 61).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut s = scheduler(
        &path,
        &["X"],
        notifier.clone(),
        Arc::new(MockSummarizer::hanging()),
    );
    s.load_state().await;

    let r = tokio::time::timeout(std::time::Duration::from_secs(5), s.run_cycle(t0()))
        .await
        .expect("summary must be bounded by the adapter timeout");
    assert_eq!(r.digest, DigestOutcome::Failed { entries: 1 });
    assert!(s.state().digest.is_empty());
    assert_eq!(s.state().last_digest_unix, t0().timestamp());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn hanging_digest_delivery_times_out_and_still_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 61).await;

    let mut s = scheduler(
        &path,
        &["X"],
        Arc::new(RecordingNotifier::hanging_on("다이제스트")),
        Arc::new(MockSummarizer::ok()),
    );
    s.load_state().await;

    let r = tokio::time::timeout(std::time::Duration::from_secs(5), s.run_cycle(t0()))
        .await
        .expect("delivery must be bounded by the adapter timeout");
    assert_eq!(r.digest, DigestOutcome::Failed { entries: 1 });
    assert!(s.state().digest.is_empty());
}

#[tokio::test]
async fn empty_buffer_never_fires() {
    let dir = tempfile::tempdir().unwrap();
    let summarizer = Arc::new(MockSummarizer::ok());
    let mut s = scheduler(
        &dir.path().join("state.json"),
        &["X"],
        Arc::new(RecordingNotifier::default()),
        summarizer.clone(),
    );

    let r = s.run_cycle(t0()).await;
    assert_eq!(r.digest, DigestOutcome::NotDue);
    assert_eq!(s.state().last_digest_unix, 0);
    assert!(summarizer.inputs.lock().is_empty());
}

#[tokio::test]
async fn buffered_entries_age_out_without_a_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    seed(&path, 30).await;

    let mut s = scheduler(
        &path,
        &["X"],
        Arc::new(RecordingNotifier::default()),
        Arc::new(MockSummarizer::ok()),
    );
    s.load_state().await;
    assert_eq!(s.state().digest.len(), 1);

    // 51 minutes later the seeded entry is 61 minutes old.
    let r = s.run_cycle(t0() + minutes(51)).await;
    assert_eq!(r.digest, DigestOutcome::NotDue);
    assert!(s.state().digest.is_empty());
}
