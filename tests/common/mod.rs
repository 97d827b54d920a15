// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, TimeZone};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stock_news_sentinel::error::AdapterError;
use stock_news_sentinel::ingest::types::{kst, EventSource, RawEvent, SourceAdapter};
use stock_news_sentinel::notify::Notifier;
use stock_news_sentinel::scheduler::{Scheduler, SchedulerSettings};
use stock_news_sentinel::sentiment::SentimentClassifier;
use stock_news_sentinel::state::StateStore;
use stock_news_sentinel::summarize::{Summarizer, SummaryFuture};

pub fn t0() -> DateTime<FixedOffset> {
    kst().with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap()
}

pub fn minutes(m: i64) -> ChronoDuration {
    ChronoDuration::minutes(m)
}

pub fn raw(
    source: EventSource,
    entity: &str,
    title: &str,
    url: &str,
    at: DateTime<FixedOffset>,
) -> RawEvent {
    RawEvent {
        source,
        entity: entity.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        published_at: Some(at),
    }
}

/// Returns the same events for every entity it is asked about, filtered by entity name.
pub struct StaticSource {
    pub kind: EventSource,
    pub events: Mutex<Vec<RawEvent>>,
    pub calls: Mutex<Vec<String>>,
    /// Response latency, kept under the test adapter timeout.
    pub delay: Duration,
}

impl StaticSource {
    pub fn new(kind: EventSource, events: Vec<RawEvent>) -> Self {
        Self {
            kind,
            events: Mutex::new(events),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SourceAdapter for StaticSource {
    async fn fetch(
        &self,
        entity: &str,
        _now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        self.calls.lock().push(entity.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.entity == entity)
            .cloned()
            .collect())
    }

    fn kind(&self) -> EventSource {
        self.kind
    }
}

/// Shares the underlying source so a test can keep a handle after boxing.
pub struct SharedSource(pub Arc<StaticSource>);

#[async_trait]
impl SourceAdapter for SharedSource {
    async fn fetch(
        &self,
        entity: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        self.0.fetch(entity, now).await
    }

    fn kind(&self) -> EventSource {
        self.0.kind
    }
}

pub struct FailingSource;

#[async_trait]
impl SourceAdapter for FailingSource {
    async fn fetch(
        &self,
        entity: &str,
        _now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        Err(AdapterError::UnknownEntity(entity.to_string()))
    }

    fn kind(&self) -> EventSource {
        EventSource::Registry
    }
}

/// Never answers within any sane timeout.
pub struct HangingSource;

#[async_trait]
impl SourceAdapter for HangingSource {
    async fn fetch(
        &self,
        _entity: &str,
        _now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    fn kind(&self) -> EventSource {
        EventSource::Feed
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    /// Messages containing this marker fail.
    pub fail_on: Option<String>,
    /// Messages containing this marker never complete.
    pub hang_on: Option<String>,
}

impl RecordingNotifier {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn hanging_on(marker: &str) -> Self {
        Self {
            hang_on: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str) -> Result<(), AdapterError> {
        if let Some(marker) = &self.hang_on {
            if text.contains(marker.as_str()) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(AdapterError::Delivery("mock failure".into()));
            }
        }
        self.sent.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[derive(Default)]
pub struct MockSummarizer {
    pub fail: bool,
    pub hang: bool,
    pub inputs: Mutex<Vec<(String, String)>>,
}

impl MockSummarizer {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }
}

impl Summarizer for MockSummarizer {
    fn summarize<'a>(&'a self, grouped: &'a str, as_of: &'a str) -> SummaryFuture<'a> {
        self.inputs
            .lock()
            .push((grouped.to_string(), as_of.to_string()));
        let fail = self.fail;
        let hang = self.hang;
        Box::pin(async move {
            if hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if fail {
                Err(AdapterError::Summarize("mock summarizer down".into()))
            } else {
                Ok(format!("SUMMARY @ {as_of}"))
            }
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn settings() -> SchedulerSettings {
    SchedulerSettings {
        adapter_timeout: Duration::from_millis(200),
        ..SchedulerSettings::default()
    }
}

pub fn scheduler(
    state_path: &Path,
    watch_list: &[&str],
    notifier: Arc<RecordingNotifier>,
    summarizer: Arc<MockSummarizer>,
) -> Scheduler {
    Scheduler::new(
        settings(),
        watch_list.iter().map(|s| s.to_string()).collect(),
        SentimentClassifier::default(),
        notifier,
        summarizer,
        StateStore::new(state_path),
    )
}
