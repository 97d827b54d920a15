// src/scheduler.rs
//! Aggregation scheduler: one poll cycle at a time.
//!
//! Per cycle: fetch every source for every tracked entity, drop stale events,
//! keep the novel ones (fingerprint not seen before), alert on strong
//! sentiment, buffer everything novel for the digest, fire the digest once the
//! interval has elapsed, persist state. State is only touched on this task,
//! after the adapter fan-out has completed.

use chrono::{DateTime, FixedOffset};
use futures::FutureExt;
use metrics::{counter, gauge};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::digest::{render_grouped, window_start};
use crate::error::{within, AdapterError};
use crate::fingerprint::fingerprint;
use crate::ingest::types::{display_ts, now_kst, Event, SourceAdapter};
use crate::ingest::{fetch_all, is_fresh};
use crate::notify::{format_alert, format_digest, Notifier};
use crate::sentiment::{Category, SentimentClassifier};
use crate::state::{SchedulerState, StateStore};
use crate::summarize::Summarizer;
use crate::telemetry::ensure_metrics_described;

pub const MIN_SLEEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub poll_interval: Duration,
    pub digest_interval: Duration,
    pub max_article_age: Duration,
    /// Upper bound for every single adapter call.
    pub adapter_timeout: Duration,
    pub min_sleep: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(120),
            digest_interval: Duration::from_secs(60 * 60),
            max_article_age: Duration::from_secs(90 * 60),
            adapter_timeout: Duration::from_secs(20),
            min_sleep: MIN_SLEEP,
        }
    }
}

impl From<&AppConfig> for SchedulerSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            poll_interval: cfg.poll_interval,
            digest_interval: cfg.digest_interval,
            max_article_age: cfg.max_article_age,
            // summaries are slow; give every call a little more than the HTTP timeout
            adapter_timeout: cfg.http_timeout + Duration::from_secs(5),
            min_sleep: MIN_SLEEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestOutcome {
    /// Interval not elapsed, or nothing buffered.
    #[default]
    NotDue,
    Sent { entries: usize },
    /// Buffer was still flushed.
    Failed { entries: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub fetch_errors: usize,
    pub stale: usize,
    pub duplicates: usize,
    pub novel: usize,
    pub alerts_sent: usize,
    pub alert_failures: usize,
    pub buffered: usize,
    pub digest: DigestOutcome,
    pub persisted: bool,
}

/// Time to sleep after a cycle that took `elapsed`.
pub fn sleep_after(poll_interval: Duration, elapsed: Duration, min_sleep: Duration) -> Duration {
    poll_interval.saturating_sub(elapsed).max(min_sleep)
}

pub struct Scheduler {
    settings: SchedulerSettings,
    watch_list: Vec<String>,
    classifier: SentimentClassifier,
    sources: Vec<Box<dyn SourceAdapter>>,
    notifier: Arc<dyn Notifier>,
    summarizer: Arc<dyn Summarizer>,
    store: StateStore,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(
        settings: SchedulerSettings,
        watch_list: Vec<String>,
        classifier: SentimentClassifier,
        notifier: Arc<dyn Notifier>,
        summarizer: Arc<dyn Summarizer>,
        store: StateStore,
    ) -> Self {
        ensure_metrics_described();
        Self {
            settings,
            watch_list,
            classifier,
            sources: Vec::new(),
            notifier,
            summarizer,
            store,
            state: SchedulerState::default(),
        }
    }

    pub fn with_source(mut self, source: Box<dyn SourceAdapter>) -> Self {
        self.sources.push(source);
        self
    }

    /// Replace in-memory state with whatever the store has (empty if absent or unreadable).
    pub async fn load_state(&mut self) {
        self.state = self.store.load().await;
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    fn digest_due(&self, now: DateTime<FixedOffset>) -> bool {
        let elapsed = now.timestamp().saturating_sub(self.state.last_digest_unix);
        let interval = i64::try_from(self.settings.digest_interval.as_secs()).unwrap_or(i64::MAX);
        elapsed >= interval && !self.state.digest.is_empty()
    }

    /// Run one full cycle against the clock `now`.
    pub async fn run_cycle(&mut self, now: DateTime<FixedOffset>) -> CycleReport {
        let mut report = CycleReport::default();

        // 1) fan-out
        let fetched = fetch_all(
            &self.sources,
            &self.watch_list,
            now,
            self.settings.adapter_timeout,
        )
        .await;
        report.fetched = fetched.events.len();
        report.fetch_errors = fetched.errors;

        // 2) + 3) age gate, then dedup in merge order
        let mut novel: Vec<(Event, Category)> = Vec::new();
        for raw in fetched.events {
            let ev = raw.into_event(now);
            if !is_fresh(ev.occurred_at, now, self.settings.max_article_age) {
                report.stale += 1;
                continue;
            }
            let fp = fingerprint(&ev.title, &ev.url);
            if !self.state.dedup.is_new(&fp) {
                report.duplicates += 1;
                continue;
            }
            debug!(fingerprint = %fp, entity = %ev.entity, source = %ev.source, "novel event");
            self.state.dedup.record(fp);
            let category = self.classifier.classify(&ev.title);
            novel.push((ev, category));
        }
        report.novel = novel.len();
        counter!("sentinel_events_stale_total").increment(report.stale as u64);
        counter!("sentinel_events_duplicate_total").increment(report.duplicates as u64);
        counter!("sentinel_events_novel_total").increment(report.novel as u64);

        // 4) immediate alerts, one message per event
        for (ev, category) in &novel {
            let Some(text) = format_alert(ev, *category) else {
                continue;
            };
            let what = format!("{} alert", self.notifier.name());
            match within(what, self.settings.adapter_timeout, self.notifier.deliver(&text)).await {
                Ok(()) => {
                    report.alerts_sent += 1;
                    counter!("sentinel_alerts_sent_total").increment(1);
                    info!(entity = %ev.entity, category = category.label(), title = %ev.title, "alert sent");
                }
                Err(e) => {
                    report.alert_failures += 1;
                    counter!("sentinel_adapter_errors_total", "stage" => "alert").increment(1);
                    warn!(error = %e, entity = %ev.entity, source = %ev.source, "alert delivery failed");
                }
            }
        }

        // 5) digest buffer
        let window = self.settings.digest_interval;
        let pruned = self.state.digest.prune(now, window);
        if pruned > 0 {
            debug!(pruned, "digest buffer pruned");
        }
        let cutoff = window_start(now, window);
        for (ev, _) in &novel {
            if ev.occurred_at >= cutoff {
                self.state.digest.add(ev);
                report.buffered += 1;
            }
        }

        // 6) digest
        if self.digest_due(now) {
            report.digest = self.fire_digest(now).await;
        }
        gauge!("sentinel_digest_buffer_len").set(self.state.digest.len() as f64);

        // 7) persist
        match self.store.save(&self.state).await {
            Ok(()) => report.persisted = true,
            Err(e) => {
                counter!("sentinel_adapter_errors_total", "stage" => "persist").increment(1);
                warn!(error = %e, path = %self.store.path().display(), "state write failed");
            }
        }

        report
    }

    /// Summarize and deliver the buffer, then flush it and reset the clock
    /// whatever the outcome. A failed digest is not retried.
    async fn fire_digest(&mut self, now: DateTime<FixedOffset>) -> DigestOutcome {
        let entries = self.state.digest.sorted();
        let count = entries.len();
        let grouped = render_grouped(&entries, &self.classifier);
        let as_of = display_ts(&now);
        let timeout = self.settings.adapter_timeout;

        let result: Result<(), AdapterError> = async {
            let what = format!("{} summary", self.summarizer.name());
            let summary =
                within(what, timeout, self.summarizer.summarize(&grouped, &as_of)).await?;
            let what = format!("{} digest", self.notifier.name());
            let text = format_digest(&summary, self.settings.digest_interval);
            within(what, timeout, self.notifier.deliver(&text)).await
        }
        .await;

        self.state.digest.drain();
        self.state.last_digest_unix = now.timestamp();
        counter!("sentinel_digests_total").increment(1);

        match result {
            Ok(()) => {
                info!(entries = count, "digest sent");
                DigestOutcome::Sent { entries: count }
            }
            Err(e) => {
                counter!("sentinel_adapter_errors_total", "stage" => "digest").increment(1);
                warn!(error = %e, entries = count, "digest failed, buffer dropped");
                DigestOutcome::Failed { entries: count }
            }
        }
    }

    /// Poll until `shutdown` resolves. Shutdown is checked before each cycle and
    /// while sleeping, so a cycle always finishes (and persists) before the loop
    /// exits. The first check also polls `shutdown` once, which lets signal
    /// futures register their handler before any work starts.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            entities = self.watch_list.len(),
            sources = self.sources.len(),
            poll_secs = self.settings.poll_interval.as_secs(),
            "monitoring started"
        );

        loop {
            if shutdown.as_mut().now_or_never().is_some() {
                info!("shutdown requested, exiting between cycles");
                break;
            }
            let started = Instant::now();
            let report = self.run_cycle(now_kst()).await;
            info!(
                fetched = report.fetched,
                novel = report.novel,
                duplicates = report.duplicates,
                stale = report.stale,
                alerts = report.alerts_sent,
                digest = ?report.digest,
                "cycle done"
            );

            let pause = sleep_after(
                self.settings.poll_interval,
                started.elapsed(),
                self.settings.min_sleep,
            );
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, exiting between cycles");
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }
}
