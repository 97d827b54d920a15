// src/digest.rs
//! Rolling buffer of novel events waiting for the next digest.

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ingest::types::{display_ts, Event, EventSource};
use crate::sentiment::{Bucket, SentimentClassifier};

/// Durable snapshot of a novel event. Field names match the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    #[serde(rename = "ts")]
    pub occurred_at: DateTime<FixedOffset>,
    #[serde(rename = "src")]
    pub source: EventSource,
    #[serde(rename = "stock")]
    pub entity: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl From<&Event> for DigestEntry {
    fn from(ev: &Event) -> Self {
        Self {
            occurred_at: ev.occurred_at,
            source: ev.source,
            entity: ev.entity.clone(),
            title: ev.title.clone(),
            url: ev.url.clone(),
        }
    }
}

/// `now - window`, saturating on absurd windows.
pub fn window_start(now: DateTime<FixedOffset>, window: Duration) -> DateTime<FixedOffset> {
    ChronoDuration::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset())
}

/// Korean label for the digest window: `1시간`, `2시간`, `30분`, `90분`.
pub fn window_label(window: Duration) -> String {
    let minutes = (window.as_secs() / 60).max(1);
    if minutes % 60 == 0 {
        format!("{}시간", minutes / 60)
    } else {
        format!("{minutes}분")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestBuffer {
    entries: Vec<DigestEntry>,
}

impl DigestBuffer {
    pub fn from_entries(entries: Vec<DigestEntry>) -> Self {
        Self { entries }
    }

    /// Drop entries with `occurred_at < now - window`. Returns how many went.
    pub fn prune(&mut self, now: DateTime<FixedOffset>, window: Duration) -> usize {
        let cutoff = window_start(now, window);
        let before = self.entries.len();
        self.entries.retain(|e| e.occurred_at >= cutoff);
        before - self.entries.len()
    }

    pub fn add(&mut self, ev: &Event) {
        self.entries.push(DigestEntry::from(ev));
    }

    /// Takes everything, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<DigestEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DigestEntry] {
        &self.entries
    }

    /// Copy sorted by `(entity, occurred_at)` for rendering.
    pub fn sorted(&self) -> Vec<DigestEntry> {
        let mut out = self.entries.clone();
        sort_for_digest(&mut out);
        out
    }
}

pub fn sort_for_digest(entries: &mut [DigestEntry]) {
    entries.sort_by(|a, b| {
        a.entity
            .cmp(&b.entity)
            .then_with(|| a.occurred_at.cmp(&b.occurred_at))
    });
}

/// Reference data block handed to the summarizer: one section per bucket,
/// `- entity | time | title | url` per line, `해당 없음` when a bucket is empty.
pub fn render_grouped(entries: &[DigestEntry], classifier: &SentimentClassifier) -> String {
    let mut bull = Vec::new();
    let mut bear = Vec::new();
    let mut neutral = Vec::new();

    for e in entries {
        let line = format!(
            "- {} | {} | {} | {}",
            e.entity,
            display_ts(&e.occurred_at),
            e.title,
            e.url
        );
        match classifier.classify(&e.title).bucket() {
            Bucket::Bull => bull.push(line),
            Bucket::Bear => bear.push(line),
            Bucket::Neutral => neutral.push(line),
        }
    }

    let join = |lines: &[String]| {
        if lines.is_empty() {
            "해당 없음".to_string()
        } else {
            lines.join("\n")
        }
    };

    format!(
        "[{}]\n{}\n\n[{}]\n{}\n\n[{}]\n{}",
        Bucket::Bull.label(),
        join(&bull),
        Bucket::Bear.label(),
        join(&bear),
        Bucket::Neutral.label(),
        join(&neutral)
    )
}
