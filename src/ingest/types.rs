// src/ingest/types.rs
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Seconds east of UTC for Asia/Seoul. Every timestamp in the system is anchored here.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// The single fixed zone used for all comparisons.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in KST.
pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// Re-anchors any timestamp into KST.
pub fn to_kst<Tz: TimeZone>(ts: DateTime<Tz>) -> DateTime<FixedOffset> {
    ts.with_timezone(&kst())
}

/// `YYYY-MM-DD HH:MM`, as shown in alerts and digest lines.
pub fn display_ts(ts: &DateTime<FixedOffset>) -> String {
    to_kst(*ts).format("%Y-%m-%d %H:%M").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSource {
    /// Google News RSS.
    #[serde(rename = "news", alias = "feed")]
    Feed,
    /// DART disclosure registry.
    #[serde(rename = "dart", alias = "registry")]
    Registry,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Feed => "news",
            EventSource::Registry => "dart",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an adapter hands back. `published_at` is `None` when the source had no usable time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub source: EventSource,
    pub entity: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<FixedOffset>>,
}

impl RawEvent {
    /// Anchor to KST, substituting ingestion time for a missing publish time.
    pub fn into_event(self, ingested_at: DateTime<FixedOffset>) -> Event {
        Event {
            occurred_at: to_kst(self.published_at.unwrap_or(ingested_at)),
            source: self.source,
            entity: self.entity,
            title: self.title,
            url: self.url,
        }
    }
}

/// One observed report about one tracked entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub occurred_at: DateTime<FixedOffset>,
    pub source: EventSource,
    pub entity: String,
    pub title: String,
    pub url: String,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch recent events for one tracked entity. `now` is the cycle clock.
    async fn fetch(
        &self,
        entity: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError>;

    fn kind(&self) -> EventSource;
}
