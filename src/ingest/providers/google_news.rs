// src/ingest/providers/google_news.rs
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::error::AdapterError;
use crate::ingest::types::{to_kst, EventSource, RawEvent, SourceAdapter};
use crate::ingest::{clean_title, is_fresh};

pub const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";
const MAX_ITEMS: usize = 30;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<FixedOffset>> {
    let odt = OffsetDateTime::parse(ts.trim(), &Rfc2822).ok()?;
    DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond()).map(to_kst)
}

/// Parse a Google News RSS document for `entity`.
///
/// Keeps the first 30 items. Items without a parseable `pubDate` or older than
/// `max_age` are skipped, as are items with an empty title.
pub fn parse_feed(
    xml: &str,
    entity: &str,
    now: DateTime<FixedOffset>,
    max_age: Duration,
) -> Result<Vec<RawEvent>, AdapterError> {
    let rss: Rss = from_str(xml).map_err(|e| AdapterError::parse("news rss xml", e))?;

    let mut out = Vec::new();
    for it in rss.channel.item.into_iter().take(MAX_ITEMS) {
        let Some(published) = it.pub_date.as_deref().and_then(parse_rfc2822) else {
            continue;
        };
        if !is_fresh(published, now, max_age) {
            continue;
        }
        let title = clean_title(it.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        out.push(RawEvent {
            source: EventSource::Feed,
            entity: entity.to_string(),
            title,
            url: it.link.unwrap_or_default().trim().to_string(),
            published_at: Some(published),
        });
    }
    Ok(out)
}

pub struct GoogleNewsAdapter {
    client: reqwest::Client,
    endpoint: String,
    max_age: Duration,
}

impl GoogleNewsAdapter {
    pub fn new(client: reqwest::Client, max_age: Duration) -> Self {
        Self {
            client,
            endpoint: GOOGLE_NEWS_RSS.to_string(),
            max_age,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SourceAdapter for GoogleNewsAdapter {
    async fn fetch(
        &self,
        entity: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        let fetch_err = |err| AdapterError::Fetch {
            source_kind: EventSource::Feed,
            entity: entity.to_string(),
            err,
        };
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", entity), ("hl", "ko"), ("gl", "KR"), ("ceid", "KR:ko")])
            .send()
            .await
            .map_err(fetch_err)?;
        if !resp.status().is_success() {
            return Err(AdapterError::Status {
                what: "google news rss",
                status: resp.status(),
            });
        }
        let body = resp.text().await.map_err(fetch_err)?;
        parse_feed(&body, entity, now, self.max_age)
    }

    fn kind(&self) -> EventSource {
        EventSource::Feed
    }
}
