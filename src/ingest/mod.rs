// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use metrics::counter;
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::digest::window_start;
use crate::error::within;
use crate::ingest::types::{RawEvent, SourceAdapter};

/// Display cleanup for feed titles: decode entities, strip tags, collapse whitespace.
pub fn clean_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("static regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("static regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Strictly inside the age window: `occurred_at > now - max_age`.
/// Something published exactly `max_age` ago is already stale.
pub fn is_fresh(
    occurred_at: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    max_age: Duration,
) -> bool {
    occurred_at > window_start(now, max_age)
}

/// Outcome of one fan-out over every (adapter, entity) pair.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Merged in adapter order, then watch-list order, then adapter's own order.
    pub events: Vec<RawEvent>,
    pub errors: usize,
}

/// Query all adapters for all entities concurrently, each call bounded by `timeout`.
///
/// Results are merged in a fixed order regardless of which call returns first,
/// so downstream dedup is deterministic. A failing call is logged and skipped.
pub async fn fetch_all(
    adapters: &[Box<dyn SourceAdapter>],
    entities: &[String],
    now: DateTime<FixedOffset>,
    timeout: Duration,
) -> FetchOutcome {
    let calls = adapters.iter().flat_map(move |adapter| {
        entities.iter().map(move |entity| async move {
            let what = format!("{} fetch for {entity}", adapter.kind());
            let res = within(what, timeout, adapter.fetch(entity, now)).await;
            (adapter.kind(), entity.as_str(), res)
        })
    });

    let mut out = FetchOutcome::default();
    for (kind, entity, res) in join_all(calls).await {
        match res {
            Ok(mut v) => {
                tracing::debug!(source = %kind, entity, count = v.len(), "fetched");
                counter!("sentinel_events_fetched_total", "source" => kind.as_str())
                    .increment(v.len() as u64);
                out.events.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = %e, source = %kind, entity, "source adapter failed");
                counter!("sentinel_adapter_errors_total", "stage" => "fetch").increment(1);
                out.errors += 1;
            }
        }
    }
    out
}
