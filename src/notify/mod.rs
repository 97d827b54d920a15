// src/notify/mod.rs
pub mod telegram;

use async_trait::async_trait;
use std::time::Duration;

use crate::digest::window_label;
use crate::error::AdapterError;
use crate::ingest::types::{display_ts, Event};
use crate::sentiment::{Bucket, Category};

pub use telegram::TelegramNotifier;

/// Outbound text channel (immediate alerts and digests share it).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), AdapterError>;

    fn name(&self) -> &'static str;
}

/// Immediate alert text for a strong event; `None` for anything weaker.
pub fn format_alert(ev: &Event, category: Category) -> Option<String> {
    if !category.is_strong() {
        return None;
    }
    let bucket = category.bucket();
    let emoji = match bucket {
        Bucket::Bear => "⚠️",
        _ => "✅",
    };
    Some(format!(
        "[속보]{emoji} [{}] {}\n• 제목: {}\n• 시각: {}\n{}",
        bucket.label(),
        ev.entity,
        ev.title,
        display_ts(&ev.occurred_at),
        ev.url
    ))
}

/// Digest message; `window` is the configured digest interval.
pub fn format_digest(summary: &str, window: Duration) -> String {
    format!(
        "📰 [다이제스트] 지난 {} 새 소식\n\n{}",
        window_label(window),
        summary.trim()
    )
}
