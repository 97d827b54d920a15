// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod fingerprint;
pub mod ingest;
pub mod notify;
pub mod scheduler;
pub mod sentiment;
pub mod state;
pub mod summarize;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::error::{AdapterError, ConfigError, StateError};
pub use crate::ingest::types::{Event, EventSource, RawEvent, SourceAdapter};
pub use crate::notify::Notifier;
pub use crate::scheduler::{CycleReport, DigestOutcome, Scheduler, SchedulerSettings};
pub use crate::sentiment::{Category, SentimentClassifier};
pub use crate::summarize::Summarizer;
