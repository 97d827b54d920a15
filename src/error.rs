// src/error.rs
//! Error taxonomy.
//!
//! - `AdapterError`: anything that goes wrong talking to a source or an output
//!   channel. Always caught by the scheduler at the call site.
//! - `ConfigError`: startup validation. Fatal.
//! - `StateError`: reading/writing the persisted scheduler state.

use std::time::Duration;

use thiserror::Error;

use crate::ingest::types::EventSource;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{source_kind} request for {entity:?} failed: {err}")]
    Fetch {
        source_kind: EventSource,
        entity: String,
        #[source]
        err: reqwest::Error,
    },

    #[error("{what} returned HTTP {status}")]
    Status {
        what: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("could not parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("summary generation failed: {0}")]
    Summarize(String),

    #[error("no registry code known for {0:?}")]
    UnknownEntity(String),
}

impl AdapterError {
    pub fn parse(what: &'static str, detail: impl ToString) -> Self {
        Self::Parse {
            what,
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is missing or empty")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("reading {path}: {err}")]
    Io {
        path: String,
        #[source]
        err: std::io::Error,
    },

    #[error("malformed config file: {0}")]
    Format(String),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state io: {0}")]
    Io(#[from] std::io::Error),

    #[error("state json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bound an adapter call by `after`; an elapsed timer becomes `AdapterError::Timeout`.
pub(crate) async fn within<T, F>(what: impl Into<String>, after: Duration, fut: F) -> Result<T, AdapterError>
where
    F: std::future::Future<Output = Result<T, AdapterError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(res) => res,
        Err(_) => Err(AdapterError::Timeout {
            what: what.into(),
            after,
        }),
    }
}
