// src/state.rs
//! Scheduler state and its JSON file.
//!
//! Layout on disk:
//! `{ "seen_hashes": [...], "digest_buffer": [{ts, src, stock, title, url}], "last_digest_unix": 0 }`

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::dedup::{DedupStore, DEFAULT_DEDUP_CAPACITY};
use crate::digest::{DigestBuffer, DigestEntry};
use crate::error::StateError;
use crate::fingerprint::Fingerprint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub seen_hashes: Vec<Fingerprint>,
    #[serde(default)]
    pub digest_buffer: Vec<DigestEntry>,
    #[serde(default)]
    pub last_digest_unix: i64,
}

#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub dedup: DedupStore,
    pub digest: DigestBuffer,
    /// Epoch seconds of the last digest attempt; 0 = never.
    pub last_digest_unix: i64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::empty(DEFAULT_DEDUP_CAPACITY)
    }
}

impl SchedulerState {
    pub fn empty(dedup_capacity: usize) -> Self {
        Self {
            dedup: DedupStore::with_capacity(dedup_capacity),
            digest: DigestBuffer::default(),
            last_digest_unix: 0,
        }
    }

    pub fn from_persisted(p: PersistedState, dedup_capacity: usize) -> Self {
        Self {
            dedup: DedupStore::from_persisted(p.seen_hashes, dedup_capacity),
            digest: DigestBuffer::from_entries(p.digest_buffer),
            last_digest_unix: p.last_digest_unix,
        }
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            seen_hashes: self.dedup.iter().cloned().collect(),
            digest_buffer: self.digest.entries().to_vec(),
            last_digest_unix: self.last_digest_unix,
        }
    }
}

/// File-backed store for `SchedulerState`.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    dedup_capacity: usize,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
        }
    }

    pub fn with_dedup_capacity(mut self, cap: usize) -> Self {
        self.dedup_capacity = cap;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub async fn try_load(&self) -> Result<Option<SchedulerState>, StateError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let p: PersistedState = serde_json::from_str(&raw)?;
        Ok(Some(SchedulerState::from_persisted(p, self.dedup_capacity)))
    }

    /// Missing file or unreadable contents both give empty defaults.
    pub async fn load(&self) -> SchedulerState {
        match self.try_load().await {
            Ok(Some(s)) => {
                tracing::info!(
                    path = %self.path.display(),
                    seen = s.dedup.len(),
                    buffered = s.digest.len(),
                    "state loaded"
                );
                s
            }
            Ok(None) => SchedulerState::empty(self.dedup_capacity),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "state unreadable, starting empty");
                SchedulerState::empty(self.dedup_capacity)
            }
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    pub async fn save(&self, state: &SchedulerState) -> Result<(), StateError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(&state.to_persisted())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
