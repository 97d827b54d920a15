// src/fingerprint.rs
//! Event identity: normalized title + url -> 24 hex chars of SHA-256.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase, collapse whitespace runs, drop punctuation outside the allow-list
/// (`%`, `+`, `-`, en/em dashes, middle dot). Word characters, Hangul included, survive.
pub fn normalize_title(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    static RE_PUNCT: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    let re_punct = RE_PUNCT
        .get_or_init(|| Regex::new(r"[^\w가-힣%+\-–—·\s]").expect("static regex"));

    let lower = s.to_lowercase();
    let collapsed = re_ws.replace_all(&lower, " ");
    let stripped = re_punct.replace_all(&collapsed, "");
    stripped.trim().to_string()
}

pub fn fingerprint(title: &str, url: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(normalize_title(title).as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(FINGERPRINT_LEN);
    for b in digest.iter().take(FINGERPRINT_LEN / 2) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    Fingerprint(out)
}
