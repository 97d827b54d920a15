// src/sentiment.rs
//! Keyword sentiment for headlines.
//!
//! Matching is plain substring containment on the untouched title. Sets are
//! checked in a fixed order: strong bear, strong bull, weak bear, weak bull.
//! The first hit wins, so bear beats bull and strong beats weak.

use serde::{Deserialize, Serialize};

use crate::config::keywords::KeywordConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    StrongBear,
    StrongBull,
    WeakBear,
    WeakBull,
    Neutral,
}

/// Digest grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Bull,
    Bear,
    Neutral,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Bull => "호재",
            Bucket::Bear => "악재",
            Bucket::Neutral => "중립",
        }
    }
}

impl Category {
    /// Strong categories trigger an immediate alert.
    pub fn is_strong(self) -> bool {
        matches!(self, Category::StrongBear | Category::StrongBull)
    }

    pub fn bucket(self) -> Bucket {
        match self {
            Category::StrongBear | Category::WeakBear => Bucket::Bear,
            Category::StrongBull | Category::WeakBull => Bucket::Bull,
            Category::Neutral => Bucket::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::StrongBear => "악재(강)",
            Category::StrongBull => "호재(강)",
            Category::WeakBear => "악재(보통)",
            Category::WeakBull => "호재(보통)",
            Category::Neutral => "중립",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    strong_bear: Vec<String>,
    strong_bull: Vec<String>,
    weak_bear: Vec<String>,
    weak_bull: Vec<String>,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

impl SentimentClassifier {
    pub fn new(cfg: &KeywordConfig) -> Self {
        Self {
            strong_bear: cfg.strong_bear.clone(),
            strong_bull: cfg.strong_bull.clone(),
            weak_bear: superset(&cfg.strong_bear, &cfg.weak_bear),
            weak_bull: superset(&cfg.strong_bull, &cfg.weak_bull),
        }
    }

    pub fn classify(&self, title: &str) -> Category {
        if contains_any(title, &self.strong_bear) {
            Category::StrongBear
        } else if contains_any(title, &self.strong_bull) {
            Category::StrongBull
        } else if contains_any(title, &self.weak_bear) {
            Category::WeakBear
        } else if contains_any(title, &self.weak_bull) {
            Category::WeakBull
        } else {
            Category::Neutral
        }
    }
}

fn superset(strong: &[String], extra: &[String]) -> Vec<String> {
    let mut out = strong.to_vec();
    for k in extra {
        if !out.contains(k) {
            out.push(k.clone());
        }
    }
    out
}

fn contains_any(text: &str, keys: &[String]) -> bool {
    keys.iter().any(|k| text.contains(k.as_str()))
}
