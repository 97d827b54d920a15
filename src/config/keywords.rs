// src/config/keywords.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Keyword lists for the classifier. `weak_*` hold only the extra weak terms;
/// the classifier unions them with the strong list of the same polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub strong_bull: Vec<String>,
    pub strong_bear: Vec<String>,
    #[serde(default)]
    pub weak_bull: Vec<String>,
    #[serde(default)]
    pub weak_bear: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            strong_bull: owned(&[
                "무상증자",
                "자사주 매입",
                "배당 확대",
                "고배당",
                "특허 취득",
                "신제품",
                "지수 편입",
                "정부 정책",
                "경영권 분쟁 승소",
                "액면분할",
                "목표가 상향",
                "매수 의견",
                "어닝 서프라이즈",
                "실적 개선",
            ]),
            strong_bear: owned(&[
                "유상증자",
                "무상감자",
                "전환사채",
                "주식관련사채",
                "불성실공시",
                "관리종목 지정",
                "감사의견",
                "의견거절",
                "부적정",
                "한정",
                "실적 악화",
                "가이던스 하향",
                "규제 강화",
                "환율 부담",
                "원자재 가격 상승",
                "소송",
                "횡령",
                "배임",
                "거래정지",
                "상장적격성",
                "대량 매도",
                "임원 매도",
                "최대주주 매도",
            ]),
            weak_bull: owned(&["수주", "공급 계약", "사업 제휴", "인증 획득", "수혜", "테마"]),
            weak_bear: owned(&["리콜", "계약 해지", "손상차손", "파기", "벌금", "제재", "압수수색"]),
        }
    }
}

impl KeywordConfig {
    /// Load from a TOML or JSON file (picked by extension, TOML if unknown).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            err,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: KeywordConfig = if ext == "json" {
            serde_json::from_str(&content).map_err(|e| ConfigError::Format(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Format(e.to_string()))?
        };
        Ok(cfg.cleaned())
    }

    /// Trim entries, drop empties and repeats.
    pub fn cleaned(self) -> Self {
        Self {
            strong_bull: clean_list(self.strong_bull),
            strong_bear: clean_list(self.strong_bear),
            weak_bull: clean_list(self.weak_bull),
            weak_bear: clean_list(self.weak_bear),
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}
