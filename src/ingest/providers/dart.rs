// src/ingest/providers/dart.rs
//! DART (전자공시) filings for today, per tracked company.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

use crate::error::{AdapterError, ConfigError};
use crate::ingest::is_fresh;
use crate::ingest::types::{kst, EventSource, RawEvent, SourceAdapter};

pub const DART_LIST_URL: &str = "https://opendart.fss.or.kr/api/list.json";
pub const DART_VIEWER_URL: &str = "https://dart.fss.or.kr/dsaf001/main.do";
pub const DART_CORP_CODE_URL: &str = "https://opendart.fss.or.kr/api/corpCode.xml";
const CORP_CODE_ENTRY: &str = "CORPCODE.xml";

/// Company name -> 8 digit DART corp code.
#[derive(Debug, Clone, Default)]
pub struct CorpCodeMap {
    by_name: BTreeMap<String, String>,
}

impl CorpCodeMap {
    pub fn new(by_name: BTreeMap<String, String>) -> Self {
        Self { by_name }
    }

    /// Reads the `{ "name": "code" }` JSON cache.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            err,
        })?;
        let by_name: BTreeMap<String, String> = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Format(format!("{}: {e}", path.display())))?;
        Ok(Self::from_pairs(by_name))
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let by_name = pairs
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { by_name }
    }

    /// Cached map at `path` if present, otherwise a fresh download (which refreshes the cache).
    pub async fn load_or_download(
        client: &reqwest::Client,
        api_key: &str,
        path: &Path,
    ) -> Result<Self, AdapterError> {
        if path.exists() {
            match Self::load(path) {
                Ok(map) => return Ok(map),
                Err(e) => tracing::warn!(error = %e, "dart corp code cache unreadable, downloading"),
            }
        }
        Self::download(client, api_key, path).await
    }

    /// Fetch the zipped `corpCode.xml` listing and write it to `path` as `{ "name": "code" }`.
    /// A cache write failure is logged; the downloaded map is still returned.
    pub async fn download(
        client: &reqwest::Client,
        api_key: &str,
        path: &Path,
    ) -> Result<Self, AdapterError> {
        let fetch_err = |err| AdapterError::Fetch {
            source_kind: EventSource::Registry,
            entity: CORP_CODE_ENTRY.to_string(),
            err,
        };
        let resp = client
            .get(DART_CORP_CODE_URL)
            .query(&[("crtfc_key", api_key)])
            .send()
            .await
            .map_err(fetch_err)?;
        if !resp.status().is_success() {
            return Err(AdapterError::Status {
                what: "dart corpCode.xml",
                status: resp.status(),
            });
        }
        let bytes = resp.bytes().await.map_err(fetch_err)?;
        let map = parse_corp_code_archive(&bytes)?;

        match serde_json::to_string_pretty(&map.by_name) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(path, json).await {
                    tracing::warn!(error = %e, path = %path.display(), "dart corp code cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "dart corp code cache encode failed"),
        }
        tracing::info!(companies = map.len(), "dart corp codes downloaded");
        Ok(map)
    }

    /// Exact name first, then the first (by name order) company whose name contains `name`.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some(code) = self.by_name.get(name) {
            return Some(code.as_str());
        }
        self.by_name
            .iter()
            .find(|(n, _)| n.contains(name))
            .map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CorpCodeDoc {
    #[serde(rename = "list", default)]
    list: Vec<CorpCodeRow>,
}

#[derive(Debug, Deserialize)]
struct CorpCodeRow {
    #[serde(default)]
    corp_code: String,
    #[serde(default)]
    corp_name: String,
}

/// `<result><list><corp_code/><corp_name/>...</list>...</result>`. Later duplicates win.
pub fn parse_corp_code_xml(xml: &str) -> Result<CorpCodeMap, AdapterError> {
    let doc: CorpCodeDoc =
        quick_xml::de::from_str(xml).map_err(|e| AdapterError::parse("dart corpCode.xml", e))?;
    Ok(CorpCodeMap::from_pairs(
        doc.list.into_iter().map(|r| (r.corp_name, r.corp_code)),
    ))
}

/// The download is a zip holding a single `CORPCODE.xml`.
pub fn parse_corp_code_archive(bytes: &[u8]) -> Result<CorpCodeMap, AdapterError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AdapterError::parse("dart corpCode zip", e))?;
    let mut entry = archive
        .by_name(CORP_CODE_ENTRY)
        .map_err(|e| AdapterError::parse("dart corpCode zip", e))?;
    let mut raw = Vec::new();
    entry
        .read_to_end(&mut raw)
        .map_err(|e| AdapterError::parse("dart corpCode zip", e))?;
    parse_corp_code_xml(&String::from_utf8_lossy(&raw))
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    list: Vec<Filing>,
}

#[derive(Debug, Deserialize)]
struct Filing {
    rcept_no: Option<String>,
    report_nm: Option<String>,
    rcept_dt: Option<String>,
    rcept_tm: Option<String>,
}

/// `rcept_dt` (YYYYMMDD) plus optional `rcept_tm` (HHMMSS). Anything unparseable is `now`.
pub fn filing_time(
    rcept_dt: Option<&str>,
    rcept_tm: Option<&str>,
    now: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    let Some(date) = rcept_dt.filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
    else {
        return now;
    };
    let hhmmss = rcept_tm.filter(|t| !t.is_empty()).unwrap_or("000000");
    NaiveDateTime::parse_from_str(&format!("{date}{hhmmss}"), "%Y%m%d%H%M%S")
        .ok()
        .and_then(|naive| kst().from_local_datetime(&naive).single())
        .unwrap_or(now)
}

/// Parse a `list.json` body. A non-"000" status yields no events.
pub fn parse_listing(
    body: &str,
    entity: &str,
    now: DateTime<FixedOffset>,
    max_age: Duration,
) -> Result<Vec<RawEvent>, AdapterError> {
    let resp: ListResponse =
        serde_json::from_str(body).map_err(|e| AdapterError::parse("dart list.json", e))?;
    if resp.status != "000" {
        tracing::debug!(
            entity,
            status = %resp.status,
            message = resp.message.as_deref().unwrap_or(""),
            "dart returned no filings"
        );
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(resp.list.len());
    for row in resp.list {
        let Some(rcp_no) = row.rcept_no.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            continue;
        };
        let ts = filing_time(row.rcept_dt.as_deref(), row.rcept_tm.as_deref(), now);
        if !is_fresh(ts, now, max_age) {
            continue;
        }
        out.push(RawEvent {
            source: EventSource::Registry,
            entity: entity.to_string(),
            title: row.report_nm.unwrap_or_default().trim().to_string(),
            url: format!("{DART_VIEWER_URL}?rcpNo={rcp_no}"),
            published_at: Some(ts),
        });
    }
    Ok(out)
}

pub struct DartAdapter {
    client: reqwest::Client,
    api_key: String,
    corp_codes: CorpCodeMap,
    endpoint: String,
    max_age: Duration,
}

impl DartAdapter {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        corp_codes: CorpCodeMap,
        max_age: Duration,
    ) -> Self {
        Self {
            client,
            api_key,
            corp_codes,
            endpoint: DART_LIST_URL.to_string(),
            max_age,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SourceAdapter for DartAdapter {
    async fn fetch(
        &self,
        entity: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<RawEvent>, AdapterError> {
        let Some(corp_code) = self.corp_codes.resolve(entity) else {
            return Err(AdapterError::UnknownEntity(entity.to_string()));
        };
        let today = now.format("%Y%m%d").to_string();
        let fetch_err = |err| AdapterError::Fetch {
            source_kind: EventSource::Registry,
            entity: entity.to_string(),
            err,
        };

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("crtfc_key", self.api_key.as_str()),
                ("corp_code", corp_code),
                ("bgn_de", today.as_str()),
                ("page_no", "1"),
                ("page_count", "100"),
            ])
            .send()
            .await
            .map_err(fetch_err)?;
        if !resp.status().is_success() {
            return Err(AdapterError::Status {
                what: "dart list.json",
                status: resp.status(),
            });
        }
        let body = resp.text().await.map_err(fetch_err)?;
        parse_listing(&body, entity, now, self.max_age)
    }

    fn kind(&self) -> EventSource {
        EventSource::Registry
    }
}
