// src/summarize.rs
//! Digest summarizer: provider abstraction + the OpenAI chat completions provider.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::digest::window_label;
use crate::error::AdapterError;

pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AdapterError>> + Send + 'a>>;

/// Turns the grouped reference block into a finished report.
pub trait Summarizer: Send + Sync {
    /// `as_of` is the `YYYY-MM-DD HH:MM` reference time printed in the report.
    fn summarize<'a>(&'a self, grouped: &'a str, as_of: &'a str) -> SummaryFuture<'a>;

    fn name(&self) -> &'static str;
}

const SYSTEM_PROMPT: &str = "You are a concise financial news summarizer for KR equities.";

/// The report template the model is asked to fill. `window` reads like `1시간`.
pub fn build_prompt(grouped: &str, as_of: &str, window: &str) -> String {
    format!(
        r#"
너는 한국 주식 뉴스를 분류/요약하는 애널리스트다.
아래 입력(지난 {window} 내 새 이슈)을 바탕으로, 보기 좋은 리포트를 한국어로 작성해라.
형식은 아래와 완전히 동일하게 지켜라.

[요구 형식]
🕒 기준시각: {as_of}

🔎 최근 호재 (긍정적 뉴스)
- 항목 2~6개, 각 1줄: [종목명] 핵심 요지

⚠️ 최근 악재 (부정적 움직임)
- 항목 2~6개, 각 1줄: [종목명] 핵심 요지

📊 요약 표
구분 | 내용 요약
--- | ---
호재 | (쉼표로 2~4개 키 포인트)
악재 | (쉼표로 2~4개 키 포인트)

📌 투자 시사점
- 장기 관점: 1~2줄
- 단기 관점: 1~2줄

[참고 데이터]
{grouped}
"#
    )
}

/// OpenAI provider (Chat Completions API).
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    window: Duration,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stock-news-sentinel/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Summarize(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            model,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            window: Duration::from_secs(60 * 60),
        })
    }

    /// Digest interval named in the prompt.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

/// First non-blank choice content.
fn extract_content(body: &str) -> Result<String, AdapterError> {
    let resp: Resp = serde_json::from_str(body).map_err(|e| AdapterError::parse("openai response", e))?;
    resp.choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .ok_or_else(|| AdapterError::Summarize("empty completion".to_string()))
}

impl Summarizer for OpenAiSummarizer {
    fn summarize<'a>(&'a self, grouped: &'a str, as_of: &'a str) -> SummaryFuture<'a> {
        Box::pin(async move {
            let prompt = build_prompt(grouped, as_of, &window_label(self.window));
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: &prompt,
                    },
                ],
                temperature: 0.2,
            };

            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .map_err(|e| AdapterError::Summarize(format!("openai request: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(AdapterError::Status {
                    what: "openai chat completions",
                    status,
                });
            }
            let body = resp
                .text()
                .await
                .map_err(|e| AdapterError::Summarize(format!("openai body: {e}")))?;
            extract_content(&body)
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
