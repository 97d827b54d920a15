// src/notify/telegram.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::error::AdapterError;

pub const TELEGRAM_API: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage`. One attempt per call; the poll loop is the retry.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    api_base: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(client: Client, token: String, chat_id: String) -> Self {
        Self {
            client,
            token,
            chat_id,
            api_base: TELEGRAM_API.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str) -> Result<(), AdapterError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        let rsp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .form(&body)
            .send()
            .await
            // without_url: the token is part of the path
            .map_err(|e| AdapterError::Delivery(format!("telegram request failed: {}", e.without_url())))?;

        let status = rsp.status();
        if !status.is_success() {
            let detail = rsp.text().await.unwrap_or_default();
            return Err(AdapterError::Delivery(format!(
                "telegram HTTP {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_token() {
        let n = TelegramNotifier::new(Client::new(), "123:abc".into(), "42".into())
            .with_api_base("http://localhost:9/");
        assert_eq!(n.endpoint(), "http://localhost:9/bot123:abc/sendMessage");
    }
}
