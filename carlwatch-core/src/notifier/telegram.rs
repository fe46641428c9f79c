//! Telegram Bot API backend
//!
//! POSTs `{"chat_id": ..., "text": ...}` to `<api_base>/bot<token>/sendMessage`.
//! The request URL embeds the bot token, so it is never logged and is stripped
//! from transport errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::NotifierBackend;
use crate::config::{HttpSettings, TelegramCredentials};
use crate::error::DeliveryError;
use crate::retry::RetryPolicy;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

pub struct TelegramBackend {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
    retry: RetryPolicy,
}

impl TelegramBackend {
    pub fn new(
        credentials: TelegramCredentials,
        api_base: &str,
        http: &HttpSettings,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("carlwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(http.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: send_message_url(api_base, &credentials.bot_token),
            chat_id: credentials.chat_id,
            retry: http.retry,
        })
    }

    async fn send_once(&self, text: &str) -> Result<(), DeliveryError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        Ok(())
    }
}

fn send_message_url(api_base: &str, bot_token: &str) -> String {
    format!(
        "{}/bot{}/sendMessage",
        api_base.trim_end_matches('/'),
        bot_token
    )
}

#[async_trait]
impl NotifierBackend for TelegramBackend {
    async fn send(&self, text: &str) -> Result<()> {
        debug!("Posting {} chars to Telegram chat {}", text.len(), self.chat_id);

        self.retry
            .run(
                "Telegram sendMessage",
                || self.send_once(text),
                DeliveryError::is_transient,
            )
            .await
            .context("Failed to send Telegram message")
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
