//! Telegram Bot API transport.
//!
//! `POST {base}/bot{token}/sendMessage` with `parse_mode = Markdown`.
//! The token is part of the URL, so transport errors are stripped of it
//! before they reach logs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AlertSink, DeliveryError, Recipient};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Delivers alerts through a Telegram bot.
pub struct TelegramSink {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramSink {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, DeliveryError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("empty bot token".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

/// Request body; numeric chat ids are sent as numbers.
fn send_message_body(recipient: &Recipient, message: &str) -> Value {
    let chat_id = match recipient.as_str().parse::<i64>() {
        Ok(id) => json!(id),
        Err(_) => json!(recipient.as_str()),
    };
    json!({
        "chat_id": chat_id,
        "text": message,
        "parse_mode": "Markdown",
    })
}

#[async_trait]
impl AlertSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&send_message_body(recipient, message))
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        let body: ApiResponse = resp.json().await.map_err(|e| {
            DeliveryError::Transport(format!("unreadable response: {}", e.without_url()))
        })?;

        if !status.is_success() || !body.ok {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: body.description.unwrap_or_else(|| "no description".into()),
            });
        }
        Ok(())
    }
}
