//! Telegram Bot API dispatcher.
//!
//! Messages go out through `sendMessage`; the returned `message_id` is the
//! handle later passed to `deleteMessage`. Failures are logged here and
//! reported to the scheduler as a missing handle / `false`.

use crate::error::{NotifyError, NotifyResult};
use crate::format::MessageFormatter;
use dsig_scheduler::{BoxFuture, MessageHandle, NotificationDispatcher, SignalMessage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Telegram transport settings. The bot token is supplied separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Target chat (negative for groups and channels).
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_parse_mode() -> String {
    "HTML".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            chat_id: 0,
            parse_mode: default_parse_mode(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.chat_id == 0 {
            return Err("telegram.chat_id must be set".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("telegram.timeout_secs must be positive".to_string());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!(
                "telegram.api_base ({}) must be an http(s) URL",
                self.api_base
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest {
    chat_id: i64,
    message_id: i64,
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Dispatcher posting to a Telegram chat.
pub struct TelegramDispatcher {
    client: Client,
    /// `{api_base}/bot{token}`; never logged.
    bot_url: String,
    config: TelegramConfig,
    formatter: MessageFormatter,
}

impl TelegramDispatcher {
    pub fn new(
        config: TelegramConfig,
        token: &str,
        formatter: MessageFormatter,
    ) -> NotifyResult<Self> {
        if token.trim().is_empty() {
            return Err(NotifyError::InvalidConfig(
                "Telegram bot token is empty".to_string(),
            ));
        }
        config.validate().map_err(NotifyError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            bot_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), token.trim()),
            config,
            formatter,
        })
    }

    /// Send a text message, returning its `message_id`.
    pub async fn send_message(&self, text: &str) -> NotifyResult<i64> {
        let request = SendMessageRequest {
            chat_id: self.config.chat_id,
            text,
            parse_mode: &self.config.parse_mode,
        };
        let sent: SentMessage = self.call("sendMessage", &request).await?;
        Ok(sent.message_id)
    }

    pub async fn delete_message(&self, message_id: i64) -> NotifyResult<()> {
        let request = DeleteMessageRequest {
            chat_id: self.config.chat_id,
            message_id,
        };
        let deleted: bool = self.call("deleteMessage", &request).await?;
        if deleted {
            Ok(())
        } else {
            Err(NotifyError::Api {
                code: 0,
                description: "deleteMessage returned false".to_string(),
            })
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> NotifyResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.bot_url))
            .json(body)
            .send()
            .await
            .map_err(|e| NotifyError::HttpClient(format!("{method} request failed: {}", e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::HttpClient(format!("{method} body read failed: {}", e.without_url())))?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            NotifyError::HttpClient(format!("{method} returned HTTP {status}, undecodable body: {e}"))
        })?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(NotifyError::Api {
                code: error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: description.unwrap_or_else(|| "missing result".to_string()),
            }),
        }
    }
}

impl NotificationDispatcher for TelegramDispatcher {
    fn dispatch(
        &self,
        message: SignalMessage,
        revocable: bool,
    ) -> BoxFuture<'_, Option<MessageHandle>> {
        Box::pin(async move {
            let text = self.formatter.render(&message);
            match self.send_message(&text).await {
                Ok(message_id) => {
                    info!(message_id, phase = %message.phase(), revocable, "Telegram sent");
                    Some(MessageHandle(message_id))
                }
                Err(e) => {
                    error!(error = %e, phase = %message.phase(), "Telegram send failed");
                    None
                }
            }
        })
    }

    fn revoke(&self, handle: MessageHandle) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            match self.delete_message(handle.0).await {
                Ok(()) => {
                    debug!(message_id = handle.0, "Telegram message deleted");
                    true
                }
                Err(e) => {
                    warn!(message_id = handle.0, error = %e, "deleteMessage failed");
                    false
                }
            }
        })
    }
}
