//! Notification error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Invalid notification config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
