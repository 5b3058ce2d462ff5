//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<dsig_ws::WsError>),

    #[error("Core error: {0}")]
    Core(#[from] dsig_core::CoreError),

    #[error("Detector error: {0}")]
    Detector(#[from] dsig_detector::DetectorError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] dsig_scheduler::SchedulerError),

    #[error("Notification error: {0}")]
    Notify(#[from] dsig_notify::NotifyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] dsig_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
