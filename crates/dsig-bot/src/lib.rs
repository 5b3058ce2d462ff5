//! digit-signal bot.
//!
//! Main application that wires all components together:
//! - Deriv tick stream over WebSocket
//! - Tick ingestion into per-instrument rolling buffers
//! - Slot scheduling driven by source time
//! - Candidate selection and Telegram (or log) delivery

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, DeliveryMode};
pub use error::{AppError, AppResult};
