//! Outbound transports for slot messages.
//!
//! - [`TelegramDispatcher`]: Telegram Bot API (`sendMessage` / `deleteMessage`)
//! - [`LogDispatcher`]: renders into the log, for dry runs
//! - [`MessageFormatter`]: HTML rendering shared by both

pub mod error;
pub mod format;
pub mod log_sink;
pub mod telegram;

pub use error::{NotifyError, NotifyResult};
pub use format::MessageFormatter;
pub use log_sink::LogDispatcher;
pub use telegram::{TelegramConfig, TelegramDispatcher};
