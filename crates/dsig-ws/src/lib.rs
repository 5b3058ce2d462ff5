//! WebSocket client for the Deriv tick stream.
//!
//! Provides:
//! - Automatic reconnection with exponential backoff
//! - Tick subscriptions restored on every (re)connect
//! - Application-level ping with pong timeout detection
//! - Channel-based message forwarding

pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod message;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use heartbeat::HeartbeatManager;
pub use message::{DerivMessage, DerivRequest};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
