//! WebSocket connection manager.
//!
//! Handles connection lifecycle, automatic reconnection with exponential
//! backoff, and tick subscription restoration after reconnection.

use crate::error::{WsError, WsResult};
use crate::heartbeat::HeartbeatManager;
use crate::message::{DerivMessage, DerivRequest};
use dsig_telemetry::Metrics;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL, including the `app_id` query parameter.
    pub url: String,
    /// Symbols to subscribe to on every connect.
    pub symbols: Vec<String>,
    /// Maximum reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff.
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    pub reconnect_max_delay_ms: u64,
    /// Quiet period after which an application-level ping is sent.
    pub ping_interval_ms: u64,
    /// Pong must arrive within this.
    pub pong_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            symbols: Vec::new(),
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: 3000,
            reconnect_max_delay_ms: 60000,
            ping_interval_ms: 30000,
            pong_timeout_ms: 10000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// WebSocket connection manager.
pub struct ConnectionManager {
    config: ConnectionConfig,
    state: Arc<RwLock<ConnectionState>>,
    heartbeat: HeartbeatManager,
    message_tx: mpsc::Sender<DerivMessage>,
    reconnect_count: RwLock<u32>,
    shutdown_token: CancellationToken,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, message_tx: mpsc::Sender<DerivMessage>) -> Self {
        let heartbeat = HeartbeatManager::new(config.ping_interval_ms, config.pong_timeout_ms);
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            heartbeat,
            message_tx,
            reconnect_count: RwLock::new(0),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Consecutive failed attempts since the last successful connect.
    pub fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.read()
    }

    /// Signal graceful shutdown.
    ///
    /// Both the message loop and the reconnect loop exit promptly.
    pub fn shutdown(&self) {
        info!("ConnectionManager shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and run the message loop, reconnecting until shutdown or
    /// until the attempt limit is reached.
    pub async fn connect(&self) -> WsResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            self.set_state(ConnectionState::Connecting);

            let reason = match self.try_connect(&mut attempt).await {
                Ok(()) => {
                    info!("WebSocket connection closed");
                    "closed"
                }
                Err(WsError::HeartbeatTimeout) => {
                    error!("Heartbeat timeout");
                    "heartbeat_timeout"
                }
                Err(e) => {
                    error!(?e, "WebSocket connection error");
                    "error"
                }
            };
            Metrics::ws_disconnected();

            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            attempt += 1;
            *self.reconnect_count.write() = attempt;

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                self.set_state(ConnectionState::Disconnected);
                return Err(WsError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            self.set_state(ConnectionState::Reconnecting);
            Metrics::ws_reconnect(reason);

            let delay = self.calculate_backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self, attempt: &mut u32) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        self.set_state(ConnectionState::Connected);
        *attempt = 0;
        *self.reconnect_count.write() = 0;
        Metrics::ws_connected();
        info!("WebSocket connected");

        self.restore_subscriptions(&mut write).await?;
        self.heartbeat.reset();

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text_message(&text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            trace!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(?e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }

                () = self.heartbeat.wait_for_check() => {
                    if self.heartbeat.is_timed_out() {
                        return Err(WsError::HeartbeatTimeout);
                    }
                    if self.heartbeat.should_send_heartbeat() {
                        write.send(Message::Text(DerivRequest::ping().to_json()?)).await?;
                        self.heartbeat.record_ping();
                        debug!("Sent heartbeat ping");
                    }
                }
            }
        }
    }

    async fn handle_text_message(&self, text: &str) {
        self.heartbeat.record_message();

        let msg = match DerivMessage::parse(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(?e, "Dropping undecodable frame");
                return;
            }
        };

        if msg.is_pong() {
            self.heartbeat.record_pong();
            return;
        }

        if self.message_tx.send(msg).await.is_err() {
            warn!("Message receiver dropped");
        }
    }

    async fn restore_subscriptions(&self, write: &mut WsSink) -> WsResult<()> {
        info!(count = self.config.symbols.len(), "Restoring tick subscriptions");

        for symbol in &self.config.symbols {
            let request = DerivRequest::subscribe_ticks(symbol.as_str()).to_json()?;
            write.send(Message::Text(request)).await?;
            debug!(%symbol, "Tick subscription sent");
        }

        Ok(())
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        backoff_delay(
            self.config.reconnect_base_delay_ms,
            self.config.reconnect_max_delay_ms,
            attempt,
        ) + Duration::from_millis(rand_jitter())
    }
}

/// Exponential backoff without jitter: `base * 2^(attempt-1)`, capped.
fn backoff_delay(base_ms: u64, max_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    let delay = base_ms.saturating_mul(1u64 << exponent);
    Duration::from_millis(delay.min(max_ms))
}

/// Generate random jitter (0-1000ms).
fn rand_jitter() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos % 1000)
}
