//! Heartbeat tracking for the Deriv connection.
//!
//! Deriv expects an application-level `{"ping": 1}` and answers with a
//! `msg_type: "ping"` frame. A ping is only sent after the stream has been
//! quiet for a full interval, and the connection is considered dead when
//! the reply does not arrive within the timeout.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct HeartbeatInner {
    last_ping: Option<Instant>,
    last_message: Instant,
    waiting_for_pong: bool,
}

/// Heartbeat manager for WebSocket connection health.
#[derive(Debug)]
pub struct HeartbeatManager {
    interval: Duration,
    timeout: Duration,
    inner: Mutex<HeartbeatInner>,
}

impl HeartbeatManager {
    pub fn new(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            inner: Mutex::new(HeartbeatInner {
                last_ping: None,
                last_message: Instant::now(),
                waiting_for_pong: false,
            }),
        }
    }

    /// Reset heartbeat state (called on connection).
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.last_ping = None;
        inner.last_message = Instant::now();
        inner.waiting_for_pong = false;
    }

    pub fn record_ping(&self) {
        let mut inner = self.inner.lock();
        inner.last_ping = Some(Instant::now());
        inner.waiting_for_pong = true;
    }

    pub fn record_pong(&self) {
        let mut inner = self.inner.lock();
        inner.waiting_for_pong = false;
        if let Some(ping_time) = inner.last_ping {
            debug!(rtt_ms = ping_time.elapsed().as_millis() as u64, "Received pong");
        }
    }

    /// Record that any message was received.
    pub fn record_message(&self) {
        self.inner.lock().last_message = Instant::now();
    }

    pub fn is_timed_out(&self) -> bool {
        let inner = self.inner.lock();
        match (inner.waiting_for_pong, inner.last_ping) {
            (true, Some(ping_time)) => ping_time.elapsed() > self.timeout,
            _ => false,
        }
    }

    /// Whether the stream has been quiet long enough to warrant a ping.
    pub fn should_send_heartbeat(&self) -> bool {
        let inner = self.inner.lock();
        !inner.waiting_for_pong && inner.last_message.elapsed() >= self.interval
    }

    /// Wait for the next heartbeat check.
    pub async fn wait_for_check(&self) {
        tokio::time::sleep(self.interval / 2).await;
    }
}
