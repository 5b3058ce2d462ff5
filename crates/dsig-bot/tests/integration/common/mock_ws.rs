//! Mock Deriv WebSocket server for integration tests.
//!
//! Provides a WebSocket server that can:
//! - Accept connections
//! - Record tick subscriptions and every received message
//! - Answer application-level pings
//! - Push frames to all connected clients on demand

use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// A mock Deriv WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    push_tx: broadcast::Sender<String>,
    messages: Arc<Mutex<VecDeque<String>>>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<u32>>,
}

#[derive(Clone)]
struct Shared {
    messages: Arc<Mutex<VecDeque<String>>>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<u32>>,
    push_tx: broadcast::Sender<String>,
}

impl MockWsServer {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (push_tx, _) = broadcast::channel::<String>(1024);

        let shared = Shared {
            messages: Arc::new(Mutex::new(VecDeque::new())),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            connections: Arc::new(Mutex::new(0)),
            push_tx: push_tx.clone(),
        };
        let server_shared = shared.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(stream, server_shared.clone()));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            push_tx,
            messages: shared.messages,
            subscriptions: shared.subscriptions,
            connections: shared.connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections received.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Get all received messages.
    pub async fn received_messages(&self) -> Vec<String> {
        self.messages.lock().await.iter().cloned().collect()
    }

    /// Symbols of every `ticks` subscription received, in order.
    pub async fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().await.clone()
    }

    /// Send a text frame to every connected client.
    pub fn push(&self, frame: String) {
        let _ = self.push_tx.send(frame);
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(stream: TcpStream, shared: Shared) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    // Subscribe before counting so no pushed frame is missed.
    let mut push_rx = shared.push_tx.subscribe();
    {
        let mut count = shared.connections.lock().await;
        *count += 1;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        shared.messages.lock().await.push_back(text.clone());

                        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&text) else {
                            continue;
                        };
                        if let Some(symbol) = parsed.get("ticks").and_then(|v| v.as_str()) {
                            shared.subscriptions.lock().await.push(symbol.to_string());
                        } else if parsed.get("ping").is_some() {
                            let response = serde_json::json!({
                                "echo_req": { "ping": 1 },
                                "msg_type": "ping",
                                "ping": "pong"
                            });
                            let _ = write.send(Message::Text(response.to_string())).await;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            frame = push_rx.recv() => {
                match frame {
                    Ok(frame) => {
                        if write.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockWsServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
