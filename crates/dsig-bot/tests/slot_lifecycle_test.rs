//! End-to-end slot lifecycle tests.
//!
//! Runs the full application against a mock tick stream and checks the
//! messages handed to the dispatcher as streamed source time crosses the
//! advance notice, firing and expiry instants of a slot.

mod integration;
use integration::common::mock_ws::MockWsServer;
use integration::common::{tick_frame, wait_until};

use dsig_bot::config::InstrumentConfig;
use dsig_bot::{AppConfig, Application};
use dsig_core::{DigitRule, InstrumentId};
use dsig_scheduler::{MessageHandle, MockDispatcher, SignalMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const WAIT: Duration = Duration::from_secs(5);

fn test_config(url: String) -> AppConfig {
    let mut config = AppConfig {
        ws_url: url,
        instruments: vec![InstrumentConfig {
            symbol: "R_10".to_string(),
            display_name: Some("Volatility 10 Index".to_string()),
        }],
        buffer_capacity: 100,
        ..Default::default()
    };
    config.detector.min_samples = 10;
    config.scheduler.poll_interval_ms = 20;
    config.websocket.reconnect_base_delay_ms = 50;
    config.websocket.reconnect_max_delay_ms = 500;
    config
}

struct Harness {
    server: MockWsServer,
    mock: Arc<MockDispatcher>,
    shutdown_tx: oneshot::Sender<()>,
    app_handle: JoinHandle<dsig_bot::AppResult<()>>,
}

async fn start() -> Harness {
    let server = MockWsServer::start().await;
    let mock = Arc::new(MockDispatcher::new());
    let app = Application::with_dispatcher(test_config(server.url()), mock.clone()).unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app_handle = tokio::spawn(app.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    let srv = &server;
    assert!(wait_until(WAIT, move || async move { srv.subscriptions().await == vec!["R_10"] }).await);

    Harness {
        server,
        mock,
        shutdown_tx,
        app_handle,
    }
}

/// Alternating last digits 1, 9, 1, 9, … ending at `last_epoch`.
fn push_history(server: &MockWsServer, count: i64, last_epoch: i64) {
    for i in 0..count {
        let quote = if i % 2 == 0 { "100.1" } else { "100.9" };
        server.push(tick_frame("R_10", quote, last_epoch - count + 1 + i));
    }
}

async fn wait_dispatched(mock: &MockDispatcher, n: usize) -> bool {
    wait_until(WAIT, move || async move { mock.dispatched().len() >= n }).await
}

async fn stop(h: Harness) -> Arc<MockDispatcher> {
    let _ = h.shutdown_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(15), h.app_handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    h.server.shutdown().await;
    h.mock
}

#[tokio::test]
async fn test_full_slot_lifecycle() {
    let h = start().await;

    // 461..=480: the last tick opens the advance window of slot 600.
    push_history(&h.server, 20, 480);
    assert!(wait_dispatched(&h.mock, 1).await, "advance notice not sent");

    let (advance, revocable) = h.mock.dispatched()[0].clone();
    assert!(revocable);
    let SignalMessage::AdvanceNotice {
        slot_epoch,
        lead_secs,
        candidate,
    } = advance
    else {
        panic!("expected advance notice, got {advance:?}");
    };
    assert_eq!(slot_epoch, 600);
    assert_eq!(lead_secs, 120);
    let candidate = candidate.expect("enough history for a candidate");
    assert_eq!(candidate.instrument, InstrumentId::new("R_10"));
    assert_eq!(candidate.rule, DigitRule::over(3));
    assert_eq!(candidate.preceding_digit, 1);

    h.server.push(tick_frame("R_10", "100.1", 600));
    assert!(wait_dispatched(&h.mock, 2).await, "firing not sent");
    let (firing, revocable) = h.mock.dispatched()[1].clone();
    assert!(revocable);
    assert_eq!(
        firing,
        SignalMessage::Firing {
            slot_epoch: 600,
            expiry_epoch: 900,
            candidate: Some(candidate),
        }
    );

    h.server.push(tick_frame("R_10", "100.9", 900));
    assert!(wait_dispatched(&h.mock, 3).await, "expiry not sent");
    let (expiry, revocable) = h.mock.dispatched()[2].clone();
    assert!(!revocable);
    assert_eq!(
        expiry,
        SignalMessage::Expiry {
            expiry_epoch: 900,
            next_slot_epoch: 1200,
        }
    );

    let mock = &h.mock;
    assert!(wait_until(WAIT, move || async move { mock.revoked().len() == 2 }).await);
    assert_eq!(h.mock.revoked(), vec![MessageHandle(1), MessageHandle(2)]);

    let mock = stop(h).await;
    // Nothing left to revoke, nothing sent twice.
    assert_eq!(mock.dispatched().len(), 3);
    assert_eq!(mock.revoked().len(), 2);
}

#[tokio::test]
async fn test_no_messages_without_source_time() {
    let h = start().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let mock = stop(h).await;
    assert!(mock.dispatched().is_empty());
    assert!(mock.revoked().is_empty());
}

#[tokio::test]
async fn test_shutdown_revokes_outstanding_messages() {
    let h = start().await;

    push_history(&h.server, 20, 480);
    assert!(wait_dispatched(&h.mock, 1).await);

    let mock = stop(h).await;
    assert_eq!(mock.dispatched().len(), 1);
    assert_eq!(mock.revoked(), vec![MessageHandle(1)]);
}
