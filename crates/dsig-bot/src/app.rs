//! Application orchestration.
//!
//! Wires the tick stream, ingestion and slot scheduler together:
//! 1. WebSocket task subscribes to every instrument and forwards frames
//! 2. Ingestion task appends ticks to the shared tick store
//! 3. Scheduler task emits slot messages as source time advances

use crate::config::{AppConfig, DeliveryMode};
use crate::error::{AppError, AppResult};
use dsig_detector::CandidateSelector;
use dsig_feed::{Ingestor, TickStore};
use dsig_notify::{LogDispatcher, MessageFormatter, TelegramDispatcher};
use dsig_scheduler::{DynDispatcher, SlotScheduler};
use dsig_telemetry::SessionStatsReporter;
use dsig_ws::{ConnectionManager, DerivMessage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Env var holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "DSIG_TELEGRAM_TOKEN";

const MESSAGE_CHANNEL_CAPACITY: usize = 1000;

/// Revocable messages that can be outstanding at shutdown: advance notice
/// and firing of the closing slot, plus the next slot's advance notice.
const MAX_OUTSTANDING_HANDLES: u32 = 3;

/// Slack on top of the revoke requests themselves.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(2);

/// Upper bound on the remaining tasks after the scheduler is done.
const TASK_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Main application.
pub struct Application {
    config: AppConfig,
    store: Arc<TickStore>,
    scheduler: SlotScheduler,
    stats: SessionStatsReporter,
}

impl Application {
    /// Create the application with the dispatcher selected by `mode`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let token = std::env::var(TELEGRAM_TOKEN_ENV).ok();
        let formatter = MessageFormatter::new(
            config.display.utc_offset_minutes,
            config.display.zone_label.clone(),
            config.display_names(),
        )?;
        let dispatcher = build_dispatcher(&config, token, formatter)?;
        Self::with_dispatcher(config, dispatcher)
    }

    /// Create the application around an existing dispatcher.
    pub fn with_dispatcher(config: AppConfig, dispatcher: DynDispatcher) -> AppResult<Self> {
        config.validate()?;

        let instruments = config.instrument_ids()?;
        let store = Arc::new(TickStore::new(instruments, config.buffer_capacity));
        let selector = CandidateSelector::new(config.detector.clone())?;
        let scheduler =
            SlotScheduler::new(&config.scheduler, selector, store.clone(), dispatcher)?;
        let stats = SessionStatsReporter::new(
            store.instruments().iter().map(ToString::to_string).collect(),
        );

        Ok(Self {
            config,
            store,
            scheduler,
            stats,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared tick store fed by the ingestion task.
    pub fn store(&self) -> Arc<TickStore> {
        self.store.clone()
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(?e, "Failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// Run until `shutdown` completes or the WebSocket task gives up.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            store,
            scheduler,
            stats,
        } = self;

        info!(mode = ?config.mode, "Starting application");
        let grace = shutdown_grace(&config);

        let (message_tx, message_rx) = mpsc::channel::<DerivMessage>(MESSAGE_CHANNEL_CAPACITY);

        let ws_config = config.connection_config();
        info!(symbols = ?ws_config.symbols, "Configured tick subscriptions");

        let connection_manager = Arc::new(ConnectionManager::new(ws_config, message_tx));
        let connection_manager_clone = connection_manager.clone();
        let mut ws_handle = tokio::spawn(async move {
            if let Err(e) = connection_manager_clone.connect().await {
                error!(?e, "WebSocket connection failed");
            }
        });

        let token = CancellationToken::new();
        let ingest_handle = tokio::spawn(Ingestor::new(store).run(message_rx, token.child_token()));
        let mut scheduler_handle = tokio::spawn(scheduler.run(token.child_token()));

        info!("Entering main event loop");
        let mut stats_interval = tokio::time::interval(config.telemetry.stats_interval());
        // The first tick completes immediately.
        stats_interval.tick().await;

        let mut ws_finished = false;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = stats_interval.tick() => {
                    info!("Outputting periodic statistics summary");
                    stats.output_summary();
                }
                () = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = &mut ws_handle => {
                    warn!("WebSocket task exited, shutting down");
                    ws_finished = true;
                    break;
                }
            }
        }

        token.cancel();

        match tokio::time::timeout(grace, &mut scheduler_handle).await {
            Ok(Ok(())) => info!("Scheduler stopped"),
            Ok(Err(e)) => error!(?e, "Scheduler task failed"),
            Err(_) => {
                warn!(
                    grace_secs = grace.as_secs(),
                    "Scheduler revoke pass timed out, aborting"
                );
                scheduler_handle.abort();
            }
        }

        connection_manager.shutdown();
        if !ws_finished {
            stop_task("WebSocket", ws_handle).await;
        }
        stop_task("Ingestion", ingest_handle).await;

        info!("Final statistics summary:");
        stats.output_summary();

        Ok(())
    }
}

/// Upper bound on the scheduler's shutdown revoke pass.
///
/// Revokes run one after another, so in telegram mode every outstanding
/// handle may take a full request timeout.
pub fn shutdown_grace(config: &AppConfig) -> Duration {
    match config.mode {
        DeliveryMode::DryRun => SHUTDOWN_MARGIN,
        DeliveryMode::Telegram => Duration::from_secs(config.telegram.timeout_secs)
            .saturating_mul(MAX_OUTSTANDING_HANDLES)
            .saturating_add(SHUTDOWN_MARGIN),
    }
}

async fn stop_task(name: &str, mut handle: JoinHandle<()>) {
    if tokio::time::timeout(TASK_STOP_TIMEOUT, &mut handle)
        .await
        .is_err()
    {
        warn!(task = name, "Task did not stop in time, aborting");
        handle.abort();
    }
}

/// Pick the dispatcher for the configured delivery mode.
pub fn build_dispatcher(
    config: &AppConfig,
    token: Option<String>,
    formatter: MessageFormatter,
) -> AppResult<DynDispatcher> {
    match config.mode {
        DeliveryMode::DryRun => {
            info!("Dry-run mode: messages are logged, not sent");
            Ok(Arc::new(LogDispatcher::new(formatter)))
        }
        DeliveryMode::Telegram => {
            let token = token.ok_or_else(|| {
                AppError::Config(format!("{TELEGRAM_TOKEN_ENV} must be set in telegram mode"))
            })?;
            info!(chat_id = config.telegram.chat_id, "Telegram delivery enabled");
            let dispatcher = TelegramDispatcher::new(config.telegram.clone(), &token, formatter)?;
            Ok(Arc::new(dispatcher))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsig_scheduler::MockDispatcher;
    use std::collections::BTreeMap;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new(180, "Nairobi", BTreeMap::new()).unwrap()
    }

    #[test]
    fn test_dry_run_dispatcher_needs_no_token() {
        assert!(build_dispatcher(&AppConfig::default(), None, formatter()).is_ok());
    }

    #[test]
    fn test_telegram_dispatcher_requires_token() {
        let mut config = AppConfig::default();
        config.mode = DeliveryMode::Telegram;
        config.telegram.chat_id = -100;

        let err = build_dispatcher(&config, None, formatter()).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));

        let err = build_dispatcher(&config, Some("  ".to_string()), formatter())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Notify(_)));

        assert!(build_dispatcher(&config, Some("123:abc".to_string()), formatter()).is_ok());
    }

    #[test]
    fn test_shutdown_grace_covers_sequential_revokes() {
        assert_eq!(shutdown_grace(&AppConfig::default()), SHUTDOWN_MARGIN);

        let mut config = AppConfig::default();
        config.mode = DeliveryMode::Telegram;
        let per_request = Duration::from_secs(config.telegram.timeout_secs);
        assert_eq!(per_request, Duration::from_secs(10));
        assert!(shutdown_grace(&config) > per_request * 3);

        config.telegram.timeout_secs = 30;
        assert_eq!(shutdown_grace(&config), Duration::from_secs(92));
    }

    #[test]
    fn test_with_dispatcher_builds_store() {
        let app =
            Application::with_dispatcher(AppConfig::default(), Arc::new(MockDispatcher::new()))
                .unwrap();
        assert_eq!(app.store().instruments().len(), 5);
        assert_eq!(app.store().capacity(), 5000);
        assert_eq!(app.store().latest_epoch(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.detector.min_samples = 0;
        assert!(Application::with_dispatcher(config, Arc::new(MockDispatcher::new())).is_err());
    }
}
