//! Ingestion task: stream frames → tick store.

use crate::error::FeedError;
use crate::parser::{FeedEvent, MessageParser};
use crate::tick_store::TickStore;
use dsig_telemetry::Metrics;
use dsig_ws::DerivMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Applies decoded stream frames to a shared [`TickStore`].
pub struct Ingestor {
    store: Arc<TickStore>,
    parser: MessageParser,
}

impl Ingestor {
    pub fn new(store: Arc<TickStore>) -> Self {
        Self {
            store,
            parser: MessageParser::new(),
        }
    }

    /// Apply one frame. Returns the event that was applied, if any.
    ///
    /// Parse and API errors are logged and counted, never propagated.
    pub fn apply(&self, msg: &DerivMessage) -> Option<FeedEvent> {
        let event = match self.parser.parse(msg) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(FeedError::Api { code, message }) => {
                warn!(%code, %message, "Deriv API error");
                Metrics::tick_dropped("api_error");
                return None;
            }
            Err(e) => {
                debug!(?e, "Dropping malformed frame");
                Metrics::tick_dropped("parse_error");
                return None;
            }
        };

        match &event {
            FeedEvent::Tick(tick) => match self.store.ingest(tick) {
                Some(len) => {
                    trace!(instrument = %tick.instrument, quote = %tick.quote, epoch = tick.epoch, "Tick");
                    Metrics::tick_ingested(tick.instrument.as_str(), len);
                    Metrics::source_epoch(tick.epoch);
                }
                None => {
                    debug!(instrument = %tick.instrument, "Tick for untracked instrument");
                    Metrics::tick_dropped("unknown_instrument");
                    return None;
                }
            },
            FeedEvent::ServerTime(epoch) => {
                if self.store.observe_epoch(*epoch) {
                    Metrics::source_epoch(*epoch);
                }
            }
        }

        Some(event)
    }

    /// Run until the channel closes or the token is cancelled.
    pub async fn run(self, mut rx: mpsc::Receiver<DerivMessage>, token: CancellationToken) {
        info!("Ingestion task started");
        loop {
            tokio::select! {
                () = token.cancelled() => {
                    info!("Ingestion task cancelled");
                    break;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(msg) => {
                            self.apply(&msg);
                        }
                        None => {
                            info!("Stream channel closed, ingestion stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}
