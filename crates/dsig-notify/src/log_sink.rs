//! Dry-run dispatcher that writes rendered messages to the log.

use crate::format::MessageFormatter;
use dsig_scheduler::{BoxFuture, MessageHandle, NotificationDispatcher, SignalMessage};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

/// Logs every message instead of sending it. Handles are sequential.
pub struct LogDispatcher {
    formatter: MessageFormatter,
    next_handle: AtomicI64,
}

impl LogDispatcher {
    pub fn new(formatter: MessageFormatter) -> Self {
        Self {
            formatter,
            next_handle: AtomicI64::new(1),
        }
    }
}

impl NotificationDispatcher for LogDispatcher {
    fn dispatch(
        &self,
        message: SignalMessage,
        revocable: bool,
    ) -> BoxFuture<'_, Option<MessageHandle>> {
        Box::pin(async move {
            let handle = MessageHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
            let text = self.formatter.render(&message);
            info!(
                handle = handle.0,
                phase = %message.phase(),
                revocable,
                "[dry-run] message:\n{text}"
            );
            Some(handle)
        })
    }

    fn revoke(&self, handle: MessageHandle) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            info!(handle = handle.0, "[dry-run] revoke");
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_log_dispatcher_handles() {
        let formatter = MessageFormatter::new(0, "UTC", BTreeMap::new()).unwrap();
        let sink = LogDispatcher::new(formatter);
        let message = SignalMessage::AdvanceNotice {
            slot_epoch: 600,
            lead_secs: 120,
            candidate: None,
        };

        let first = tokio_test::block_on(sink.dispatch(message.clone(), true));
        let second = tokio_test::block_on(sink.dispatch(message, true));
        assert_eq!(first, Some(MessageHandle(1)));
        assert_eq!(second, Some(MessageHandle(2)));
        assert!(tokio_test::block_on(sink.revoke(MessageHandle(1))));
    }
}
