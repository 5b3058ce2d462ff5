//! Notification dispatcher abstraction.
//!
//! The scheduler only needs to hand over a message and, later, revoke it.
//! Implementations log their own failures and report them as `None` /
//! `false`; the scheduler never retries.

use crate::message::SignalMessage;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

/// Boxed future type for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Opaque reference to a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageHandle(pub i64);

/// Outbound message transport.
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver a message. Returns a handle on success.
    fn dispatch(&self, message: SignalMessage, revocable: bool)
        -> BoxFuture<'_, Option<MessageHandle>>;

    /// Remove a previously delivered message. Best effort.
    fn revoke(&self, handle: MessageHandle) -> BoxFuture<'_, bool>;
}

/// Shared dispatcher.
pub type DynDispatcher = Arc<dyn NotificationDispatcher>;

/// Recording dispatcher for tests.
///
/// Hands out sequential handles starting at 1. Dispatch and revoke can be
/// switched to fail.
pub struct MockDispatcher {
    dispatched: parking_lot::Mutex<Vec<(SignalMessage, bool)>>,
    revoked: parking_lot::Mutex<Vec<MessageHandle>>,
    next_handle: AtomicI64,
    fail_dispatch: AtomicBool,
    fail_revoke: AtomicBool,
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            dispatched: parking_lot::Mutex::new(Vec::new()),
            revoked: parking_lot::Mutex::new(Vec::new()),
            next_handle: AtomicI64::new(1),
            fail_dispatch: AtomicBool::new(false),
            fail_revoke: AtomicBool::new(false),
        }
    }

    pub fn set_fail_dispatch(&self, fail: bool) {
        self.fail_dispatch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_revoke(&self, fail: bool) {
        self.fail_revoke.store(fail, Ordering::SeqCst);
    }

    /// Every dispatch attempt, with its revocable flag.
    pub fn dispatched(&self) -> Vec<(SignalMessage, bool)> {
        self.dispatched.lock().clone()
    }

    /// Every revoke attempt.
    pub fn revoked(&self) -> Vec<MessageHandle> {
        self.revoked.lock().clone()
    }
}

impl NotificationDispatcher for MockDispatcher {
    fn dispatch(
        &self,
        message: SignalMessage,
        revocable: bool,
    ) -> BoxFuture<'_, Option<MessageHandle>> {
        Box::pin(async move {
            self.dispatched.lock().push((message, revocable));
            if self.fail_dispatch.load(Ordering::SeqCst) {
                return None;
            }
            Some(MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        })
    }

    fn revoke(&self, handle: MessageHandle) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.revoked.lock().push(handle);
            !self.fail_revoke.load(Ordering::SeqCst)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiry() -> SignalMessage {
        SignalMessage::Expiry {
            expiry_epoch: 900,
            next_slot_epoch: 1200,
        }
    }

    #[test]
    fn test_mock_sequential_handles() {
        let mock = MockDispatcher::new();
        let first = tokio_test::block_on(mock.dispatch(expiry(), false));
        let second = tokio_test::block_on(mock.dispatch(expiry(), true));
        assert_eq!(first, Some(MessageHandle(1)));
        assert_eq!(second, Some(MessageHandle(2)));
        assert_eq!(mock.dispatched().len(), 2);
        assert!(mock.dispatched()[1].1);
    }

    #[test]
    fn test_mock_failures() {
        let mock = MockDispatcher::new();
        mock.set_fail_dispatch(true);
        mock.set_fail_revoke(true);
        assert_eq!(tokio_test::block_on(mock.dispatch(expiry(), true)), None);
        assert!(!tokio_test::block_on(mock.revoke(MessageHandle(7))));
        assert_eq!(mock.revoked(), vec![MessageHandle(7)]);
    }
}
