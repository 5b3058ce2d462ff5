//! Slot-aligned signal scheduling.
//!
//! Every cadence slot goes through advance notice, firing and expiry, each
//! at most once, driven purely by the source timestamp held in the tick
//! store. Messages are handed to a [`NotificationDispatcher`]; handles of
//! revocable messages are revoked when the slot expires.

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod scheduler;
pub mod slot;

pub use clock::{SlotClock, SlotWindow};
pub use config::SchedulerConfig;
pub use dispatcher::{
    BoxFuture, DynDispatcher, MessageHandle, MockDispatcher, NotificationDispatcher,
};
pub use error::{SchedulerError, SchedulerResult};
pub use message::SignalMessage;
pub use scheduler::{PhaseTransition, SlotScheduler};
pub use slot::{Phase, SlotPhase, SlotRecord};
