//! Tick feed for digit-signal.
//!
//! Decodes Deriv stream frames into ticks, keeps a bounded rolling buffer
//! per instrument together with the latest source timestamp, and runs the
//! ingestion task that connects the two.

pub mod buffer;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod tick_store;

pub use buffer::RollingBuffer;
pub use error::{FeedError, FeedResult};
pub use ingest::Ingestor;
pub use parser::{FeedEvent, MessageParser};
pub use tick_store::TickStore;
