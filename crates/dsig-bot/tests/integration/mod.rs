//! Integration tests for dsig-bot.
//!
//! These tests verify the interaction between components:
//! - Tick stream connection and subscriptions
//! - Ingestion into the shared tick store
//! - Slot lifecycle driven by streamed source time

pub mod common;
