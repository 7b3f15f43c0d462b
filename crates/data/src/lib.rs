//! Market data for the Survivor engine.
//!
//! This crate provides:
//! - Instrument catalog loading and strike queries
//! - Tick sources (live channel adapter, CSV replay)

pub mod catalog;
pub mod feed;

// Re-export commonly used types
pub use catalog::InstrumentCatalog;
pub use feed::{ChannelFeed, ReplayFeed};
