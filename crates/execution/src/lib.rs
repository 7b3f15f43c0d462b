//! Order execution for the Survivor engine.
//!
//! This crate provides:
//! - [`OrderExecutor`]: bounded-retry placement over the broker capability
//! - [`PaperBroker`]: an always-fills simulator for dry runs and tests

pub mod executor;
pub mod paper;

pub use executor::{ExecutionError, OrderExecutor, MAX_PLACEMENT_ATTEMPTS};
pub use paper::PaperBroker;
