//! Order persistence for the Survivor engine.
//!
//! This crate provides:
//! - [`OrderLedger`]: the in-memory order book of record with a synchronous
//!   JSON file mirror

pub mod ledger;

pub use ledger::{LedgerError, OrderLedger};
