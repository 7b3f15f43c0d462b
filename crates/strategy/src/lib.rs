//! Strategy logic for the Survivor engine.
//!
//! This crate provides:
//! - Per-side reference state and seeding
//! - Gap trigger evaluation with the multiplier guard
//! - Reference re-anchoring after adverse moves
//! - Contract selection with the premium-floor walk-in
//! - The tick-driven engine loop wiring it all to execution and the ledger

pub mod engine;
pub mod reference;
pub mod reset;
pub mod selector;
pub mod trigger;

pub use engine::{CycleOutcome, Suppression, SurvivorEngine, ORDER_VARIETY, STRATEGY_TAG};
pub use reference::{PriceReferenceTracker, SideState};
pub use reset::apply_reset;
pub use selector::InstrumentSelector;
pub use trigger::{TriggerEvaluator, TriggerOutcome};
