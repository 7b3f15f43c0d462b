//! Per-side reference price state.
//!
//! Each option side measures trigger distance from its own reference price.
//! The reference is seeded once, from a configured start point or the first
//! observed tick, then moves only through trigger advances and resets.

use rust_decimal::Decimal;
use tracing::info;

use survivor_core::config::SurvivorConfig;
use survivor_core::types::OptionSide;

/// Mutable trigger state for one option side.
#[derive(Debug, Clone, Copy)]
pub struct SideState {
    /// Anchor the next trigger distance is measured from.
    pub reference_price: Decimal,
    /// Set on the side's first fire. Arms the reset rule for the rest of the
    /// session and is never cleared.
    pub reset_armed: bool,
}

impl SideState {
    #[must_use]
    pub fn new(reference_price: Decimal) -> Self {
        Self {
            reference_price,
            reset_armed: false,
        }
    }
}

/// Both sides' reference state.
#[derive(Debug, Clone, Copy)]
pub struct PriceReferenceTracker {
    put: SideState,
    call: SideState,
}

impl PriceReferenceTracker {
    /// Seeds each side from its configured start point, falling back to
    /// `price` (normally the first tick of the session).
    #[must_use]
    pub fn seed(price: Decimal, config: &SurvivorConfig) -> Self {
        let put_reference = config.put.start_point.unwrap_or(price);
        let call_reference = config.call.start_point.unwrap_or(price);
        info!(
            put_reference = %put_reference,
            call_reference = %call_reference,
            "Reference prices seeded"
        );
        Self {
            put: SideState::new(put_reference),
            call: SideState::new(call_reference),
        }
    }

    #[must_use]
    pub fn state(&self, side: OptionSide) -> &SideState {
        match side {
            OptionSide::Put => &self.put,
            OptionSide::Call => &self.call,
        }
    }

    pub fn state_mut(&mut self, side: OptionSide) -> &mut SideState {
        match side {
            OptionSide::Put => &mut self.put,
            OptionSide::Call => &mut self.call,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn seed_uses_configured_start_points() {
        let mut config = SurvivorConfig::default();
        config.put.start_point = Some(dec!(19400));
        config.call.start_point = Some(dec!(19600));

        let tracker = PriceReferenceTracker::seed(dec!(19500), &config);
        assert_eq!(tracker.state(OptionSide::Put).reference_price, dec!(19400));
        assert_eq!(tracker.state(OptionSide::Call).reference_price, dec!(19600));
    }

    #[test]
    fn seed_falls_back_to_first_price() {
        let mut config = SurvivorConfig::default();
        config.put.start_point = None;
        config.call.start_point = Some(dec!(19600));

        let tracker = PriceReferenceTracker::seed(dec!(19512), &config);
        assert_eq!(tracker.state(OptionSide::Put).reference_price, dec!(19512));
        assert_eq!(tracker.state(OptionSide::Call).reference_price, dec!(19600));
        assert!(!tracker.state(OptionSide::Put).reset_armed);
    }
}
