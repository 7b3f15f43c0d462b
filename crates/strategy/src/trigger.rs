//! Gap trigger evaluation.
//!
//! A side fires when price moves more than one full gap past its reference
//! in the favorable direction (up for puts, down for calls). The whole-gap
//! multiplier scales the sell quantity and the reference advance together,
//! so a fast move through several gaps is sold in one order instead of being
//! chased tick by tick.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use survivor_core::config::SideConfig;
use survivor_core::types::{OptionSide, SellDecision};

use crate::reference::SideState;

/// Outcome of evaluating one side against a tick.
#[derive(Debug, Clone, Copy)]
pub enum TriggerOutcome {
    /// Price has not moved a full gap past the reference.
    Hold,
    /// Sell and advance the reference.
    Fire(SellDecision),
    /// Move exceeded the multiplier guard. Nothing fires, nothing advances.
    ThresholdBreached { multiplier: u32 },
}

/// Evaluates the gap trigger for both sides.
#[derive(Debug, Clone, Copy)]
pub struct TriggerEvaluator {
    threshold: u32,
}

impl TriggerEvaluator {
    #[must_use]
    pub fn new(sell_multiplier_threshold: u32) -> Self {
        Self {
            threshold: sell_multiplier_threshold,
        }
    }

    /// Evaluates one side against the current price.
    ///
    /// On a fire the reference advances by `gap * multiplier` toward the
    /// price before any order is attempted, and the side's reset rule arms.
    /// A move past the multiplier guard leaves the state untouched so the
    /// side re-evaluates the same distance on the next tick.
    ///
    /// The gap must be positive; configuration validation enforces that at
    /// load time.
    pub fn evaluate(
        &self,
        side: OptionSide,
        price: Decimal,
        config: &SideConfig,
        state: &mut SideState,
    ) -> TriggerOutcome {
        let diff = match side {
            OptionSide::Put => price - state.reference_price,
            OptionSide::Call => state.reference_price - price,
        };
        if diff <= config.gap {
            return TriggerOutcome::Hold;
        }

        // diff > gap makes this at least 1; a value beyond u32 range always
        // trips the guard below.
        let multiplier = (diff / config.gap).floor().to_u32().unwrap_or(u32::MAX);
        if multiplier > self.threshold {
            warn!(
                side = %side,
                multiplier,
                threshold = self.threshold,
                reference = %state.reference_price,
                price = %price,
                "Trigger suppressed by multiplier guard"
            );
            return TriggerOutcome::ThresholdBreached { multiplier };
        }

        let advance = config.gap * Decimal::from(multiplier);
        state.reference_price = match side {
            OptionSide::Put => state.reference_price + advance,
            OptionSide::Call => state.reference_price - advance,
        };
        state.reset_armed = true;

        TriggerOutcome::Fire(SellDecision {
            side,
            multiplier,
            quantity: multiplier * config.quantity,
            target_gap: config.symbol_gap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_side_config(gap: Decimal, quantity: u32) -> SideConfig {
        SideConfig {
            gap,
            reset_gap: dec!(20),
            quantity,
            start_point: None,
            symbol_gap: dec!(200),
        }
    }

    // ==================== Fire Tests ====================

    #[test]
    fn put_fires_with_floored_multiplier() {
        let evaluator = TriggerEvaluator::new(5);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(125), &config, &mut state);
        let TriggerOutcome::Fire(decision) = outcome else {
            panic!("expected fire, got {outcome:?}");
        };
        assert_eq!(decision.multiplier, 2);
        assert_eq!(decision.quantity, 100);
        assert_eq!(decision.side, OptionSide::Put);
        assert_eq!(state.reference_price, dec!(120));
        assert!(state.reset_armed);
    }

    #[test]
    fn call_fires_on_downward_move() {
        let evaluator = TriggerEvaluator::new(5);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Call, dec!(75), &config, &mut state);
        let TriggerOutcome::Fire(decision) = outcome else {
            panic!("expected fire, got {outcome:?}");
        };
        assert_eq!(decision.multiplier, 2);
        assert_eq!(state.reference_price, dec!(80));
    }

    #[test]
    fn just_past_gap_fires_single_unit() {
        let evaluator = TriggerEvaluator::new(5);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(110.05), &config, &mut state);
        let TriggerOutcome::Fire(decision) = outcome else {
            panic!("expected fire, got {outcome:?}");
        };
        assert_eq!(decision.multiplier, 1);
        assert_eq!(decision.quantity, 50);
        assert_eq!(state.reference_price, dec!(110));
    }

    // ==================== Hold Tests ====================

    #[test]
    fn move_exactly_one_gap_holds() {
        let evaluator = TriggerEvaluator::new(5);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(110), &config, &mut state);
        assert!(matches!(outcome, TriggerOutcome::Hold));
        assert_eq!(state.reference_price, dec!(100));
        assert!(!state.reset_armed);
    }

    #[test]
    fn adverse_move_holds() {
        let evaluator = TriggerEvaluator::new(5);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(60), &config, &mut state);
        assert!(matches!(outcome, TriggerOutcome::Hold));
    }

    // ==================== Guard Tests ====================

    #[test]
    fn guard_suppresses_and_keeps_reference() {
        let evaluator = TriggerEvaluator::new(1);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(200), &config, &mut state);
        assert!(matches!(
            outcome,
            TriggerOutcome::ThresholdBreached { multiplier: 10 }
        ));
        assert_eq!(state.reference_price, dec!(100));
        assert!(!state.reset_armed);
    }

    #[test]
    fn multiplier_at_guard_still_fires() {
        let evaluator = TriggerEvaluator::new(2);
        let config = make_side_config(dec!(10), 50);
        let mut state = SideState::new(dec!(100));

        let outcome = evaluator.evaluate(OptionSide::Put, dec!(125), &config, &mut state);
        assert!(matches!(outcome, TriggerOutcome::Fire(d) if d.multiplier == 2));
    }
}
