//! Reference re-anchoring after adverse moves.

use rust_decimal::Decimal;
use tracing::info;

use survivor_core::types::OptionSide;

use crate::reference::SideState;

/// Re-anchors one side's reference when price has retreated more than
/// `reset_gap` on the adverse side of it, pulling the reference back to
/// within one reset gap of the market.
///
/// Runs every tick once the side has fired at least once. Returns `true`
/// when the reference moved.
pub fn apply_reset(
    side: OptionSide,
    price: Decimal,
    reset_gap: Decimal,
    state: &mut SideState,
) -> bool {
    if !state.reset_armed {
        return false;
    }
    let retreat = match side {
        OptionSide::Put => state.reference_price - price,
        OptionSide::Call => price - state.reference_price,
    };
    if retreat <= reset_gap {
        return false;
    }

    let old_reference = state.reference_price;
    state.reference_price = match side {
        OptionSide::Put => price + reset_gap,
        OptionSide::Call => price - reset_gap,
    };
    info!(
        side = %side,
        old_reference = %old_reference,
        new_reference = %state.reference_price,
        price = %price,
        "Reference re-anchored after adverse move"
    );
    true
}
