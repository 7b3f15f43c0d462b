//! Contract selection for a fired trigger.
//!
//! The target strike sits one symbol gap out from spot (below for puts,
//! above for calls). The nearest listed strike is taken when it lands within
//! half a strike spacing of the target; anything further means the series
//! does not cover the region and selection fails rather than guessing.
//!
//! Illiquid far strikes quote near zero, so selection walks the target
//! inward one spacing at a time until a candidate's premium clears the
//! configured floor.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use survivor_core::traits::Broker;
use survivor_core::types::{Instrument, OptionSide};
use survivor_data::InstrumentCatalog;

/// Picks the contract to sell for a fired trigger.
#[derive(Debug, Clone)]
pub struct InstrumentSelector {
    strike_spacing: Decimal,
    min_price_to_sell: Decimal,
    exchange: String,
}

impl InstrumentSelector {
    #[must_use]
    pub fn new(strike_spacing: Decimal, min_price_to_sell: Decimal, exchange: String) -> Self {
        Self {
            strike_spacing,
            min_price_to_sell,
            exchange,
        }
    }

    /// Nearest contract to the target strike `gap` out from `price`.
    ///
    /// `None` when the side lists nothing within half a spacing of the
    /// target.
    #[must_use]
    pub fn select<'a>(
        &self,
        side: OptionSide,
        price: Decimal,
        gap: Decimal,
        catalog: &'a InstrumentCatalog,
    ) -> Option<&'a Instrument> {
        let target_strike = match side {
            OptionSide::Put => price - gap,
            OptionSide::Call => price + gap,
        };
        let (instrument, distance) = catalog.nearest(side, target_strike)?;
        if distance > self.strike_spacing / Decimal::from(2) {
            debug!(
                side = %side,
                target_strike = %target_strike,
                nearest_strike = %instrument.strike,
                distance = %distance,
                "Nearest listed strike is outside tolerance"
            );
            return None;
        }
        Some(instrument)
    }

    /// Selects a contract whose premium clears the floor, walking the target
    /// inward one spacing per round. Bounded by the number of distinct
    /// strikes on the side, so a series quoting zero everywhere terminates.
    ///
    /// Returns the contract and its quoted premium, or `None` when selection
    /// gives up. The caller drops the trigger in that case.
    ///
    /// # Errors
    ///
    /// Returns an error when a quote fetch fails.
    pub async fn select_sellable<'a, B: Broker + ?Sized>(
        &self,
        side: OptionSide,
        price: Decimal,
        start_gap: Decimal,
        catalog: &'a InstrumentCatalog,
        broker: &B,
    ) -> Result<Option<(&'a Instrument, Decimal)>> {
        let max_rounds = catalog.distinct_strikes(side).len();
        let mut gap = start_gap;

        for _ in 0..max_rounds {
            let Some(instrument) = self.select(side, price, gap, catalog) else {
                warn!(side = %side, gap = %gap, "No contract near the target strike");
                return Ok(None);
            };

            let symbol_code = format!("{}:{}", self.exchange, instrument.symbol);
            let quote = broker.get_quote(&symbol_code).await?;
            if quote.last_price < self.min_price_to_sell {
                debug!(
                    symbol = %instrument.symbol,
                    premium = %quote.last_price,
                    floor = %self.min_price_to_sell,
                    "Premium below floor, stepping target inward"
                );
                gap -= self.strike_spacing;
                continue;
            }
            return Ok(Some((instrument, quote.last_price)));
        }

        warn!(
            side = %side,
            start_gap = %start_gap,
            "No contract cleared the premium floor"
        );
        Ok(None)
    }
}
