//! The tick-driven engine loop.
//!
//! One task consumes the tick stream in order and runs both sides through
//! trigger evaluation, contract selection, placement, and the reset rule.
//! Nothing here is allowed to end the process: a failed cycle is logged and
//! the loop moves to the next tick. Only the tick stream ending (or failing)
//! stops the engine.

use anyhow::Result;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use survivor_core::config::SurvivorConfig;
use survivor_core::traits::{Broker, TickSource};
use survivor_core::types::{OptionSide, Order, OrderRequest, OrderStatus, Tick};
use survivor_data::InstrumentCatalog;
use survivor_execution::OrderExecutor;
use survivor_ledger::OrderLedger;

use crate::reference::PriceReferenceTracker;
use crate::reset::apply_reset;
use crate::selector::InstrumentSelector;
use crate::trigger::{TriggerEvaluator, TriggerOutcome};

/// Venue order variety for engine placements.
pub const ORDER_VARIETY: &str = "regular";

/// Tag stamped on every order the engine places.
pub const STRATEGY_TAG: &str = "Survivor";

/// Why a cycle ended without an order even though a breach was on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Suppression {
    /// The move was large enough to trip the multiplier guard.
    #[error("multiplier {multiplier} is over the configured threshold")]
    MultiplierGuard { multiplier: u32 },
    /// No contract cleared the strike tolerance and premium floor.
    #[error("no sellable contract within strike tolerance")]
    NoSellableContract,
    /// The broker never returned an order id.
    #[error("placement attempts exhausted")]
    PlacementExhausted,
}

/// What one side's cycle did on one tick.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// No trigger fired.
    Idle,
    /// Trigger fired and the order went out.
    OrderPlaced { order_id: String },
    /// Trigger fired or would have, but nothing was placed. The advanced
    /// reference (when the trigger actually fired) stands either way.
    TriggerSuppressed(Suppression),
}

/// The Survivor engine: both sides' state plus the capabilities they act
/// through.
pub struct SurvivorEngine<S, B> {
    config: SurvivorConfig,
    catalog: InstrumentCatalog,
    broker: B,
    ticks: S,
    ledger: OrderLedger,
    evaluator: TriggerEvaluator,
    executor: OrderExecutor,
    selector: Option<InstrumentSelector>,
    tracker: Option<PriceReferenceTracker>,
    put_enabled: bool,
    call_enabled: bool,
    ticks_seen: u64,
}

impl<S: TickSource, B: Broker> SurvivorEngine<S, B> {
    /// Wires the engine up and decides which sides can run.
    ///
    /// A side with no contracts in the catalog is disabled with an error
    /// log; the other side keeps trading. When strike spacing can neither be
    /// taken from configuration nor derived from the catalog, selection is
    /// impossible and both sides are disabled.
    #[must_use]
    pub fn new(
        config: SurvivorConfig,
        catalog: InstrumentCatalog,
        broker: B,
        ticks: S,
        ledger: OrderLedger,
    ) -> Self {
        let strike_spacing = config.strike_spacing.or_else(|| catalog.strike_spacing());
        let selector = match strike_spacing {
            Some(spacing) => Some(InstrumentSelector::new(
                spacing,
                config.min_price_to_sell,
                config.exchange.clone(),
            )),
            None => {
                error!("Strike spacing is not configured and cannot be derived, disabling both sides");
                None
            }
        };

        let mut put_enabled = selector.is_some();
        let mut call_enabled = selector.is_some();
        for (side, enabled) in [
            (OptionSide::Put, &mut put_enabled),
            (OptionSide::Call, &mut call_enabled),
        ] {
            if *enabled && catalog.side_count(side) == 0 {
                error!(side = %side, "No contracts in the catalog, side disabled");
                *enabled = false;
            }
        }

        let evaluator = TriggerEvaluator::new(config.sell_multiplier_threshold);
        Self {
            config,
            catalog,
            broker,
            ticks,
            ledger,
            evaluator,
            executor: OrderExecutor::new(),
            selector,
            tracker: None,
            put_enabled,
            call_enabled,
            ticks_seen: 0,
        }
    }

    /// Consumes the tick stream until it ends.
    ///
    /// # Errors
    ///
    /// Returns an error only when the tick source itself fails; everything
    /// downstream of a tick is contained per cycle.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            index = %self.config.index_symbol,
            put_enabled = self.put_enabled,
            call_enabled = self.call_enabled,
            "Survivor engine started"
        );
        while let Some(tick) = self.ticks.next_tick().await? {
            self.process_tick(&tick).await;
        }
        info!(ticks = self.ticks_seen, "Tick stream ended, engine stopped");
        Ok(())
    }

    async fn process_tick(&mut self, tick: &Tick) {
        self.ticks_seen += 1;
        if self.tracker.is_none() {
            self.tracker = Some(PriceReferenceTracker::seed(tick.price, &self.config));
        }
        debug!(price = %tick.price, tick = self.ticks_seen, "Tick");

        if self.put_enabled {
            self.process_side(OptionSide::Put, tick.price).await;
        }
        if self.call_enabled {
            self.process_side(OptionSide::Call, tick.price).await;
        }
    }

    /// One side's full cycle for one tick. Never fails; a broken cycle is
    /// logged and treated as suppressed.
    async fn process_side(&mut self, side: OptionSide, price: Decimal) {
        match self.trigger_cycle(side, price).await {
            Ok(CycleOutcome::OrderPlaced { order_id }) => {
                debug!(side = %side, order_id = %order_id, "Cycle closed with an order");
            }
            Ok(_) => {}
            Err(e) => {
                error!(
                    side = %side,
                    error = %e,
                    "Cycle failed; any reference advance stands"
                );
            }
        }

        // The reset rule runs every tick once the side has fired,
        // independent of what the trigger cycle above did.
        let reset_gap = self.config.side(side).reset_gap;
        if let Some(tracker) = self.tracker.as_mut() {
            apply_reset(side, price, reset_gap, tracker.state_mut(side));
        }
    }

    async fn trigger_cycle(&mut self, side: OptionSide, price: Decimal) -> Result<CycleOutcome> {
        let side_config = self.config.side(side).clone();
        let Some(tracker) = self.tracker.as_mut() else {
            return Ok(CycleOutcome::Idle);
        };

        let decision = match self
            .evaluator
            .evaluate(side, price, &side_config, tracker.state_mut(side))
        {
            TriggerOutcome::Hold => return Ok(CycleOutcome::Idle),
            TriggerOutcome::ThresholdBreached { multiplier } => {
                return Ok(CycleOutcome::TriggerSuppressed(Suppression::MultiplierGuard {
                    multiplier,
                }))
            }
            TriggerOutcome::Fire(decision) => decision,
        };
        info!(
            side = %side,
            multiplier = decision.multiplier,
            quantity = decision.quantity,
            price = %price,
            "Trigger fired"
        );

        let Some(selector) = self.selector.as_ref() else {
            return Ok(CycleOutcome::TriggerSuppressed(Suppression::NoSellableContract));
        };
        let Some((instrument, premium)) = selector
            .select_sellable(side, price, decision.target_gap, &self.catalog, &self.broker)
            .await?
        else {
            warn!(side = %side, "No sellable contract, dropping this trigger");
            return Ok(CycleOutcome::TriggerSuppressed(Suppression::NoSellableContract));
        };

        let request = OrderRequest {
            symbol: instrument.symbol.clone(),
            quantity: decision.quantity,
            price: None,
            transaction_type: self.config.transaction_type,
            order_type: self.config.order_type,
            variety: ORDER_VARIETY.to_string(),
            exchange: self.config.exchange.clone(),
            product: self.config.product.clone(),
            tag: STRATEGY_TAG.to_string(),
        };

        let order_id = match self.executor.place(&self.broker, &request).await {
            Ok(id) => id,
            Err(e) => {
                // The reference stays advanced; the trigger is dropped, not
                // requeued.
                error!(
                    side = %side,
                    symbol = %request.symbol,
                    error = %e,
                    "Placement gave up, trigger dropped"
                );
                return Ok(CycleOutcome::TriggerSuppressed(Suppression::PlacementExhausted));
            }
        };

        let order = Order {
            order_id: order_id.clone(),
            symbol: request.symbol.clone(),
            transaction_type: request.transaction_type,
            quantity: request.quantity,
            price: Some(premium),
            timestamp: None,
            status: OrderStatus::Placed,
        };
        if let Err(e) = self.ledger.record(order) {
            error!(order_id = %order_id, error = %e, "Order placed but not persisted");
        }
        info!(
            side = %side,
            order_id = %order_id,
            symbol = %request.symbol,
            quantity = request.quantity,
            premium = %premium,
            "Order placed and recorded"
        );
        Ok(CycleOutcome::OrderPlaced { order_id })
    }

    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    #[must_use]
    pub fn references(&self) -> Option<&PriceReferenceTracker> {
        self.tracker.as_ref()
    }

    #[must_use]
    pub fn is_side_enabled(&self, side: OptionSide) -> bool {
        match side {
            OptionSide::Put => self.put_enabled,
            OptionSide::Call => self.call_enabled,
        }
    }

    #[must_use]
    pub fn ticks_seen(&self) -> u64 {
        self.ticks_seen
    }
}
