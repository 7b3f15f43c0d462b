use crate::types::{OrderRequest, Quote, Tick};
use anyhow::Result;
use async_trait::async_trait;

/// Broker order capability.
///
/// A single placement attempt plus a synchronous quote lookup. Retry policy
/// lives with the caller, not here.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Submits one order. Returns the venue-assigned order id.
    async fn place_order(&self, request: &OrderRequest) -> Result<String>;

    /// Looks up the last traded price for an exchange-qualified symbol code
    /// (e.g. "NFO:NIFTY24AUG19500PE").
    async fn get_quote(&self, symbol_code: &str) -> Result<Quote>;
}

/// Market-data capability: an ordered stream of index ticks.
///
/// `None` means the stream has ended. Connection lifecycle and reconnection
/// belong to the implementation.
#[async_trait]
pub trait TickSource: Send + Sync {
    async fn next_tick(&mut self) -> Result<Option<Tick>>;
}
