//! Order placement with bounded retry.

use thiserror::Error;
use tracing::{info, warn};

use survivor_core::traits::Broker;
use survivor_core::types::OrderRequest;

/// Placement attempts before giving up on an order.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 5;

/// Errors from order execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Order placement failed after {attempts} attempts: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}

/// Drives a broker through bounded placement retries.
///
/// The broker reports success by returning a non-empty order id. An empty
/// id and a broker error both count as failed attempts; the executor never
/// inspects why an attempt failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderExecutor;

impl OrderExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Places an order, retrying up to [`MAX_PLACEMENT_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::AttemptsExhausted`] once every attempt has
    /// failed, carrying the last failure for the log.
    pub async fn place<B: Broker + ?Sized>(
        &self,
        broker: &B,
        request: &OrderRequest,
    ) -> Result<String, ExecutionError> {
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
            match broker.place_order(request).await {
                Ok(order_id) if !order_id.is_empty() => {
                    info!(
                        order_id = %order_id,
                        symbol = %request.symbol,
                        transaction_type = %request.transaction_type,
                        quantity = request.quantity,
                        attempt,
                        "Order placed"
                    );
                    return Ok(order_id);
                }
                Ok(_) => {
                    warn!(symbol = %request.symbol, attempt, "Broker returned an empty order id");
                    last_error = "broker returned an empty order id".to_string();
                }
                Err(e) => {
                    warn!(
                        symbol = %request.symbol,
                        attempt,
                        error = %e,
                        "Order placement attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(ExecutionError::AttemptsExhausted {
            attempts: MAX_PLACEMENT_ATTEMPTS,
            last_error,
        })
    }
}
