//! Paper broker for dry runs and tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use survivor_core::traits::Broker;
use survivor_core::types::{OrderRequest, Quote};

/// Simulated broker. Fills every placement with a synthetic order id and
/// serves canned quotes, so the engine can run end to end without a venue
/// session.
pub struct PaperBroker {
    quotes: RwLock<HashMap<String, Decimal>>,
    default_quote: Option<Decimal>,
    fail_remaining: Mutex<u32>,
    placed: Mutex<Vec<OrderRequest>>,
}

impl PaperBroker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
            default_quote: None,
            fail_remaining: Mutex::new(0),
            placed: Mutex::new(Vec::new()),
        }
    }

    /// Broker that answers every unknown symbol with `price` instead of
    /// failing the quote call.
    #[must_use]
    pub fn with_default_quote(price: Decimal) -> Self {
        Self {
            default_quote: Some(price),
            ..Self::new()
        }
    }

    /// Sets the quote served for one symbol code (e.g. "NFO:NIFTY24AUG19500PE").
    pub fn set_quote(&self, symbol_code: impl Into<String>, price: Decimal) {
        self.quotes.write().insert(symbol_code.into(), price);
    }

    /// Makes the next `n` placements fail. Test hook for retry paths.
    pub fn fail_next(&self, n: u32) {
        *self.fail_remaining.lock() = n;
    }

    /// Every request filled so far, in placement order.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }
}

impl Default for PaperBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn place_order(&self, request: &OrderRequest) -> Result<String> {
        {
            let mut remaining = self.fail_remaining.lock();
            if *remaining > 0 {
                *remaining -= 1;
                bail!("simulated placement failure");
            }
        }

        let order_id = format!("PAPER-{}", Uuid::new_v4());
        self.placed.lock().push(request.clone());
        info!(
            order_id = %order_id,
            symbol = %request.symbol,
            transaction_type = %request.transaction_type,
            quantity = request.quantity,
            "Paper order filled"
        );
        Ok(order_id)
    }

    async fn get_quote(&self, symbol_code: &str) -> Result<Quote> {
        if let Some(price) = self.quotes.read().get(symbol_code).copied() {
            return Ok(Quote { last_price: price });
        }
        if let Some(price) = self.default_quote {
            return Ok(Quote { last_price: price });
        }
        bail!("No quote available for {symbol_code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use survivor_core::types::{OrderType, TransactionType};

    fn make_request(symbol: &str) -> OrderRequest {
        OrderRequest {
            symbol: symbol.to_string(),
            quantity: 75,
            price: None,
            transaction_type: TransactionType::Sell,
            order_type: OrderType::Market,
            variety: "regular".to_string(),
            exchange: "NFO".to_string(),
            product: "NRML".to_string(),
            tag: "Survivor".to_string(),
        }
    }

    // ==================== PaperBroker Tests ====================

    #[tokio::test]
    async fn fills_and_records_placements() {
        let broker = PaperBroker::new();
        let id = broker
            .place_order(&make_request("NIFTY24AUG19500PE"))
            .await
            .unwrap();
        assert!(id.starts_with("PAPER-"));

        let placed = broker.placed_orders();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].symbol, "NIFTY24AUG19500PE");
    }

    #[tokio::test]
    async fn serves_set_quotes() {
        let broker = PaperBroker::new();
        broker.set_quote("NFO:NIFTY24AUG19500PE", dec!(12.5));

        let quote = broker.get_quote("NFO:NIFTY24AUG19500PE").await.unwrap();
        assert_eq!(quote.last_price, dec!(12.5));
        assert!(broker.get_quote("NFO:UNKNOWN").await.is_err());
    }

    #[tokio::test]
    async fn default_quote_covers_unknown_symbols() {
        let broker = PaperBroker::with_default_quote(dec!(8));
        let quote = broker.get_quote("NFO:ANYTHING").await.unwrap();
        assert_eq!(quote.last_price, dec!(8));
    }

    #[tokio::test]
    async fn fail_next_rejects_then_recovers() {
        let broker = PaperBroker::new();
        broker.fail_next(1);

        assert!(broker.place_order(&make_request("A")).await.is_err());
        assert!(broker.place_order(&make_request("A")).await.is_ok());
    }
}
