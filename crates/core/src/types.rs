//! Core types for the Survivor options-selling engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option side (put or call). Each side runs its own reference price,
/// thresholds, and trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Put,
    Call,
}

impl OptionSide {
    /// Parses the venue instrument-type code ("PE"/"CE").
    #[must_use]
    pub fn from_venue_code(code: &str) -> Option<Self> {
        match code {
            "PE" => Some(Self::Put),
            "CE" => Some(Self::Call),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Put => write!(f, "PE"),
            Self::Call => write!(f, "CE"),
        }
    }
}

/// A single price observation from the market-data feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tick {
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    #[must_use]
    pub fn new(price: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }
}

/// One tradable option contract from the venue instrument dump.
///
/// Immutable once loaded; owned by the catalog for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    /// Venue trading symbol (e.g. "NIFTY24AUG19500PE").
    pub symbol: String,
    pub strike: Decimal,
    pub side: OptionSide,
    /// Venue segment (e.g. "NFO-OPT").
    pub segment: String,
    /// Underlying series prefix the symbol was filtered on (e.g. "NIFTY").
    pub series_prefix: String,
}

/// Order transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Venue order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Lifecycle status of a recorded order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed => write!(f, "PLACED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A placed order as recorded in the ledger.
///
/// The id is assigned by the execution venue. The timestamp is stamped by the
/// ledger on record when the caller leaves it unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub transaction_type: TransactionType,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Output of trigger evaluation: the side fired, how many gap-units the
/// price moved, the total quantity to sell, and the gap to start contract
/// selection from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SellDecision {
    pub side: OptionSide,
    pub multiplier: u32,
    pub quantity: u32,
    pub target_gap: Decimal,
}

/// Order placement request handed to the broker capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub quantity: u32,
    pub price: Option<Decimal>,
    pub transaction_type: TransactionType,
    pub order_type: OrderType,
    pub variety: String,
    pub exchange: String,
    pub product: String,
    pub tag: String,
}

/// Quote snapshot from the broker capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quote {
    pub last_price: Decimal,
}
