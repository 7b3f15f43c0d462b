pub mod config;
pub mod config_loader;
pub mod traits;
pub mod types;

pub use config::{ConfigError, SideConfig, SurvivorConfig};
pub use config_loader::ConfigLoader;
pub use traits::{Broker, TickSource};
pub use types::{
    Instrument, OptionSide, Order, OrderRequest, OrderStatus, OrderType, Quote, SellDecision, Tick,
    TransactionType,
};
