//! Typed strategy configuration.
//!
//! Every knob the engine consumes lives here with a named field; values are
//! validated once at load time instead of being injected ad hoc at runtime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::types::{OptionSide, OrderType, TransactionType};

/// Configuration validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: String },

    #[error("min_price_to_sell must not be negative, got {0}")]
    NegativeFloor(Decimal),

    #[error("sell_multiplier_threshold must be at least 1")]
    ThresholdTooLow,
}

/// Per-side trigger and sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SideConfig {
    /// Minimum favorable move past the reference required to fire.
    pub gap: Decimal,
    /// Move against the trigger direction required to re-anchor the reference.
    pub reset_gap: Decimal,
    /// Quantity sold per gap-unit of movement.
    pub quantity: u32,
    /// Initial reference price. Unset means seed from the first tick.
    pub start_point: Option<Decimal>,
    /// Distance from spot to the target strike when selecting a contract.
    pub symbol_gap: Decimal,
}

impl Default for SideConfig {
    fn default() -> Self {
        Self {
            gap: Decimal::from(20),
            reset_gap: Decimal::from(20),
            quantity: 75,
            start_point: None,
            symbol_gap: Decimal::from(200),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivorConfig {
    /// Exchange-qualified quote code for the underlying index.
    pub index_symbol: String,
    /// Trading-symbol prefix the catalog is filtered on.
    pub series_prefix: String,
    /// Order routing exchange.
    pub exchange: String,
    /// Venue segment holding the option series.
    pub segment: String,
    pub order_type: OrderType,
    pub product: String,
    pub transaction_type: TransactionType,
    /// Premium floor: contracts quoting below this are skipped in favor of a
    /// nearer strike.
    pub min_price_to_sell: Decimal,
    /// Fat-finger guard: triggers with a larger multiplier are suppressed.
    pub sell_multiplier_threshold: u32,
    /// Interval between adjacent listed strikes. Unset means derive it from
    /// the catalog.
    pub strike_spacing: Option<Decimal>,
    pub orders_file: PathBuf,
    pub instruments_file: PathBuf,
    pub put: SideConfig,
    pub call: SideConfig,
}

impl Default for SurvivorConfig {
    fn default() -> Self {
        Self {
            index_symbol: "NSE:NIFTY 50".to_string(),
            series_prefix: "NIFTY".to_string(),
            exchange: "NFO".to_string(),
            segment: "NFO-OPT".to_string(),
            order_type: OrderType::Market,
            product: "NRML".to_string(),
            transaction_type: TransactionType::Sell,
            min_price_to_sell: Decimal::from(5),
            sell_multiplier_threshold: 5,
            strike_spacing: None,
            orders_file: PathBuf::from("artifacts/orders_data.json"),
            instruments_file: PathBuf::from("artifacts/instruments.csv"),
            put: SideConfig::default(),
            call: SideConfig::default(),
        }
    }
}

impl SurvivorConfig {
    /// Returns the parameters for one side.
    #[must_use]
    pub fn side(&self, side: OptionSide) -> &SideConfig {
        match side {
            OptionSide::Put => &self.put,
            OptionSide::Call => &self.call,
        }
    }

    /// Checks value ranges. Called once by the loader; programmatic
    /// construction should call it too before handing the config to the
    /// engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, side) in [("put", &self.put), ("call", &self.call)] {
            side.validate(name)?;
        }
        if self.min_price_to_sell < Decimal::ZERO {
            return Err(ConfigError::NegativeFloor(self.min_price_to_sell));
        }
        if self.sell_multiplier_threshold < 1 {
            return Err(ConfigError::ThresholdTooLow);
        }
        if let Some(spacing) = self.strike_spacing {
            if spacing <= Decimal::ZERO {
                return Err(ConfigError::NonPositive {
                    field: "strike_spacing",
                    value: spacing.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl SideConfig {
    fn validate(&self, side: &'static str) -> Result<(), ConfigError> {
        let positives = [
            ("gap", self.gap),
            ("reset_gap", self.reset_gap),
            ("symbol_gap", self.symbol_gap),
        ];
        for (field, value) in positives {
            if value <= Decimal::ZERO {
                return Err(ConfigError::NonPositive {
                    field,
                    value: format!("{value} ({side})"),
                });
            }
        }
        if self.quantity == 0 {
            return Err(ConfigError::NonPositive {
                field: "quantity",
                value: format!("0 ({side})"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_config_validates() {
        assert!(SurvivorConfig::default().validate().is_ok());
    }

    #[test]
    fn side_accessor_maps_put_and_call() {
        let mut config = SurvivorConfig::default();
        config.put.gap = dec!(10);
        config.call.gap = dec!(30);
        assert_eq!(config.side(OptionSide::Put).gap, dec!(10));
        assert_eq!(config.side(OptionSide::Call).gap, dec!(30));
    }

    #[test]
    fn zero_gap_is_rejected() {
        let mut config = SurvivorConfig::default();
        config.call.gap = Decimal::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "gap", .. })
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut config = SurvivorConfig::default();
        config.put.quantity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = SurvivorConfig::default();
        config.sell_multiplier_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdTooLow)
        ));
    }

    #[test]
    fn negative_floor_is_rejected() {
        let mut config = SurvivorConfig::default();
        config.min_price_to_sell = dec!(-1);
        assert!(matches!(config.validate(), Err(ConfigError::NegativeFloor(_))));
    }

    #[test]
    fn configured_strike_spacing_must_be_positive() {
        let mut config = SurvivorConfig::default();
        config.strike_spacing = Some(Decimal::ZERO);
        assert!(config.validate().is_err());
    }
}
