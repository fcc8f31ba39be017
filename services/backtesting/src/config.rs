//! Backtest configuration

use crate::Amount;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default trading fee (0.015%)
pub const DEFAULT_FEE_RATE: f64 = 0.00015;
/// Default stop-loss threshold (-10%)
pub const DEFAULT_PANIC_THRESHOLD: f64 = -0.10;
/// Default price drop that triggers a DCA rebuy (-5%)
pub const DEFAULT_DCA_DROP_RATE: f64 = -0.05;
/// Default steps between DCA buys
pub const DEFAULT_DCA_INTERVAL: usize = 5;
/// Default share of current cash spent per DCA buy
pub const DEFAULT_DCA_BUY_RATIO: f64 = 0.25;
/// Default share of cash spent by the buy-and-hold entry
pub const DEFAULT_HOLD_BUY_RATIO: f64 = 0.5;
/// Default starting cash
pub const DEFAULT_INITIAL_CASH: Amount = 10_000_000;

/// Tunable parameters of one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_cash: Amount,
    pub fee_rate: f64,          // 0.00015 = 0.015%
    pub panic_threshold: f64,   // signed, -0.10 = -10%
    pub dca_drop_rate: f64,     // signed, -0.05 = -5%
    pub dca_interval: usize,    // time steps
    pub dca_buy_ratio: f64,     // fraction of current cash
    pub hold_buy_ratio: f64,    // fraction of initial cash
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            fee_rate: DEFAULT_FEE_RATE,
            panic_threshold: DEFAULT_PANIC_THRESHOLD,
            dca_drop_rate: DEFAULT_DCA_DROP_RATE,
            dca_interval: DEFAULT_DCA_INTERVAL,
            dca_buy_ratio: DEFAULT_DCA_BUY_RATIO,
            hold_buy_ratio: DEFAULT_HOLD_BUY_RATIO,
        }
    }
}

impl BacktestConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!("Loaded backtest config from {}", path.display());
        Ok(config)
    }

    /// Check every parameter is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cash <= 0 {
            return Err(invalid("initial_cash", format!("must be positive, got {}", self.initial_cash)));
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(invalid("fee_rate", format!("must be in [0, 1), got {}", self.fee_rate)));
        }
        if !(-1.0..=0.0).contains(&self.panic_threshold) {
            return Err(invalid(
                "panic_threshold",
                format!("must be in [-1, 0], got {}", self.panic_threshold),
            ));
        }
        if !(-1.0..=0.0).contains(&self.dca_drop_rate) {
            return Err(invalid(
                "dca_drop_rate",
                format!("must be in [-1, 0], got {}", self.dca_drop_rate),
            ));
        }
        if self.dca_interval == 0 {
            return Err(invalid("dca_interval", "must be at least 1".to_string()));
        }
        for (field, ratio) in [
            ("dca_buy_ratio", self.dca_buy_ratio),
            ("hold_buy_ratio", self.hold_buy_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(invalid(field, format!("must be in (0, 1], got {ratio}")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { field, reason }
}
