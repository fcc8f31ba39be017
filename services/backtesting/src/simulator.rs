//! Seeded market price jitter
//!
//! Cosmetic randomness for demos: the backtest core never depends on it.

use crate::Price;
use crate::market::{MIN_PRICE, Market};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shape of the per-step price change distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JitterConfig {
    pub crash_probability: f64, // chance of a sharp drop on any step
    pub normal_range: f64,      // +/- bound of an ordinary move
    pub crash_min: f64,         // smallest sharp drop
    pub crash_max: f64,         // largest sharp drop
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            crash_probability: 0.05,
            normal_range: 0.03,
            crash_min: 0.05,
            crash_max: 0.15,
        }
    }
}

/// Random-walk price generator
pub struct PriceJitter {
    config: JitterConfig,
    rng: StdRng,
}

impl PriceJitter {
    pub fn new(config: JitterConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(JitterConfig::default(), seed)
    }

    /// Draw one fractional price change
    pub fn next_rate(&mut self) -> f64 {
        let cfg = &self.config;
        if cfg.crash_probability > 0.0 && self.rng.gen_bool(cfg.crash_probability.min(1.0)) {
            if cfg.crash_max > cfg.crash_min {
                -self.rng.gen_range(cfg.crash_min..=cfg.crash_max)
            } else {
                -cfg.crash_min
            }
        } else if cfg.normal_range > 0.0 {
            self.rng.gen_range(-cfg.normal_range..=cfg.normal_range)
        } else {
            0.0
        }
    }

    /// Next price after one jittered step, never below the price floor
    pub fn next_price(&mut self, price: Price) -> Price {
        let rate = self.next_rate();
        ((price as f64 * (1.0 + rate)) as Price).max(MIN_PRICE)
    }

    /// Move the live price of every listed security one step
    pub fn simulate_market(&mut self, market: &mut Market) {
        for security in market.securities_mut() {
            let new_price = self.next_price(security.current_price());
            debug!(
                "{} moved {} -> {}",
                security.code(),
                security.current_price(),
                new_price
            );
            security.update_price(new_price);
        }
    }

    /// Build a price history of `steps` entries starting at `start`
    pub fn generate_history(&mut self, start: Price, steps: usize) -> Vec<Price> {
        let mut prices = Vec::with_capacity(steps);
        let mut price = start.max(MIN_PRICE);
        for _ in 0..steps {
            prices.push(price);
            price = self.next_price(price);
        }
        prices
    }
}
