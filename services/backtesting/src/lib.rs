//! Habit Backtester
//!
//! Trading account execution model plus a strategy battle engine that feeds
//! one historical price sequence to several independent trading policies and
//! compares how they did.
//!
//! Two ledgers live side by side:
//! - [`Account`] settles [`Order`]s against a [`Market`] and keeps a
//!   [`Portfolio`] of [`Position`]s and a log of [`Transaction`]s.
//! - Every [`Strategy`] owns a private [`SimLedger`] that the
//!   [`BacktestEngine`] drives one price observation at a time.

pub mod account;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod market;
pub mod metrics;
pub mod order;
pub mod report;
pub mod simulator;
pub mod strategy;

/// Price in whole currency units
pub type Price = i64;
/// Cash amount in whole currency units
pub type Amount = i64;
/// Number of shares
pub type Quantity = i64;

pub use account::Account;
pub use config::BacktestConfig;
pub use engine::BacktestEngine;
pub use error::{ConfigError, ExecutionError, ExecutionResult};
pub use ledger::{Portfolio, Position};
pub use market::{MIN_PRICE, Market, PriceFeed, Security};
pub use order::{IdSequence, Order, OrderId, OrderSide, OrderStatus, PriceType, Transaction};
pub use report::{BacktestReport, StrategyReport, Verdict};
pub use simulator::{JitterConfig, PriceJitter};
pub use strategy::{
    BuyAndHoldStrategy, DcaStrategy, PanicSellStrategy, SimLedger, Strategy, affordable_quantity,
    standard_lineup,
};

/// Truncated fee for a gross amount
///
/// Fees are always whole currency units, rounded toward zero.
#[inline]
#[must_use]
pub fn fee_for(gross: Amount, fee_rate: f64) -> Amount {
    (gross as f64 * fee_rate) as Amount
}
