//! Trading policies that compete in a backtest
//!
//! Each policy owns a private [`SimLedger`] and only sees one price
//! observation at a time. Ledgers are never shared, so policies cannot
//! observe each other.

mod buy_and_hold;
mod dca;
mod panic_sell;

pub use buy_and_hold::BuyAndHoldStrategy;
pub use dca::DcaStrategy;
pub use panic_sell::PanicSellStrategy;

use crate::config::BacktestConfig;
use crate::{Amount, Price, Quantity, fee_for};
use serde::{Deserialize, Serialize};

/// Policy driven by the backtest engine
pub trait Strategy: Send {
    /// Display name, also used to find the policy in reports
    fn name(&self) -> &str;

    /// Observe the price at step `index`; `change_pct` is the percent move from the previous step
    fn on_price(&mut self, index: usize, price: Price, change_pct: f64);

    /// Called once after the last observation
    fn on_finish(&mut self, _last_price: Price) {}

    fn ledger(&self) -> &SimLedger;

    /// Forget everything observed so far and start over with the initial cash
    fn reset(&mut self);
}

/// Simplified cash/shares ledger used inside a backtest
///
/// Supports whole-lot buys and full liquidation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimLedger {
    initial_cash: Amount,
    cash: Amount,
    shares: Quantity,
    avg_price: Price,
    equity_history: Vec<Amount>,
    buy_count: u32,
    sell_count: u32,
}

impl SimLedger {
    pub fn new(initial_cash: Amount) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            shares: 0,
            avg_price: 0,
            equity_history: Vec::new(),
            buy_count: 0,
            sell_count: 0,
        }
    }

    /// Buy `qty` shares at `price` plus fee. Returns false and changes nothing
    /// when `qty` is zero or cash does not cover cost and fee.
    pub fn buy(&mut self, price: Price, qty: Quantity, fee_rate: f64) -> bool {
        let cost = price * qty;
        let fee = fee_for(cost, fee_rate);
        if qty <= 0 || self.cash < cost + fee {
            return false;
        }
        let total_cost = self.avg_price * self.shares + cost;
        self.shares += qty;
        self.avg_price = total_cost / self.shares;
        self.cash -= cost + fee;
        self.buy_count += 1;
        true
    }

    /// Liquidate every share at `price` minus fee. Returns false when flat.
    pub fn sell_all(&mut self, price: Price, fee_rate: f64) -> bool {
        if self.shares <= 0 {
            return false;
        }
        let revenue = price * self.shares;
        self.cash += revenue - fee_for(revenue, fee_rate);
        self.shares = 0;
        self.avg_price = 0;
        self.sell_count += 1;
        true
    }

    /// Append the equity at `price` to the history
    pub fn record_equity(&mut self, price: Price) {
        let equity = self.total_value(price);
        self.equity_history.push(equity);
    }

    /// Cash plus shares marked at `price`
    #[must_use]
    pub fn total_value(&self, price: Price) -> Amount {
        self.cash + self.shares * price
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.initial_cash);
    }

    pub fn initial_cash(&self) -> Amount {
        self.initial_cash
    }

    pub fn cash(&self) -> Amount {
        self.cash
    }

    pub fn shares(&self) -> Quantity {
        self.shares
    }

    pub fn avg_price(&self) -> Price {
        self.avg_price
    }

    pub fn equity_history(&self) -> &[Amount] {
        &self.equity_history
    }

    pub fn buy_count(&self) -> u32 {
        self.buy_count
    }

    pub fn sell_count(&self) -> u32 {
        self.sell_count
    }
}

/// Whole shares `amount` can pay for once the per-share fee is included
#[must_use]
pub fn affordable_quantity(amount: Amount, price: Price, fee_rate: f64) -> Quantity {
    let unit_cost = price + fee_for(price, fee_rate);
    if unit_cost <= 0 || amount <= 0 {
        return 0;
    }
    amount / unit_cost
}

/// Fraction of a cash balance, truncated to whole currency units
#[inline]
pub(crate) fn portion_of(cash: Amount, ratio: f64) -> Amount {
    (cash as f64 * ratio) as Amount
}

/// Panic-Sell, DCA and Buy-and-Hold configured from one config, in that order
pub fn standard_lineup(config: &BacktestConfig) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(PanicSellStrategy::from_config(config)),
        Box::new(DcaStrategy::from_config(config)),
        Box::new(BuyAndHoldStrategy::from_config(config)),
    ]
}
