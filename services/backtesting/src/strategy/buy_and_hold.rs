use super::{SimLedger, Strategy, affordable_quantity, portion_of};
use crate::Price;
use crate::config::BacktestConfig;

/// Buys once with a fixed share of its cash and never trades again
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    ledger: SimLedger,
    buy_ratio: f64,
    fee_rate: f64,
    has_bought: bool,
}

impl BuyAndHoldStrategy {
    pub const NAME: &'static str = "Holder";

    pub fn new(initial_cash: i64, buy_ratio: f64, fee_rate: f64) -> Self {
        Self {
            ledger: SimLedger::new(initial_cash),
            buy_ratio,
            fee_rate,
            has_bought: false,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(config.initial_cash, config.hold_buy_ratio, config.fee_rate)
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_price(&mut self, _index: usize, price: Price, _change_pct: f64) {
        if !self.has_bought && self.ledger.cash() >= price {
            let amount = portion_of(self.ledger.cash(), self.buy_ratio);
            let qty = affordable_quantity(amount, price, self.fee_rate);
            if qty > 0 {
                self.ledger.buy(price, qty, self.fee_rate);
                self.has_bought = true;
            }
        }
        self.ledger.record_equity(price);
    }

    fn ledger(&self) -> &SimLedger {
        &self.ledger
    }

    fn reset(&mut self) {
        self.ledger.reset();
        self.has_bought = false;
    }
}
