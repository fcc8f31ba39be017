use super::{SimLedger, Strategy, affordable_quantity};
use crate::Price;
use crate::config::BacktestConfig;

/// Goes all-in on the first price and bails out for good once the loss
/// reaches the stop-loss threshold
#[derive(Debug, Clone)]
pub struct PanicSellStrategy {
    ledger: SimLedger,
    stop_loss_rate: f64,
    fee_rate: f64,
    has_bought: bool,
}

impl PanicSellStrategy {
    pub const NAME: &'static str = "Panic Seller";

    pub fn new(initial_cash: i64, stop_loss_rate: f64, fee_rate: f64) -> Self {
        Self {
            ledger: SimLedger::new(initial_cash),
            stop_loss_rate,
            fee_rate,
            has_bought: false,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(config.initial_cash, config.panic_threshold, config.fee_rate)
    }
}

impl Strategy for PanicSellStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_price(&mut self, _index: usize, price: Price, _change_pct: f64) {
        if !self.has_bought && self.ledger.cash() >= price {
            let qty = affordable_quantity(self.ledger.cash(), price, self.fee_rate);
            if qty > 0 {
                // A buy the fee rounding makes unaffordable still counts as the one entry
                self.ledger.buy(price, qty, self.fee_rate);
                self.has_bought = true;
            }
        } else if self.ledger.shares() > 0 && self.ledger.avg_price() > 0 {
            let avg = self.ledger.avg_price();
            let return_rate = (price - avg) as f64 / avg as f64;
            if return_rate <= self.stop_loss_rate {
                self.ledger.sell_all(price, self.fee_rate);
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
