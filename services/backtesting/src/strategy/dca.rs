use super::{SimLedger, Strategy, affordable_quantity, portion_of};
use crate::Price;
use crate::config::BacktestConfig;

/// Dollar-cost averaging: buys a slice of cash on a fixed cadence and
/// again whenever the price drops far enough below the last buy
#[derive(Debug, Clone)]
pub struct DcaStrategy {
    ledger: SimLedger,
    drop_rate: f64,
    interval: usize,
    buy_ratio: f64,
    fee_rate: f64,
    last_buy: Option<(usize, Price)>,
}

impl DcaStrategy {
    pub const NAME: &'static str = "DCA Coach";

    pub fn new(initial_cash: i64, drop_rate: f64, interval: usize, buy_ratio: f64, fee_rate: f64) -> Self {
        Self {
            ledger: SimLedger::new(initial_cash),
            drop_rate,
            interval,
            buy_ratio,
            fee_rate,
            last_buy: None,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(
            config.initial_cash,
            config.dca_drop_rate,
            config.dca_interval,
            config.dca_buy_ratio,
            config.fee_rate,
        )
    }

    /// Step and price of the most recent buy
    pub fn last_buy(&self) -> Option<(usize, Price)> {
        self.last_buy
    }

    fn should_buy(&self, index: usize, price: Price) -> bool {
        if self.ledger.cash() < price {
            return false;
        }
        let Some((last_index, last_price)) = self.last_buy else {
            return true;
        };
        let interval_met = index.saturating_sub(last_index) >= self.interval;
        let drop_met =
            last_price > 0 && (price - last_price) as f64 / last_price as f64 <= self.drop_rate;
        interval_met || drop_met
    }
}

impl Strategy for DcaStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_price(&mut self, index: usize, price: Price, _change_pct: f64) {
        if self.should_buy(index, price) {
            let cash = self.ledger.cash();
            let mut amount = portion_of(cash, self.buy_ratio);
            if amount < price {
                amount = cash;
            }
            let qty = affordable_quantity(amount, price, self.fee_rate);
            if qty > 0 {
                self.ledger.buy(price, qty, self.fee_rate);
                self.last_buy = Some((index, price));
            }
        }
        self.ledger.record_equity(price);
    }

    fn ledger(&self) -> &SimLedger {
        &self.ledger
    }

    fn reset(&mut self) {
        self.ledger.reset();
        self.last_buy = None;
    }
}
