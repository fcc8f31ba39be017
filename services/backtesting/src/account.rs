//! Cash account with order placement and settlement

use crate::error::{ExecutionError, ExecutionResult};
use crate::ledger::Portfolio;
use crate::market::Market;
use crate::order::{IdSequence, Order, OrderId, OrderSide, PriceType, Transaction};
use crate::{Amount, Price, Quantity, fee_for};
use tracing::{debug, info, warn};

/// Trading account
///
/// Orders are accepted without any funds check and only validated when they
/// are executed. A failed execution leaves the order pending.
#[derive(Debug, Clone)]
pub struct Account {
    account_number: String,
    balance: Amount,
    fee_rate: f64,
    realized_profit: Amount,
    portfolio: Portfolio,
    orders: Vec<Order>,
    transactions: Vec<Transaction>,
    order_ids: IdSequence,
    transaction_ids: IdSequence,
}

impl Account {
    pub fn new(account_number: impl Into<String>, initial_balance: Amount, fee_rate: f64) -> Self {
        Self::with_sequences(
            account_number,
            initial_balance,
            fee_rate,
            IdSequence::default(),
            IdSequence::default(),
        )
    }

    /// Account whose order and transaction ids start from the given sequences
    pub fn with_sequences(
        account_number: impl Into<String>,
        initial_balance: Amount,
        fee_rate: f64,
        order_ids: IdSequence,
        transaction_ids: IdSequence,
    ) -> Self {
        let account_number = account_number.into();
        info!("Opening account {} with balance {}", account_number, initial_balance);
        Self {
            account_number,
            balance: initial_balance.max(0),
            fee_rate,
            realized_profit: 0,
            portfolio: Portfolio::new(),
            orders: Vec::new(),
            transactions: Vec::new(),
            order_ids,
            transaction_ids,
        }
    }

    pub fn deposit(&mut self, amount: Amount) -> ExecutionResult<()> {
        if amount <= 0 {
            return Err(ExecutionError::InvalidAmount { amount });
        }
        self.balance += amount;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Amount) -> ExecutionResult<()> {
        if amount <= 0 {
            return Err(ExecutionError::InvalidAmount { amount });
        }
        if self.balance < amount {
            return Err(ExecutionError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Accept an order in pending state and return its id
    pub fn place_order(
        &mut self,
        security_code: &str,
        side: OrderSide,
        price_type: PriceType,
        quantity: Quantity,
    ) -> ExecutionResult<OrderId> {
        if quantity <= 0 {
            return Err(ExecutionError::InvalidQuantity { quantity });
        }
        let id = self.order_ids.next_id();
        debug!("Order #{} placed: {} {} x{}", id, side.as_str(), security_code, quantity);
        self.orders.push(Order::new(id, security_code, side, price_type, quantity));
        Ok(id)
    }

    /// Settle a pending order at the security's current market price
    pub fn execute_order(&mut self, order_id: OrderId, market: &Market) -> ExecutionResult<&Transaction> {
        let idx = self.pending_index(order_id)?;
        let order = &self.orders[idx];

        let security = market
            .security(&order.security_code)
            .ok_or_else(|| ExecutionError::UnknownSecurity {
                code: order.security_code.clone(),
            })?;

        let price = security.current_price();
        check_limit(order, price)?;

        let overflow = || ExecutionError::AmountOverflow {
            quantity: order.quantity,
            price,
        };
        let gross = price.checked_mul(order.quantity).ok_or_else(overflow)?;
        let fee = fee_for(gross, self.fee_rate);

        match order.side {
            OrderSide::Buy => {
                let required = gross.checked_add(fee).ok_or_else(overflow)?;
                if self.balance < required {
                    warn!(
                        "Order #{} rejected: need {}, have {}",
                        order_id, required, self.balance
                    );
                    return Err(ExecutionError::InsufficientFunds {
                        required,
                        available: self.balance,
                    });
                }
                self.portfolio
                    .add_position(&order.security_code, order.quantity, price)?;
                self.balance -= required;
            }
            OrderSide::Sell => {
                let held = self.portfolio.quantity_of(&order.security_code);
                if held < order.quantity {
                    warn!(
                        "Order #{} rejected: selling {} of {}, holding {}",
                        order_id, order.quantity, order.security_code, held
                    );
                    return Err(ExecutionError::InsufficientQuantity {
                        code: order.security_code.clone(),
                        requested: order.quantity,
                        held,
                    });
                }
                let proceeds = gross - fee;
                let balance = self.balance.checked_add(proceeds).ok_or_else(overflow)?;
                let cost_basis = self
                    .portfolio
                    .position(&order.security_code)
                    .map_or(0, |p| p.avg_price() * order.quantity);
                self.portfolio
                    .reduce_position(&order.security_code, order.quantity)?;
                self.balance = balance;
                self.realized_profit = self.realized_profit.saturating_add(proceeds - cost_basis);
            }
        }

        let tx_id = self.transaction_ids.next_id();
        let transaction = Transaction::settle(tx_id, order, security.name(), price, gross, fee);
        self.orders[idx].complete();

        debug!(
            "Transaction #{} [{}] {} {} @ {} (fee {})",
            tx_id,
            transaction.side.as_str(),
            transaction.security_name,
            transaction.quantity,
            price,
            transaction.fee
        );

        self.transactions.push(transaction);
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    /// Cancel a pending order
    pub fn cancel_order(&mut self, order_id: OrderId) -> ExecutionResult<()> {
        let idx = self.pending_index(order_id)?;
        self.orders[idx].cancel();
        debug!("Order #{} cancelled", order_id);
        Ok(())
    }

    fn pending_index(&self, order_id: OrderId) -> ExecutionResult<usize> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or(ExecutionError::OrderNotFound { order_id })?;
        let order = &self.orders[idx];
        if !order.is_pending() {
            return Err(ExecutionError::OrderNotPending {
                order_id,
                status: order.status,
            });
        }
        Ok(idx)
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    /// Sell proceeds net of fees minus the average cost of the shares sold
    pub fn realized_profit(&self) -> Amount {
        self.realized_profit
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Cash plus market value of all positions
    pub fn total_asset_value(&self, market: &Market) -> Amount {
        self.balance + self.portfolio.total_value(market)
    }

    /// One-line account summary
    pub fn summary(&self, market: &Market) -> String {
        format!(
            "Account {} | Cash: {} | Total assets: {}",
            self.account_number,
            self.balance,
            self.total_asset_value(market)
        )
    }
}

fn check_limit(order: &Order, market_price: Price) -> ExecutionResult<()> {
    let PriceType::Limit(limit) = order.price_type else {
        return Ok(());
    };
    let reached = match order.side {
        OrderSide::Buy => market_price <= limit,
        OrderSide::Sell => market_price >= limit,
    };
    if reached {
        Ok(())
    } else {
        Err(ExecutionError::LimitNotReached {
            limit,
            market: market_price,
        })
    }
}
