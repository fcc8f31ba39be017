//! Order and transaction definitions

use crate::{Amount, Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order identifier
pub type OrderId = u64;
/// Transaction identifier
pub type TransactionId = u64;

/// Monotonic id generator
///
/// Held by whoever issues ids so that no process-wide counter exists and
/// tests can start from a known value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSequence {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// How the order is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceType {
    /// Execute at the last market price
    Market,
    /// Execute at the market price only once it is at or better than the limit
    Limit(Price),
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Trading intent accepted by an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub security_code: String,
    pub side: OrderSide,
    pub price_type: PriceType,
    pub quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: OrderId,
        security_code: impl Into<String>,
        side: OrderSide,
        price_type: PriceType,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            security_code: security_code.into(),
            side,
            price_type,
            quantity,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub(crate) fn complete(&mut self) {
        self.status = OrderStatus::Completed;
    }

    pub(crate) fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }
}

/// Settlement record, written once when an order executes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub security_code: String,
    pub security_name: String,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub price: Price,
    pub gross_amount: Amount,
    pub fee: Amount,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn settle(
        id: TransactionId,
        order: &Order,
        security_name: &str,
        price: Price,
        gross_amount: Amount,
        fee: Amount,
    ) -> Self {
        Self {
            id,
            order_id: order.id,
            security_code: order.security_code.clone(),
            security_name: security_name.to_string(),
            side: order.side,
            quantity: order.quantity,
            price,
            gross_amount,
            fee,
            timestamp: Utc::now(),
        }
    }

    /// Cash paid (buy) or received (sell), fee included
    #[must_use]
    pub fn net_amount(&self) -> Amount {
        match self.side {
            OrderSide::Buy => self.gross_amount + self.fee,
            OrderSide::Sell => self.gross_amount - self.fee,
        }
    }

    /// Signed effect on the account's cash
    #[must_use]
    pub fn cash_delta(&self) -> Amount {
        match self.side {
            OrderSide::Buy => -self.net_amount(),
            OrderSide::Sell => self.net_amount(),
        }
    }
}
