//! Error types for account settlement and configuration

use crate::order::{OrderId, OrderStatus};
use crate::{Amount, Price, Quantity};
use thiserror::Error;

/// Validation failures raised by the account and ledger
///
/// None of these are fatal. The ledger is left untouched whenever one is
/// returned, and the caller decides whether to retry, cancel or ignore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Order id is not in the account's order log
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The identifier that could not be found
        order_id: OrderId,
    },

    /// Order already reached a terminal state
    #[error("Order {order_id} is not pending (status {status:?})")]
    OrderNotPending {
        /// The order that was already settled or cancelled
        order_id: OrderId,
        /// Its current status
        status: OrderStatus,
    },

    /// Market does not list the security
    #[error("Unknown security: {code}")]
    UnknownSecurity {
        /// Security code that failed to resolve
        code: String,
    },

    /// Cash does not cover gross amount plus fee
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Gross amount plus fee
        required: Amount,
        /// Cash on hand
        available: Amount,
    },

    /// Sell quantity exceeds holdings
    #[error("Insufficient quantity for {code}: requested {requested}, held {held}")]
    InsufficientQuantity {
        /// Security code
        code: String,
        /// Requested quantity
        requested: Quantity,
        /// Quantity currently held
        held: Quantity,
    },

    /// Quantity must be strictly positive
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Offending quantity
        quantity: Quantity,
    },

    /// Cash movement must be strictly positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: Amount,
    },

    /// Quantity times price does not fit in a cash amount
    #[error("Amount overflow: {quantity} x {price}")]
    AmountOverflow {
        /// Order or position quantity
        quantity: Quantity,
        /// Price per share
        price: Price,
    },

    /// Limit order price condition is not met at the current market price
    #[error("Limit {limit} not reached, market at {market}")]
    LimitNotReached {
        /// Limit price on the order
        limit: Price,
        /// Current market price
        market: Price,
    },
}

/// Result alias for settlement operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Backtest configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter is outside its allowed range
    #[error("Invalid {field}: {reason}")]
    InvalidParameter {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// JSON could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
