//! Position and portfolio bookkeeping
//!
//! Integer arithmetic throughout. Average cost is truncated toward zero and
//! `total_invested` is always re-derived as `quantity * avg_price`, so the two
//! never drift apart.

use crate::error::{ExecutionError, ExecutionResult};
use crate::market::Market;
use crate::{Amount, Price, Quantity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Holding of one security
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    code: String,
    quantity: Quantity,
    avg_price: Price,
    total_invested: Amount,
}

impl Position {
    /// Empty position for a security code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Buy `qty` more at `price`, re-weighting the average cost
    pub fn add_quantity(&mut self, qty: Quantity, price: Price) -> ExecutionResult<()> {
        if qty <= 0 {
            return Err(ExecutionError::InvalidQuantity { quantity: qty });
        }
        let overflow = || ExecutionError::AmountOverflow { quantity: qty, price };
        let new_quantity = self.quantity.checked_add(qty).ok_or_else(overflow)?;
        let new_cost = qty
            .checked_mul(price)
            .and_then(|cost| cost.checked_add(self.total_invested))
            .ok_or_else(overflow)?;
        self.avg_price = new_cost / new_quantity;
        self.quantity = new_quantity;
        self.total_invested = self.quantity * self.avg_price;
        Ok(())
    }

    /// Sell `qty`. Average cost is unchanged; an emptied position loses its cost basis.
    pub fn reduce_quantity(&mut self, qty: Quantity) -> ExecutionResult<()> {
        if qty <= 0 {
            return Err(ExecutionError::InvalidQuantity { quantity: qty });
        }
        if qty > self.quantity {
            return Err(ExecutionError::InsufficientQuantity {
                code: self.code.clone(),
                requested: qty,
                held: self.quantity,
            });
        }
        self.quantity -= qty;
        if self.quantity == 0 {
            self.avg_price = 0;
        }
        self.total_invested = self.quantity * self.avg_price;
        Ok(())
    }

    /// Market value at `price`
    #[must_use]
    pub fn current_value(&self, price: Price) -> Amount {
        price.saturating_mul(self.quantity)
    }

    /// Unrealized profit at `price`
    #[must_use]
    pub fn profit(&self, price: Price) -> Amount {
        self.current_value(price).saturating_sub(self.total_invested)
    }

    /// Unrealized profit in percent of invested capital, 0 without cost basis
    #[must_use]
    pub fn profit_rate(&self, price: Price) -> f64 {
        if self.total_invested == 0 {
            return 0.0;
        }
        self.profit(price) as f64 / self.total_invested as f64 * 100.0
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn avg_price(&self) -> Price {
        self.avg_price
    }

    pub fn total_invested(&self) -> Amount {
        self.total_invested
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Positions keyed by security code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or grow the position for `code`
    pub fn add_position(&mut self, code: &str, qty: Quantity, price: Price) -> ExecutionResult<()> {
        if qty <= 0 {
            return Err(ExecutionError::InvalidQuantity { quantity: qty });
        }
        let position = self
            .positions
            .entry(code.to_string())
            .or_insert_with(|| Position::new(code));
        let result = position.add_quantity(qty, price);
        if position.is_empty() {
            self.positions.remove(code);
        }
        result
    }

    /// Shrink the position for `code`, dropping it once empty
    pub fn reduce_position(&mut self, code: &str, qty: Quantity) -> ExecutionResult<()> {
        let Some(position) = self.positions.get_mut(code) else {
            return Err(ExecutionError::InsufficientQuantity {
                code: code.to_string(),
                requested: qty,
                held: 0,
            });
        };
        position.reduce_quantity(qty)?;
        if position.is_empty() {
            self.positions.remove(code);
        }
        Ok(())
    }

    pub fn position(&self, code: &str) -> Option<&Position> {
        self.positions.get(code)
    }

    pub fn has_position(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    /// Held quantity for `code`, 0 when flat
    pub fn quantity_of(&self, code: &str) -> Quantity {
        self.positions.get(code).map_or(0, Position::quantity)
    }

    /// Positions in code order
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Market value of all positions whose security the market lists
    pub fn total_value(&self, market: &Market) -> Amount {
        self.positions
            .values()
            .filter_map(|p| market.current_price(p.code()).map(|px| p.current_value(px)))
            .sum()
    }

    /// Unrealized profit of all positions whose security the market lists
    pub fn total_profit(&self, market: &Market) -> Amount {
        self.positions
            .values()
            .filter_map(|p| market.current_price(p.code()).map(|px| p.profit(px)))
            .sum()
    }
}
