//! Securities and the market that owns them

use crate::Price;
use serde::{Deserialize, Serialize};

/// Lowest price a security can trade at
pub const MIN_PRICE: Price = 1;

/// Indexable, append-only price sequence the backtest engine walks through
pub trait PriceFeed {
    /// Price at step `idx`, `None` past the end
    fn price_at(&self, idx: usize) -> Option<Price>;

    /// Number of recorded steps
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceFeed for [Price] {
    fn price_at(&self, idx: usize) -> Option<Price> {
        self.get(idx).copied()
    }

    fn len(&self) -> usize {
        <[Price]>::len(self)
    }
}

impl PriceFeed for Vec<Price> {
    fn price_at(&self, idx: usize) -> Option<Price> {
        self.get(idx).copied()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// A tradable security with its live price and price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    code: String,
    name: String,
    current_price: Price,
    previous_price: Price,
    price_history: Vec<Price>,
}

impl Security {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        let price = price.max(MIN_PRICE);
        Self {
            code: code.into(),
            name: name.into(),
            current_price: price,
            previous_price: price,
            price_history: Vec::new(),
        }
    }

    /// Move the live price, remembering the old one
    pub fn update_price(&mut self, new_price: Price) {
        self.previous_price = self.current_price;
        self.current_price = new_price.max(MIN_PRICE);
    }

    /// Append one step to the historical sequence
    pub fn add_price_history(&mut self, price: Price) {
        self.price_history.push(price.max(MIN_PRICE));
    }

    /// Percent change from previous to current price
    #[must_use]
    pub fn change_rate(&self) -> f64 {
        if self.previous_price == 0 {
            return 0.0;
        }
        (self.current_price - self.previous_price) as f64 / self.previous_price as f64 * 100.0
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_price(&self) -> Price {
        self.current_price
    }

    pub fn previous_price(&self) -> Price {
        self.previous_price
    }

    pub fn history(&self) -> &[Price] {
        &self.price_history
    }
}

impl PriceFeed for Security {
    fn price_at(&self, idx: usize) -> Option<Price> {
        self.price_history.get(idx).copied()
    }

    fn len(&self) -> usize {
        self.price_history.len()
    }
}

/// Owning collection of every listed security
#[derive(Debug, Default, Clone)]
pub struct Market {
    securities: Vec<Security>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a security. A security with the same code is replaced.
    pub fn add_security(&mut self, security: Security) {
        match self.securities.iter_mut().find(|s| s.code == security.code) {
            Some(existing) => *existing = security,
            None => self.securities.push(security),
        }
    }

    pub fn security(&self, code: &str) -> Option<&Security> {
        self.securities.iter().find(|s| s.code == code)
    }

    pub fn security_mut(&mut self, code: &str) -> Option<&mut Security> {
        self.securities.iter_mut().find(|s| s.code == code)
    }

    /// Last price of a listed security
    pub fn current_price(&self, code: &str) -> Option<Price> {
        self.security(code).map(Security::current_price)
    }

    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    pub(crate) fn securities_mut(&mut self) -> &mut [Security] {
        &mut self.securities
    }
}
