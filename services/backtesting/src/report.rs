//! Per-strategy results and their comparison

use crate::strategy::{DcaStrategy, PanicSellStrategy, Strategy};
use crate::{Amount, Price, Quantity, metrics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one strategy over a full run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy_name: String,
    pub initial_cash: Amount,
    pub final_equity: Amount,
    pub total_return: f64, // percent
    pub max_drawdown: f64, // percent
    pub volatility: f64,   // percent, std dev of step returns
    pub buy_count: u32,
    pub sell_count: u32,
    pub final_shares: Quantity,
    pub avg_price: Price,
}

impl StrategyReport {
    /// Snapshot a strategy after its last observation
    pub fn build(strategy: &dyn Strategy, initial_cash: Amount, last_price: Price) -> Self {
        let ledger = strategy.ledger();
        let final_equity = ledger.total_value(last_price);
        Self {
            strategy_name: strategy.name().to_string(),
            initial_cash,
            final_equity,
            total_return: metrics::total_return(initial_cash, final_equity),
            max_drawdown: metrics::max_drawdown(ledger.equity_history()),
            volatility: metrics::volatility(ledger.equity_history()),
            buy_count: ledger.buy_count(),
            sell_count: ledger.sell_count(),
            final_shares: ledger.shares(),
            avg_price: ledger.avg_price(),
        }
    }
}

/// Panic-Sell vs DCA comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Fewer than two strategies ran
    InsufficientData,
    /// Panic-Sell or DCA report is absent
    MissingStrategy,
    /// DCA beat Panic-Sell by `diff` percentage points
    DcaOutperformed { diff: f64 },
    /// Panic-Sell did at least as well as DCA; `diff` is DCA minus Panic-Sell
    PanicSellFavored { diff: f64 },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::InsufficientData => write!(f, "Insufficient data"),
            Verdict::MissingStrategy => write!(f, "No strategies to compare."),
            Verdict::DcaOutperformed { diff } => write!(
                f,
                "The averaging-down strategy earned {diff:.2}%p more than the emotional stop-loss strategy.\n\
                 Trade less on impulse and build the habit of sticking to your rules."
            ),
            Verdict::PanicSellFavored { .. } => write!(
                f,
                "In this scenario the stop-loss strategy came out ahead.\n\
                 Over the long run, disciplined investing is still the steadier path."
            ),
        }
    }
}

/// Comparison view over the reports of one run
#[derive(Debug, Clone)]
pub struct BacktestReport {
    security_name: String,
    results: Vec<StrategyReport>,
}

impl BacktestReport {
    pub fn new(security_name: impl Into<String>, results: Vec<StrategyReport>) -> Self {
        Self {
            security_name: security_name.into(),
            results,
        }
    }

    pub fn results(&self) -> &[StrategyReport] {
        &self.results
    }

    /// Reports by descending total return, ties in registration order
    pub fn ranked(&self) -> Vec<&StrategyReport> {
        let mut ranked: Vec<&StrategyReport> = self.results.iter().collect();
        ranked.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
        ranked
    }

    /// Best performing report
    pub fn winner(&self) -> Option<&StrategyReport> {
        self.ranked().into_iter().next()
    }

    fn find(&self, name: &str) -> Option<&StrategyReport> {
        self.results.iter().find(|r| r.strategy_name == name)
    }

    /// Compare DCA against Panic-Sell
    pub fn verdict(&self) -> Verdict {
        if self.results.len() < 2 {
            return Verdict::InsufficientData;
        }
        let (Some(panic), Some(dca)) = (
            self.find(PanicSellStrategy::NAME),
            self.find(DcaStrategy::NAME),
        ) else {
            return Verdict::MissingStrategy;
        };
        let diff = dca.total_return - panic.total_return;
        if diff > 0.0 {
            Verdict::DcaOutperformed { diff }
        } else {
            Verdict::PanicSellFavored { diff }
        }
    }

    /// Verdict rendered as text
    pub fn summary_comment(&self) -> String {
        self.verdict().to_string()
    }

    /// Multi-line summary of every strategy
    pub fn render_summary(&self) -> String {
        let mut out = String::from("=== Backtest Result Report ===\n");
        out.push_str(&format!("Security: {}\n", self.security_name));
        let Some(first) = self.results.first() else {
            return out;
        };
        out.push_str(&format!("Initial cash: {}\n", first.initial_cash));
        for res in &self.results {
            out.push_str(&format!("\n[{}]\n", res.strategy_name));
            out.push_str(&format!(
                "Final equity: {} | Return: {:.2}%\n",
                res.final_equity, res.total_return
            ));
            out.push_str(&format!(
                "MDD: {:.2}% | Volatility: {:.2}% | Buys: {} | Sells: {}\n",
                res.max_drawdown, res.volatility, res.buy_count, res.sell_count
            ));
            out.push_str(&format!(
                "Shares held: {} | Avg price: {}\n",
                res.final_shares, res.avg_price
            ));
        }
        out
    }

    /// One-line ranking followed by the winner
    pub fn render_ranking(&self) -> String {
        let ranked = self.ranked();
        let Some(winner) = ranked.first() else {
            return String::new();
        };
        let mut out = String::from("Ranking:");
        for (i, res) in ranked.iter().enumerate() {
            let sign = if res.total_return > 0.0 { "+" } else { "" };
            out.push_str(&format!(
                " {}. {}({}{:.0}%)",
                i + 1,
                res.strategy_name,
                sign,
                res.total_return
            ));
        }
        out.push_str(&format!("\nWinner: {}", winner.strategy_name));
        out
    }
}
