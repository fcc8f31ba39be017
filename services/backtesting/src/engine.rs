//! Strategy battle engine
//!
//! Walks one price sequence step by step and hands every observation to each
//! registered strategy in registration order. Strategies run sequentially
//! and never see each other's ledgers.

use crate::config::BacktestConfig;
use crate::market::PriceFeed;
use crate::report::StrategyReport;
use crate::strategy::{Strategy, standard_lineup};
use tracing::{debug, info, warn};

/// Owns the competing strategies and the reports of the last run
pub struct BacktestEngine {
    config: BacktestConfig,
    strategies: Vec<Box<dyn Strategy>>,
    results: Vec<StrategyReport>,
}

impl std::fmt::Debug for BacktestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("BacktestEngine")
            .field("config", &self.config)
            .field("strategies", &names)
            .field("results", &self.results.len())
            .finish()
    }
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        info!("Initializing BacktestEngine with config: {:?}", config);
        Self {
            config,
            strategies: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Engine preloaded with Panic-Sell, DCA and Buy-and-Hold
    pub fn with_standard_lineup(config: BacktestConfig) -> Self {
        let mut engine = Self::new(config);
        for strategy in standard_lineup(&engine.config) {
            engine.add_strategy(strategy);
        }
        engine
    }

    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        debug!("Registered strategy {}", strategy.name());
        self.strategies.push(strategy);
    }

    /// Run every strategy over the full price sequence and build their reports
    ///
    /// Strategies are reset first, so running twice gives identical reports.
    /// An empty feed produces no reports.
    pub fn run_battle<F: PriceFeed + ?Sized>(&mut self, feed: &F) -> &[StrategyReport] {
        self.results.clear();
        for strategy in &mut self.strategies {
            strategy.reset();
        }

        let len = feed.len();
        let prices: Vec<_> = (0..len).map_while(|i| feed.price_at(i)).collect();
        let Some(&last_price) = prices.last() else {
            warn!("Empty price history, nothing to backtest");
            return &self.results;
        };

        info!(
            "Starting battle: {} strategies over {} steps",
            self.strategies.len(),
            prices.len()
        );

        let mut prev_price = prices[0];
        for (idx, &price) in prices.iter().enumerate() {
            let change_pct = if idx == 0 || prev_price == 0 {
                0.0
            } else {
                (price - prev_price) as f64 / prev_price as f64 * 100.0
            };

            for strategy in &mut self.strategies {
                strategy.on_price(idx, price, change_pct);
            }
            prev_price = price;
        }

        for strategy in &mut self.strategies {
            strategy.on_finish(last_price);
            let report = StrategyReport::build(&**strategy, self.config.initial_cash, last_price);
            info!(
                "{}: final equity {} ({:.2}%), MDD {:.2}%",
                report.strategy_name, report.final_equity, report.total_return, report.max_drawdown
            );
            self.results.push(report);
        }

        &self.results
    }

    pub fn results(&self) -> &[StrategyReport] {
        &self.results
    }

    pub fn strategies(&self) -> &[Box<dyn Strategy>] {
        &self.strategies
    }

    /// Registered strategy by name
    pub fn strategy(&self, name: &str) -> Option<&dyn Strategy> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .map(|s| &**s)
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }
}
