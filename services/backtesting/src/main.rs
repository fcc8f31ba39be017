//! Habit Backtester CLI
//!
//! Runs the Panic-Sell / DCA / Buy-and-Hold battle over a price history, or
//! walks through a manual buy/sell session on a cash account.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use habit_backtester::{
    Account, BacktestConfig, BacktestEngine, BacktestReport, Market, OrderSide, PriceJitter,
    PriceType, Security,
};
use tracing::info;

/// 30 trading days: slide, crash, bottom, recovery, new high
const SAMPLE_PRICES: [i64; 30] = [
    70000, 71000, 69500, 68000, 65000, //
    62000, 58000, 55000, 53000, 50000, //
    48000, 49000, 51000, 52000, 54000, //
    56000, 58000, 60000, 62000, 64000, //
    65000, 67000, 68000, 70000, 72000, //
    74000, 75000, 76000, 78000, 80000,
];

const SAMPLE_CODE: &str = "005930";
const SAMPLE_NAME: &str = "Samsung Electronics";

#[derive(Parser)]
#[clap(name = "habit-backtester")]
#[clap(about = "Compare panic selling, dollar-cost averaging and buy-and-hold on one price history")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    /// JSON backtest config; missing fields use defaults
    #[clap(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the strategy battle
    Battle {
        /// Generate a jittered history of this many steps instead of the sample data
        #[clap(long)]
        simulate: Option<usize>,

        /// Seed for the generated history
        #[clap(long, default_value = "42")]
        seed: u64,

        /// Override the initial cash
        #[clap(long)]
        initial_cash: Option<i64>,

        /// Print the reports as JSON
        #[clap(long)]
        json: bool,
    },

    /// Buy, let the market move, then sell part of the position
    Account {
        /// Shares to buy
        #[clap(long, default_value = "10")]
        buy: i64,

        /// Shares to sell after the price moves
        #[clap(long, default_value = "5")]
        sell: i64,

        /// Seed for the market move
        #[clap(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BacktestConfig::load(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => BacktestConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Battle {
        simulate: None,
        seed: 42,
        initial_cash: None,
        json: false,
    }) {
        Commands::Battle {
            simulate,
            seed,
            initial_cash,
            json,
        } => run_battle(config, simulate, seed, initial_cash, json),
        Commands::Account { buy, sell, seed } => run_account(&config, buy, sell, seed),
    }
}

fn sample_security(prices: &[i64]) -> Security {
    let mut security = Security::new(SAMPLE_CODE, SAMPLE_NAME, prices.first().copied().unwrap_or(1));
    for &p in prices {
        security.add_price_history(p);
    }
    security
}

fn run_battle(
    mut config: BacktestConfig,
    simulate: Option<usize>,
    seed: u64,
    initial_cash: Option<i64>,
    json: bool,
) -> Result<()> {
    if let Some(cash) = initial_cash {
        config.initial_cash = cash;
    }
    config.validate().context("Invalid backtest config")?;

    let prices = match simulate {
        Some(steps) => {
            info!("Generating {} jittered steps with seed {}", steps, seed);
            PriceJitter::with_seed(seed).generate_history(SAMPLE_PRICES[0], steps)
        }
        None => SAMPLE_PRICES.to_vec(),
    };
    let security = sample_security(&prices);

    let mut engine = BacktestEngine::with_standard_lineup(config);
    let results = engine.run_battle(&security).to_vec();
    let report = BacktestReport::new(security.name(), results);

    if json {
        let out = serde_json::to_string_pretty(report.results())
            .context("Failed to serialize reports")?;
        println!("{out}");
        return Ok(());
    }

    println!("{}", report.render_summary());
    println!("{}", report.render_ranking());
    println!();
    println!("{}", report.summary_comment());
    Ok(())
}

fn run_account(config: &BacktestConfig, buy: i64, sell: i64, seed: u64) -> Result<()> {
    if sell > buy {
        bail!("Cannot sell {sell} shares after buying only {buy}");
    }

    let mut market = Market::new();
    market.add_security(Security::new(SAMPLE_CODE, SAMPLE_NAME, SAMPLE_PRICES[0]));

    let mut account = Account::new("user1_ACC", 0, config.fee_rate);
    account.deposit(config.initial_cash)?;
    println!("{}", account.summary(&market));

    let buy_id = account.place_order(SAMPLE_CODE, OrderSide::Buy, PriceType::Market, buy)?;
    match account.execute_order(buy_id, &market) {
        Ok(tx) => println!("Buy filled: {} x{} @ {}", tx.security_name, tx.quantity, tx.price),
        Err(e) => println!("Buy failed: {e}"),
    }

    PriceJitter::with_seed(seed).simulate_market(&mut market);
    print_holdings(&account, &market);

    let sell_id = account.place_order(SAMPLE_CODE, OrderSide::Sell, PriceType::Market, sell)?;
    match account.execute_order(sell_id, &market) {
        Ok(tx) => println!("Sell filled: {} x{} @ {}", tx.security_name, tx.quantity, tx.price),
        Err(e) => println!("Sell failed: {e}"),
    }

    print_holdings(&account, &market);
    Ok(())
}

fn print_holdings(account: &Account, market: &Market) {
    println!("{}", account.summary(market));
    for pos in account.portfolio().positions() {
        let Some(security) = market.security(pos.code()) else {
            continue;
        };
        println!(
            "[{}] {} | Qty: {} | Avg: {} | Price: {} | Return: {:.2}%",
            pos.code(),
            security.name(),
            pos.quantity(),
            pos.avg_price(),
            security.current_price(),
            pos.profit_rate(security.current_price())
        );
    }
}
