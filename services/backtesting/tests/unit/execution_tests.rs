//! Unit tests for account order placement and settlement

use crate::test_utils::*;
use assert_matches::assert_matches;
use habit_backtester::*;
use rstest::*;

const FEE: f64 = 0.00015;

#[fixture]
fn funded_account() -> Account {
    Account::new("user1_ACC", 10_000_000, FEE)
}

#[rstest]
fn test_place_order_is_pending_without_funds_check() {
    let mut account = Account::new("poor", 0, FEE);

    let id = account
        .place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 1_000)
        .unwrap();

    let order = account.order(id).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.quantity, 1_000);
    assert_eq!(account.balance(), 0);
}

#[rstest]
fn test_order_ids_are_monotonic_and_seedable() {
    let mut account = Account::with_sequences(
        "seeded",
        0,
        FEE,
        IdSequence::starting_at(500),
        IdSequence::starting_at(9_000),
    );
    let a = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 1).unwrap();
    let b = account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 1).unwrap();
    assert_eq!((a, b), (500, 501));
}

#[rstest]
fn test_buy_settles_at_market_price(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let id = funded_account
        .place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 10)
        .unwrap();

    let tx = funded_account.execute_order(id, &market).unwrap().clone();

    assert_eq!(tx.order_id, id);
    assert_eq!(tx.price, 70_000);
    assert_eq!(tx.gross_amount, 700_000);
    assert_eq!(tx.fee, 104);
    assert_eq!(tx.net_amount(), 700_104);
    assert_eq!(tx.security_name, TEST_NAME);

    assert_eq!(funded_account.balance(), 10_000_000 - 700_104);
    assert_eq!(funded_account.order(id).unwrap().status, OrderStatus::Completed);

    let pos = funded_account.portfolio().position(TEST_CODE).unwrap();
    assert_eq!(pos.quantity(), 10);
    assert_eq!(pos.avg_price(), 70_000);
    assert_eq!(funded_account.transactions().len(), 1);
}

#[rstest]
fn test_sell_credits_net_proceeds(mut funded_account: Account) {
    let mut market = TestDataFactory::market_with(70_000);
    let buy = funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 10).unwrap();
    funded_account.execute_order(buy, &market).unwrap();
    let after_buy = funded_account.balance();

    market.security_mut(TEST_CODE).unwrap().update_price(80_000);
    let sell = funded_account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 5).unwrap();
    let tx = funded_account.execute_order(sell, &market).unwrap().clone();

    // 400_000 * 0.00015 is just under 60 in binary floating point
    assert_eq!(tx.fee, 59);
    assert_eq!(tx.fee, fee_for(400_000, FEE));
    assert_eq!(funded_account.balance(), after_buy + 400_000 - 59);

    let pos = funded_account.portfolio().position(TEST_CODE).unwrap();
    assert_eq!(pos.quantity(), 5);
    assert_eq!(pos.avg_price(), 70_000);
    assert_eq!(pos.profit(80_000), 50_000);
    assert_eq!(funded_account.realized_profit(), 5 * (80_000 - 70_000) - 59);
    assert_eq!(
        funded_account.total_asset_value(&market),
        funded_account.balance() + 5 * 80_000
    );
}

#[rstest]
fn test_selling_everything_closes_position(mut funded_account: Account) {
    let market = TestDataFactory::market_with(1_000);
    let buy = funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 3).unwrap();
    funded_account.execute_order(buy, &market).unwrap();
    let sell = funded_account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 3).unwrap();
    funded_account.execute_order(sell, &market).unwrap();

    assert!(!funded_account.portfolio().has_position(TEST_CODE));
    assert_eq!(funded_account.transactions().len(), 2);
}

#[rstest]
fn test_insufficient_cash_leaves_account_untouched() {
    let mut account = Account::new("small", 700_000, FEE);
    let market = TestDataFactory::market_with(70_000);
    let id = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 10).unwrap();

    let result = account.execute_order(id, &market).cloned();

    assert_matches!(
        result,
        Err(ExecutionError::InsufficientFunds { required: 700_104, available: 700_000 })
    );
    assert_eq!(account.balance(), 700_000);
    assert_eq!(account.realized_profit(), 0);
    assert!(account.portfolio().is_empty());
    assert!(account.transactions().is_empty());
    assert_eq!(account.order(id).unwrap().status, OrderStatus::Pending);
}

#[rstest]
fn test_pending_order_can_be_retried_after_deposit() {
    let mut account = Account::new("retry", 700_000, FEE);
    let market = TestDataFactory::market_with(70_000);
    let id = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 10).unwrap();
    assert!(account.execute_order(id, &market).is_err());

    account.deposit(1_000).unwrap();

    assert!(account.execute_order(id, &market).is_ok());
    assert_eq!(account.balance(), 700_000 + 1_000 - 700_104);
}

#[rstest]
fn test_oversell_fails_and_order_stays_pending(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let buy = funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 2).unwrap();
    funded_account.execute_order(buy, &market).unwrap();
    let balance = funded_account.balance();

    let sell = funded_account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 3).unwrap();
    let result = funded_account.execute_order(sell, &market).cloned();

    assert_matches!(
        result,
        Err(ExecutionError::InsufficientQuantity { requested: 3, held: 2, .. })
    );
    assert_eq!(funded_account.balance(), balance);
    assert_eq!(funded_account.portfolio().quantity_of(TEST_CODE), 2);
    assert!(funded_account.order(sell).unwrap().is_pending());
}

#[rstest]
fn test_sell_without_position_fails(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let sell = funded_account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 1).unwrap();
    assert_matches!(
        funded_account.execute_order(sell, &market),
        Err(ExecutionError::InsufficientQuantity { held: 0, .. })
    );
}

#[rstest]
fn test_unknown_order_id_fails(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    assert_matches!(
        funded_account.execute_order(42, &market),
        Err(ExecutionError::OrderNotFound { order_id: 42 })
    );
    assert_eq!(funded_account.balance(), 10_000_000);
}

#[rstest]
fn test_completed_order_cannot_execute_twice(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let id = funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 1).unwrap();
    funded_account.execute_order(id, &market).unwrap();
    let balance = funded_account.balance();

    assert_matches!(
        funded_account.execute_order(id, &market),
        Err(ExecutionError::OrderNotPending { status: OrderStatus::Completed, .. })
    );
    assert_eq!(funded_account.balance(), balance);
    assert_eq!(funded_account.transactions().len(), 1);
    assert_eq!(funded_account.portfolio().quantity_of(TEST_CODE), 1);
}

#[rstest]
fn test_unknown_security_fails(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let id = funded_account.place_order("000660", OrderSide::Buy, PriceType::Market, 1).unwrap();
    assert_matches!(
        funded_account.execute_order(id, &market),
        Err(ExecutionError::UnknownSecurity { .. })
    );
    assert!(funded_account.order(id).unwrap().is_pending());
}

#[rstest]
fn test_cancel_is_terminal(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let id = funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 1).unwrap();

    funded_account.cancel_order(id).unwrap();

    assert_eq!(funded_account.order(id).unwrap().status, OrderStatus::Cancelled);
    assert_matches!(
        funded_account.execute_order(id, &market),
        Err(ExecutionError::OrderNotPending { status: OrderStatus::Cancelled, .. })
    );
    assert_matches!(
        funded_account.cancel_order(id),
        Err(ExecutionError::OrderNotPending { .. })
    );
    assert_matches!(funded_account.cancel_order(999), Err(ExecutionError::OrderNotFound { .. }));
}

#[rstest]
#[case(OrderSide::Buy, 69_000, 68_000, true)]
#[case(OrderSide::Buy, 69_000, 69_000, true)]
#[case(OrderSide::Buy, 69_000, 69_500, false)]
#[case(OrderSide::Sell, 71_000, 72_000, true)]
#[case(OrderSide::Sell, 71_000, 70_500, false)]
fn test_limit_orders(
    #[case] side: OrderSide,
    #[case] limit: Price,
    #[case] moved: Price,
    #[case] settles: bool,
) {
    let mut account = Account::new("limit", 10_000_000, 0.0);
    let mut market = TestDataFactory::market_with(70_000);
    let seed = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 5).unwrap();
    account.execute_order(seed, &market).unwrap();

    let id = account.place_order(TEST_CODE, side, PriceType::Limit(limit), 1).unwrap();
    assert_matches!(
        account.execute_order(id, &market),
        Err(ExecutionError::LimitNotReached { market: 70_000, .. })
    );

    // Fills happen at the market price, not the limit
    market.security_mut(TEST_CODE).unwrap().update_price(moved);
    let settled = account.execute_order(id, &market).map(|tx| tx.price);

    if settles {
        assert_eq!(settled, Ok(moved));
        assert_eq!(account.order(id).unwrap().status, OrderStatus::Completed);
    } else {
        assert_matches!(settled, Err(ExecutionError::LimitNotReached { .. }));
        assert!(account.order(id).unwrap().is_pending());
    }
}

#[rstest]
fn test_marketable_limit_fills_at_market_price(mut funded_account: Account) {
    let market = TestDataFactory::market_with(70_000);
    let id = funded_account
        .place_order(TEST_CODE, OrderSide::Buy, PriceType::Limit(75_000), 1)
        .unwrap();
    assert_eq!(funded_account.execute_order(id, &market).map(|tx| tx.price), Ok(70_000));
}

#[rstest]
fn test_deposit_and_withdraw_validation(mut funded_account: Account) {
    assert_matches!(funded_account.deposit(0), Err(ExecutionError::InvalidAmount { amount: 0 }));
    assert_matches!(funded_account.withdraw(-5), Err(ExecutionError::InvalidAmount { .. }));
    assert_matches!(
        funded_account.withdraw(10_000_001),
        Err(ExecutionError::InsufficientFunds { .. })
    );

    funded_account.withdraw(4_000_000).unwrap();
    funded_account.deposit(1_000).unwrap();
    assert_eq!(funded_account.balance(), 6_001_000);
}

#[rstest]
fn test_place_order_rejects_non_positive_quantity(mut funded_account: Account) {
    assert_matches!(
        funded_account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 0),
        Err(ExecutionError::InvalidQuantity { quantity: 0 })
    );
    assert!(funded_account.orders().is_empty());
}

#[rstest]
#[case(1_000, FEE, 263_524_915_338_708)]
#[case(1_000, 0.0, 131_762_457_669_355)]
fn test_oversized_buy_is_rejected_without_side_effects(
    #[case] balance: Amount,
    #[case] fee_rate: f64,
    #[case] quantity: Quantity,
) {
    let mut account = Account::new("huge", balance, fee_rate);
    let market = TestDataFactory::market_with(70_000);
    let id = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, quantity).unwrap();

    assert_matches!(
        account.execute_order(id, &market),
        Err(ExecutionError::AmountOverflow { price: 70_000, .. })
    );
    assert_eq!(account.balance(), balance);
    assert!(account.portfolio().is_empty());
    assert!(account.transactions().is_empty());
    assert!(account.order(id).unwrap().is_pending());
}

#[rstest]
fn test_sell_overflowing_cash_is_rejected_without_side_effects() {
    let mut account = Account::new("rich", Amount::MAX, 0.0);
    let mut market = TestDataFactory::market_with(1);
    let buy = account.place_order(TEST_CODE, OrderSide::Buy, PriceType::Market, 1).unwrap();
    account.execute_order(buy, &market).unwrap();

    market.security_mut(TEST_CODE).unwrap().update_price(3);
    let sell = account.place_order(TEST_CODE, OrderSide::Sell, PriceType::Market, 1).unwrap();

    assert_matches!(
        account.execute_order(sell, &market),
        Err(ExecutionError::AmountOverflow { quantity: 1, price: 3 })
    );
    assert_eq!(account.balance(), Amount::MAX - 1);
    assert_eq!(account.portfolio().quantity_of(TEST_CODE), 1);
    assert_eq!(account.realized_profit(), 0);
    assert!(account.order(sell).unwrap().is_pending());
}
