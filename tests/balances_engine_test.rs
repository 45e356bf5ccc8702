use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use alloy_primitives::Address;
use carbonscope::chain::MockChain;
use carbonscope::config::BalanceMode;
use carbonscope::db::{init_db, Repository};
use carbonscope::domain::{Order, Strategy, StrategyDefinition, StrategyId};
use carbonscope::engine::{BalanceResolver, BalancesError};
use carbonscope::pricing::{StaticPriceSource, TokenRegistry};
use tempfile::TempDir;

const CONTROLLER: Address = Address::repeat_byte(0xCC);
const TOKEN0: Address = Address::repeat_byte(0x01);
const TOKEN1: Address = Address::repeat_byte(0x02);

fn alice() -> Address {
    Address::from_str("0xAbCdEF0123456789abcdef0123456789ABCDEF01").unwrap()
}

fn bob() -> Address {
    Address::repeat_byte(0xBB)
}

fn strategy(id: u64, owner: Address, orders: [Order; 2]) -> Strategy {
    Strategy {
        id: StrategyId::from(id),
        owner,
        tokens: [TOKEN0, TOKEN1],
        orders,
    }
}

fn definition(strategy: Strategy) -> StrategyDefinition {
    StrategyDefinition {
        controller: CONTROLLER,
        strategy,
    }
}

/// TOKEN0: 18 decimals priced at 2 USD; TOKEN1: 6 decimals priced at 1 USD.
fn mock_chain() -> MockChain {
    MockChain::new(CONTROLLER)
        .with_token(TOKEN0, "WETH", 18)
        .with_token(TOKEN1, "USDC", 6)
}

fn prices() -> StaticPriceSource {
    StaticPriceSource::new()
        .with_price(TOKEN0, "2")
        .with_price(TOKEN1, "1")
}

struct TestHarness {
    resolver: BalanceResolver,
    repo: Arc<Repository>,
    chain: MockChain,
    _temp: TempDir,
}

async fn setup(mode: BalanceMode, chain: MockChain) -> TestHarness {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let registry = Arc::new(TokenRegistry::new(
        Arc::new(chain.clone()),
        Arc::new(prices()),
        "ethereum".to_string(),
    ));
    let resolver = BalanceResolver::new(
        Arc::new(chain.clone()),
        registry,
        repo.clone(),
        "ethereum".to_string(),
        mode,
    );

    TestHarness {
        resolver,
        repo,
        chain,
        _temp: temp_dir,
    }
}

async fn seed(harness: &TestHarness, definitions: &[StrategyDefinition]) {
    harness
        .repo
        .replace_definitions(definitions, 1_000)
        .await
        .expect("seed failed");
}

#[tokio::test]
async fn test_zero_address_short_circuits_without_reads() {
    let harness = setup(BalanceMode::Live, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]))],
    )
    .await;
    let reads = harness.chain.reads();

    let display = harness.resolver.display_balances(Address::ZERO).await.unwrap();
    let raw = harness.resolver.raw_balances(Address::ZERO).await.unwrap();

    assert!(display.is_empty());
    assert!(raw.is_empty());
    assert_eq!(reads.total(), 0);
}

#[tokio::test]
async fn test_not_ready_before_first_cycle() {
    let harness = setup(BalanceMode::Cached, mock_chain()).await;

    let err = harness.resolver.display_balances(alice()).await.unwrap_err();
    assert!(matches!(err, BalancesError::NotReady));
}

#[tokio::test]
async fn test_ownership_filter_is_case_insensitive() {
    let harness = setup(BalanceMode::Cached, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(
            1,
            alice(),
            [Order::new(1_000_000_000_000_000_000, 0, 1, 0), Order::new(0, 0, 0, 0)],
        ))],
    )
    .await;

    let upper = Address::from_str("0xABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
    let lower = Address::from_str("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();

    let from_upper = harness.resolver.display_balances(upper).await.unwrap();
    let from_lower = harness.resolver.display_balances(lower).await.unwrap();

    assert_eq!(from_upper.len(), 1);
    assert_eq!(from_upper, from_lower);
}

#[tokio::test]
async fn test_other_owner_sees_nothing() {
    let harness = setup(BalanceMode::Cached, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]))],
    )
    .await;

    let balances = harness.resolver.display_balances(bob()).await.unwrap();
    assert!(balances.is_empty());
}

#[tokio::test]
async fn test_display_balances_value_both_legs() {
    // Leg 0: 1.5 WETH at 2 USD = 3 USD. Leg 1: 2 USDC at 1 USD = 2 USD.
    let harness = setup(BalanceMode::Cached, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(
            5,
            alice(),
            [
                Order::new(1_500_000_000_000_000_000, 0, 1, 0),
                Order::new(2_000_000, 0, 0, 0),
            ],
        ))],
    )
    .await;

    let balances = harness.resolver.display_balances(alice()).await.unwrap();
    assert_eq!(balances.len(), 1);

    let position = &balances[0];
    assert_eq!(position.label, "WETH / USDC");
    assert_eq!(position.balance_usd.to_canonical_string(), "5");
    assert_eq!(position.tokens[0].amount.to_canonical_string(), "1.5");
    assert_eq!(position.tokens[0].balance_usd.to_canonical_string(), "3");
    assert_eq!(position.tokens[1].amount.to_canonical_string(), "2");
    assert_eq!(position.tokens[1].balance_usd.to_canonical_string(), "2");
}

#[tokio::test]
async fn test_display_and_raw_derive_from_same_snapshot() {
    let harness = setup(BalanceMode::Cached, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(
            5,
            alice(),
            [
                Order::new(1_500_000_000_000_000_000, 0, 1, 0),
                Order::new(2_000_000, 0, 0, 0),
            ],
        ))],
    )
    .await;

    let display = harness.resolver.display_balances(alice()).await.unwrap();
    let raw = harness.resolver.raw_balances(alice()).await.unwrap();

    assert_eq!(display.len(), 1);
    assert_eq!(raw.len(), 1);
    assert_eq!(display[0].key, raw[0].key);
    for i in 0..2 {
        assert_eq!(display[0].tokens[i].balance_raw, raw[0].tokens[i].balance);
    }
    assert_eq!(raw[0].tokens[0].balance, "1500000000000000000");
    assert_eq!(raw[0].tokens[1].balance, "2000000");
    assert_ne!(raw[0].tokens[0].key, raw[0].tokens[1].key);
}

#[tokio::test]
async fn test_cached_mode_issues_no_strategy_reads() {
    let harness = setup(BalanceMode::Cached, mock_chain()).await;
    seed(
        &harness,
        &[definition(strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]))],
    )
    .await;
    let reads = harness.chain.reads();

    harness.resolver.display_balances(alice()).await.unwrap();

    assert_eq!(reads.strategies.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_live_mode_rereads_each_owned_position() {
    let listed = strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]);
    let harness = setup(BalanceMode::Live, mock_chain().with_strategy(listed.clone())).await;
    seed(&harness, &[definition(listed)]).await;
    let reads = harness.chain.reads();

    harness.resolver.display_balances(alice()).await.unwrap();

    assert_eq!(reads.strategies.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_live_mode_uses_fresh_reserves() {
    let listed = strategy(
        1,
        alice(),
        [Order::new(1_000_000_000_000_000_000, 0, 1, 0), Order::new(0, 0, 0, 0)],
    );
    let mut fresh = listed.clone();
    fresh.orders[0].y = 2_000_000_000_000_000_000;

    let chain = mock_chain()
        .with_strategy(listed.clone())
        .with_strategy_override(fresh);
    let harness = setup(BalanceMode::Live, chain).await;
    seed(&harness, &[definition(listed)]).await;

    let balances = harness.resolver.display_balances(alice()).await.unwrap();
    assert_eq!(balances[0].tokens[0].balance_raw, "2000000000000000000");
    assert_eq!(balances[0].tokens[0].amount.to_canonical_string(), "2");
}

#[tokio::test]
async fn test_live_mode_drops_transferred_strategy() {
    let listed = strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]);
    let mut transferred = listed.clone();
    transferred.owner = bob();

    let chain = mock_chain()
        .with_strategy(listed.clone())
        .with_strategy_override(transferred);
    let harness = setup(BalanceMode::Live, chain).await;
    seed(&harness, &[definition(listed)]).await;

    let balances = harness.resolver.display_balances(alice()).await.unwrap();
    assert!(balances.is_empty());
}

#[tokio::test]
async fn test_live_mode_drops_deactivated_strategy() {
    let listed = strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]);
    let mut withdrawn = listed.clone();
    withdrawn.orders = [Order::new(0, 0, 0, 0), Order::new(0, 0, 0, 0)];

    let chain = mock_chain()
        .with_strategy(listed.clone())
        .with_strategy_override(withdrawn);
    let harness = setup(BalanceMode::Live, chain).await;
    seed(&harness, &[definition(listed)]).await;

    let balances = harness.resolver.display_balances(alice()).await.unwrap();
    assert!(balances.is_empty());
}

#[tokio::test]
async fn test_cached_mode_still_shows_transferred_strategy() {
    // Documented staleness bound: a transfer since the last cycle is not
    // visible to cached resolution until the next cycle.
    let listed = strategy(1, alice(), [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)]);
    let mut transferred = listed.clone();
    transferred.owner = bob();

    let chain = mock_chain()
        .with_strategy(listed.clone())
        .with_strategy_override(transferred);
    let harness = setup(BalanceMode::Cached, chain).await;
    seed(&harness, &[definition(listed)]).await;

    let balances = harness.resolver.display_balances(alice()).await.unwrap();
    assert_eq!(balances.len(), 1);
}
