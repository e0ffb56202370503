//! End-to-end harvest cycles against a fully stubbed world.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use scythe_domain::{
    Amount, Asset, BasisPoints, ConversionRoute, FeeTier, Hop, RewardConfig, TriggerReason,
    TriggerState,
};
use scythe_strategy::{
    GaugePort, GovernanceKey, Harvester, Recipient, StrategyConfig, StrategyError, StubBank,
    StubGauge, StubSwap, StubVault, VaultPort,
};

fn asset(ticker: &str) -> Asset {
    Asset::new(ticker).unwrap()
}

fn bps(value: u16) -> BasisPoints {
    BasisPoints::new(value).unwrap()
}

fn conversion_route() -> ConversionRoute {
    ConversionRoute::new(vec![
        Hop::new(asset("CRV"), asset("WETH"), FeeTier::new(3_000).unwrap()).unwrap(),
        Hop::new(asset("WETH"), asset("WANT"), FeeTier::new(500).unwrap()).unwrap(),
    ])
    .unwrap()
}

struct World {
    bank: Arc<StubBank>,
    gauge: Arc<StubGauge>,
    swap: Arc<StubSwap>,
    vault: Arc<StubVault>,
    governance: GovernanceKey,
    harvester: Harvester<StubVault, StubGauge, StubSwap, StubBank>,
}

fn world(keep_bps: u16, secondary: Option<&str>) -> World {
    let bank = Arc::new(StubBank::new());
    let gauge = Arc::new(StubGauge::new(bank.clone(), asset("WANT"), asset("CRV")));
    let swap = Arc::new(StubSwap::new(bank.clone()));
    let vault = Arc::new(StubVault::new());
    let governance = GovernanceKey::generate();

    let reward = match secondary {
        None => RewardConfig::new(bps(keep_bps)),
        Some(ticker) => RewardConfig::with_secondary_reward(bps(keep_bps), asset(ticker)),
    };
    let config = StrategyConfig::new(
        asset("WANT"),
        asset("CRV"),
        asset("WETH"),
        reward,
        Recipient::new("treasury").unwrap(),
        conversion_route(),
        FeeTier::new(3_000).unwrap(),
    )
    .unwrap();
    let trigger = TriggerState::new(
        Duration::from_secs(86_400),
        Duration::from_secs(7 * 86_400),
    )
    .unwrap();

    let harvester = Harvester::new(
        vault.clone(),
        gauge.clone(),
        swap.clone(),
        bank.clone(),
        governance.clone(),
        config,
        trigger,
    );

    World {
        bank,
        gauge,
        swap,
        vault,
        governance,
        harvester,
    }
}

#[tokio::test]
async fn end_to_end_primary_reward_harvest() {
    let mut w = world(1_000, None); // 10% keep rate
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
    w.vault.set_total_debt(Amount::new(1_000));

    let report = w.harvester.harvest().await.unwrap();

    // 10 CRV retained, 90 converted 1:1 into idle want
    assert_eq!(
        w.bank.recorded_transfers(),
        vec![(asset("CRV"), Recipient::new("treasury").unwrap(), Amount::new(10))]
    );
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(90));
    assert_eq!(report.profit, Amount::new(90));
    assert_eq!(report.loss, Amount::ZERO);
    assert_eq!(report.debt_payment, Amount::ZERO);
    assert_eq!(w.vault.received_reports().len(), 1);
}

#[tokio::test]
async fn empty_harvest_is_a_safe_noop() {
    let mut w = world(1_000, None);

    let report = w.harvester.harvest().await.unwrap();

    assert!(report.is_empty());
    // No claims, no swaps: only the no-op checks touched the venues
    assert_eq!(w.gauge.claim_calls(), 0);
    assert_eq!(w.swap.swap_calls(), 0);
}

#[tokio::test]
async fn loss_is_the_exact_shortfall() {
    let mut w = world(0, None);
    w.gauge.set_staked(Amount::new(900));
    w.vault.set_total_debt(Amount::new(1_000));

    let report = w.harvester.harvest().await.unwrap();

    assert_eq!(report.profit, Amount::ZERO);
    assert_eq!(report.loss, Amount::new(100));
}

#[tokio::test]
async fn debt_service_liquidates_from_gauge() {
    let mut w = world(0, None);
    w.bank.set_balance(&asset("WANT"), Amount::new(100));
    w.gauge.set_staked(Amount::new(900));
    w.vault.set_total_debt(Amount::new(1_000));
    w.vault.set_debt_outstanding(Amount::new(300));

    let report = w.harvester.harvest().await.unwrap();

    assert_eq!(report.debt_payment, Amount::new(300));
    assert_eq!(report.profit, Amount::ZERO);
    assert_eq!(report.loss, Amount::ZERO);
    // 200 came out of the gauge to top idle up to 300
    assert_eq!(w.gauge.staked_balance().await.unwrap(), Amount::new(700));
    assert_eq!(w.vault.debt_outstanding().await.unwrap(), Amount::ZERO);
}

#[tokio::test]
async fn profit_beyond_idle_unwinds_the_position() {
    let mut w = world(0, None);
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
    w.vault.set_total_debt(Amount::new(1_000));
    w.vault.set_debt_outstanding(Amount::new(50));

    let report = w.harvester.harvest().await.unwrap();

    // 100 converted want covers the 50 debt payment, but profit (100)
    // plus the payment exceeds idle, so everything was recalled.
    assert_eq!(report.profit, Amount::new(100));
    assert_eq!(report.debt_payment, Amount::new(50));
    assert_eq!(w.gauge.staked_balance().await.unwrap(), Amount::ZERO);
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(1_100));
}

#[tokio::test]
async fn secondary_reward_uses_split_routing() {
    let mut w = world(1_000, Some("CVX"));
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
    w.gauge.set_pending_reward(&asset("CVX"), Amount::new(50));
    w.vault.set_total_debt(Amount::new(1_000));

    let report = w.harvester.harvest().await.unwrap();

    // Three conversion calls: CRV leg, CVX direct, WETH leg
    assert_eq!(w.swap.swap_calls(), 3);
    // 90 via the route plus the full 50 secondary, all into want
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(140));
    assert_eq!(w.bank.balance(&asset("WETH")), Amount::ZERO);
    assert_eq!(w.bank.balance(&asset("CVX")), Amount::ZERO);
    assert_eq!(report.profit, Amount::new(140));
}

#[tokio::test]
async fn full_keep_rate_still_converts_secondary() {
    let mut w = world(10_000, Some("CVX"));
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
    w.gauge.set_pending_reward(&asset("CVX"), Amount::new(50));
    w.vault.set_total_debt(Amount::new(1_000));

    let report = w.harvester.harvest().await.unwrap();

    // Everything retained, nothing convertible from the primary; the
    // secondary still converts in full.
    assert_eq!(w.swap.swap_calls(), 1);
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(50));
    assert_eq!(report.profit, Amount::new(50));
}

#[tokio::test]
async fn secondary_converts_when_primary_claim_is_empty() {
    let mut w = world(1_000, Some("CVX"));
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CVX"), Amount::new(50));
    w.vault.set_total_debt(Amount::new(1_000));

    let report = w.harvester.harvest().await.unwrap();

    // No primary accrued this cycle: only the direct secondary swap
    // runs, and nothing stays stranded in the reward asset.
    assert_eq!(w.swap.swap_calls(), 1);
    assert_eq!(w.bank.balance(&asset("CVX")), Amount::ZERO);
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(50));
    assert_eq!(report.profit, Amount::new(50));
}

#[tokio::test]
async fn slippage_aborts_the_harvest_with_state_untouched() {
    let mut w = world(0, None);
    w.gauge.set_staked(Amount::new(1_000));
    w.gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
    w.vault.set_total_debt(Amount::new(1_000));
    // Route produces zero output
    w.swap.set_rate(&asset("CRV"), &asset("WETH"), 0, 1);
    w.harvester.set_force_harvest_once(&w.governance).unwrap();

    let result = w.harvester.harvest().await;

    assert!(matches!(result, Err(StrategyError::Slippage { .. })));
    // The failed invocation committed nothing it owns
    assert!(w.harvester.trigger_state().force_harvest_once);
    assert!(w.vault.received_reports().is_empty());
}

#[tokio::test]
async fn force_flag_clears_even_on_a_loss_harvest() {
    let mut w = world(0, None);
    w.gauge.set_staked(Amount::new(900));
    w.vault.set_total_debt(Amount::new(1_000));
    w.harvester.set_force_harvest_once(&w.governance).unwrap();

    let report = w.harvester.harvest().await.unwrap();

    assert_eq!(report.loss, Amount::new(100));
    assert!(!w.harvester.trigger_state().force_harvest_once);
}

#[tokio::test]
async fn invest_idle_respects_emergency_exit() {
    let w = world(0, None);
    w.bank.set_balance(&asset("WANT"), Amount::new(500));
    w.vault.set_emergency_exit(true);

    assert_eq!(w.harvester.invest_idle().await.unwrap(), Amount::ZERO);
    assert_eq!(w.bank.balance(&asset("WANT")), Amount::new(500));

    w.vault.set_emergency_exit(false);
    assert_eq!(w.harvester.invest_idle().await.unwrap(), Amount::new(500));
    assert_eq!(w.gauge.staked_balance().await.unwrap(), Amount::new(500));
}

#[tokio::test]
async fn trigger_reads_elapsed_from_vault_report() {
    let w = world(0, None);
    w.vault
        .set_last_report(Utc::now() - chrono::Duration::days(8));

    // Past the 7d max delay: triggers even on unacceptable gas
    let decision = w.harvester.harvest_trigger(Utc::now(), false).await.unwrap();
    assert_eq!(decision, Some(TriggerReason::MaxDelayExceeded));

    // Fresh report, nothing due
    w.vault.set_last_report(Utc::now());
    let decision = w.harvester.harvest_trigger(Utc::now(), true).await.unwrap();
    assert_eq!(decision, None);
}

#[tokio::test]
async fn setters_require_the_governance_capability() {
    let mut w = world(0, None);
    let wrong_key = GovernanceKey::generate();

    let result = w.harvester.set_keep_bps(&wrong_key, bps(500));
    assert!(matches!(result, Err(StrategyError::Unauthorized(_))));

    w.harvester.set_keep_bps(&w.governance, bps(500)).unwrap();
    assert_eq!(w.harvester.config().reward.keep_bps, bps(500));

    // Route replacement re-validates endpoints
    let bad_route = ConversionRoute::new(vec![Hop::new(
        asset("CVX"),
        asset("WANT"),
        FeeTier::new(3_000).unwrap(),
    )
    .unwrap()])
    .unwrap();
    let result = w
        .harvester
        .set_conversion_route(&w.governance, bad_route);
    assert!(matches!(result, Err(StrategyError::Configuration(_))));
}
