//! Keeper loop integration tests.
//!
//! Exercises one keeper tick at a time against a stubbed strategy
//! world: trigger evaluation, the harvest cycle it drives, and the
//! reinvestment that follows.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use scythe_domain::{Amount, Asset};
use scythe_strategy::GaugePort;
use scythe_testkit::HarvestWorldBuilder;
use scythed::Keeper;

fn poll() -> Duration {
    Duration::from_millis(10)
}

#[tokio::test]
async fn keeper_waits_while_the_report_is_fresh() {
    let w = HarvestWorldBuilder::new()
        .staked(1_000)
        .pending_primary(100)
        .total_debt(1_000)
        .build();
    let keeper = Keeper::new(
        Arc::new(RwLock::new(w.harvester)),
        w.gas_oracle.clone(),
        poll(),
    );

    // Vault reported at construction time, well inside the min delay
    let outcome = keeper.tick().await.unwrap();

    assert_eq!(outcome, None);
    assert!(w.vault.received_reports().is_empty());
    let last = keeper.last_report();
    assert!(last.read().await.is_none());
}

#[tokio::test]
async fn keeper_harvests_once_the_min_delay_elapses() {
    let w = HarvestWorldBuilder::new()
        .staked(1_000)
        .pending_primary(100)
        .total_debt(1_000)
        .build();
    w.vault.set_last_report(Utc::now() - chrono::Duration::days(2));

    let keeper = Keeper::new(
        Arc::new(RwLock::new(w.harvester)),
        w.gas_oracle.clone(),
        poll(),
    );

    let report = keeper.tick().await.unwrap().expect("harvest should run");

    // 100 CRV claimed, 10% kept, remainder converted 1:1 through WETH
    assert_eq!(report.profit, Amount::new(90));
    assert_eq!(report.loss, Amount::ZERO);

    // Reinvestment staked the fresh want
    let staked = w.gauge.staked_balance().await.unwrap();
    assert_eq!(staked, Amount::new(1_090));
    let want = Asset::new("WANT").unwrap();
    assert!(w.bank.balance(&want).is_zero());

    // The report is published for the API
    let last = keeper.last_report();
    assert_eq!(last.read().await.as_ref().map(|r| r.id), Some(report.id));
}

#[tokio::test]
async fn keeper_defers_on_gas_until_the_deadline() {
    let w = HarvestWorldBuilder::new()
        .staked(1_000)
        .pending_primary(100)
        .total_debt(1_000)
        .gas_acceptable(false)
        .build();
    w.vault.set_last_report(Utc::now() - chrono::Duration::days(2));

    let keeper = Keeper::new(
        Arc::new(RwLock::new(w.harvester)),
        w.gas_oracle.clone(),
        poll(),
    );

    // Past min delay but gas is too high
    assert_eq!(keeper.tick().await.unwrap(), None);

    // Past the absolute deadline the gas signal no longer matters
    w.vault.set_last_report(Utc::now() - chrono::Duration::days(8));
    let report = keeper.tick().await.unwrap().expect("deadline harvest");
    assert_eq!(report.profit, Amount::new(90));
}

#[tokio::test]
async fn keeper_retries_after_a_failing_venue() {
    let w = HarvestWorldBuilder::new()
        .staked(1_000)
        .pending_primary(100)
        .total_debt(1_000)
        .build();
    w.vault.set_last_report(Utc::now() - chrono::Duration::days(2));
    w.gauge.set_fail_next(true);

    let keeper = Keeper::new(
        Arc::new(RwLock::new(w.harvester)),
        w.gas_oracle.clone(),
        poll(),
    );

    // First tick hits the injected failure and reports nothing
    assert!(keeper.tick().await.is_err());
    assert!(w.vault.received_reports().is_empty());

    // Next tick finds the venue healthy again
    let report = keeper.tick().await.unwrap().expect("retry harvest");
    assert_eq!(report.profit, Amount::new(90));
    assert_eq!(w.vault.received_reports().len(), 1);
}
