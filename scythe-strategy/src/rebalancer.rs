//! Capital Rebalancer: deposit/withdraw movement with honest losses.
//!
//! Moves idle funds into the gauge and recalls staked funds to satisfy
//! withdrawal demand. A shortfall is a first-class return value, never
//! an error and never silently absorbed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use scythe_domain::{Amount, Asset};

use crate::error::StrategyResult;
use crate::ledger::PositionLedger;
use crate::ports::{GaugePort, TokenPort};

// =============================================================================
// LiquidationOutcome
// =============================================================================

/// Result of recalling funds to satisfy a withdrawal request.
///
/// # Invariants
/// - `liquidated + loss == amount requested`, always
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Idle want actually produced toward the request
    pub liquidated: Amount,
    /// Shortfall that could not be produced from available balances
    pub loss: Amount,
}

// =============================================================================
// Rebalancer
// =============================================================================

/// Moves capital between idle balance and the gauge.
pub struct Rebalancer<G: GaugePort, T: TokenPort> {
    gauge: Arc<G>,
    ledger: PositionLedger<G, T>,
}

impl<G: GaugePort, T: TokenPort> Rebalancer<G, T> {
    /// Create a rebalancer over the given ports.
    pub fn new(gauge: Arc<G>, token: Arc<T>, want: Asset) -> Self {
        let ledger = PositionLedger::new(gauge.clone(), token, want);
        Self { gauge, ledger }
    }

    /// The ledger this rebalancer reads balances through.
    pub fn ledger(&self) -> &PositionLedger<G, T> {
        &self.ledger
    }

    /// Deposit the entire idle balance into the gauge.
    ///
    /// No-op when idle is zero or the vault has signalled emergency
    /// exit. Returns the amount deposited.
    pub async fn invest_idle(&self, emergency_exit: bool) -> StrategyResult<Amount> {
        if emergency_exit {
            debug!("Emergency exit set, leaving idle balance unstaked");
            return Ok(Amount::ZERO);
        }
        let idle = self.ledger.idle_balance().await?;
        if idle.is_zero() {
            return Ok(Amount::ZERO);
        }
        self.gauge.deposit(idle).await?;
        info!(amount = %idle, "Deposited idle balance into gauge");
        Ok(idle)
    }

    /// Produce up to `amount_needed` of idle want.
    ///
    /// If idle already covers the request, returns it with no venue
    /// interaction. Otherwise withdraws
    /// `min(staked, amount_needed - idle)` from the gauge, recomputes
    /// idle, and reports the remainder as loss.
    pub async fn liquidate(&self, amount_needed: Amount) -> StrategyResult<LiquidationOutcome> {
        let idle = self.ledger.idle_balance().await?;
        if idle >= amount_needed {
            return Ok(LiquidationOutcome {
                liquidated: amount_needed,
                loss: Amount::ZERO,
            });
        }

        let staked = self.ledger.staked_balance().await?;
        let shortfall = amount_needed.saturating_sub(idle);
        let to_withdraw = staked.min(shortfall);
        if !to_withdraw.is_zero() {
            self.gauge.withdraw(to_withdraw).await?;
        }

        // Recompute rather than trusting the venue's return value; the
        // gauge may credit less than requested.
        let new_idle = self.ledger.idle_balance().await?;
        let liquidated = amount_needed.min(new_idle);
        let loss = amount_needed.saturating_sub(liquidated);
        if !loss.is_zero() {
            info!(requested = %amount_needed, produced = %liquidated, %loss, "Liquidation shortfall");
        }
        Ok(LiquidationOutcome { liquidated, loss })
    }

    /// Withdraw the entire staked balance.
    ///
    /// Skips the venue call when nothing is staked. Returns the
    /// resulting idle balance. Used for full exit and migration.
    pub async fn liquidate_all(&self) -> StrategyResult<Amount> {
        let staked = self.ledger.staked_balance().await?;
        if !staked.is_zero() {
            self.gauge.withdraw(staked).await?;
            info!(amount = %staked, "Withdrew full staked balance");
        }
        self.ledger.idle_balance().await
    }
}

impl<G: GaugePort, T: TokenPort> Clone for Rebalancer<G, T> {
    fn clone(&self) -> Self {
        Self {
            gauge: self.gauge.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{StubBank, StubGauge};

    fn want() -> Asset {
        Asset::new("WANT").unwrap()
    }

    fn crv() -> Asset {
        Asset::new("CRV").unwrap()
    }

    fn rebalancer(
        idle: u128,
        staked: u128,
    ) -> (Arc<StubBank>, Arc<StubGauge>, Rebalancer<StubGauge, StubBank>) {
        let bank = Arc::new(StubBank::new());
        bank.set_balance(&want(), Amount::new(idle));
        let gauge = Arc::new(StubGauge::new(bank.clone(), want(), crv()));
        gauge.set_staked(Amount::new(staked));
        let rebalancer = Rebalancer::new(gauge.clone(), bank.clone(), want());
        (bank, gauge, rebalancer)
    }

    #[tokio::test]
    async fn test_liquidate_covered_by_idle_skips_venue() {
        let (_bank, gauge, rebalancer) = rebalancer(500, 1_000);
        let outcome = rebalancer.liquidate(Amount::new(400)).await.unwrap();
        assert_eq!(outcome.liquidated, Amount::new(400));
        assert_eq!(outcome.loss, Amount::ZERO);
        // No withdrawal happened
        assert_eq!(gauge.staked_balance().await.unwrap(), Amount::new(1_000));
    }

    #[tokio::test]
    async fn test_liquidate_pulls_from_gauge() {
        let (bank, _gauge, rebalancer) = rebalancer(100, 1_000);
        let outcome = rebalancer.liquidate(Amount::new(600)).await.unwrap();
        assert_eq!(outcome.liquidated, Amount::new(600));
        assert_eq!(outcome.loss, Amount::ZERO);
        assert_eq!(bank.balance(&want()), Amount::new(600));
    }

    #[tokio::test]
    async fn test_liquidate_reports_shortfall_exactly() {
        // idle 100 + staked 300 cannot cover 1000
        let (_bank, _gauge, rebalancer) = rebalancer(100, 300);
        let outcome = rebalancer.liquidate(Amount::new(1_000)).await.unwrap();
        assert_eq!(outcome.liquidated, Amount::new(400));
        assert_eq!(outcome.loss, Amount::new(600));
        assert_eq!(
            outcome.liquidated.checked_add(outcome.loss).unwrap(),
            Amount::new(1_000)
        );
    }

    #[tokio::test]
    async fn test_liquidate_accounts_for_withdraw_haircut() {
        let (_bank, gauge, rebalancer) = rebalancer(0, 1_000);
        // Venue credits 1% less than requested
        gauge.set_withdraw_haircut_bps(100);
        let outcome = rebalancer.liquidate(Amount::new(1_000)).await.unwrap();
        assert_eq!(outcome.liquidated, Amount::new(990));
        assert_eq!(outcome.loss, Amount::new(10));
    }

    #[tokio::test]
    async fn test_liquidate_all_returns_idle() {
        let (_bank, gauge, rebalancer) = rebalancer(50, 950);
        let idle = rebalancer.liquidate_all().await.unwrap();
        assert_eq!(idle, Amount::new(1_000));
        assert_eq!(gauge.staked_balance().await.unwrap(), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_liquidate_all_skips_empty_gauge() {
        let (_bank, gauge, rebalancer) = rebalancer(75, 0);
        gauge.set_fail_next(true); // would fail if touched
        let idle = rebalancer.liquidate_all().await.unwrap();
        assert_eq!(idle, Amount::new(75));
    }

    #[tokio::test]
    async fn test_invest_idle_deposits_everything() {
        let (bank, gauge, rebalancer) = rebalancer(800, 0);
        let deposited = rebalancer.invest_idle(false).await.unwrap();
        assert_eq!(deposited, Amount::new(800));
        assert_eq!(bank.balance(&want()), Amount::ZERO);
        assert_eq!(gauge.staked_balance().await.unwrap(), Amount::new(800));
    }

    #[tokio::test]
    async fn test_invest_idle_noop_under_emergency_exit() {
        let (bank, _gauge, rebalancer) = rebalancer(800, 0);
        let deposited = rebalancer.invest_idle(true).await.unwrap();
        assert_eq!(deposited, Amount::ZERO);
        assert_eq!(bank.balance(&want()), Amount::new(800));
    }

    #[tokio::test]
    async fn test_invest_idle_noop_when_empty() {
        let (_bank, gauge, rebalancer) = rebalancer(0, 0);
        gauge.set_fail_next(true); // would fail if touched
        let deposited = rebalancer.invest_idle(false).await.unwrap();
        assert_eq!(deposited, Amount::ZERO);
    }
}
