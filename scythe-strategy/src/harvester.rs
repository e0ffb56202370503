//! Harvest Orchestrator: the per-cycle state machine.
//!
//! One `harvest()` invocation runs the strict sequence: claim rewards →
//! split and convert → leave converted want idle → service outstanding
//! debt → compute profit/loss against recorded debt → clear the force
//! flag and report. The order is load-bearing: claiming before
//! distributing keeps the retention share carved out of gross rewards,
//! and profit/loss is computed only after every balance-changing step
//! has settled.
//!
//! No harvester-owned state is mutated until every collaborator call
//! has succeeded, so a failed invocation leaves the force flag and the
//! configuration exactly as they were (the host's all-or-nothing model,
//! rendered as commit-at-the-end structure).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use scythe_domain::{
    should_harvest, split_reward, Amount, Asset, BasisPoints, ConversionRoute, FeeTier,
    HarvestReport, Position, TriggerContext, TriggerReason, TriggerState,
};

use crate::config::{GovernanceKey, StrategyConfig};
use crate::error::{StrategyError, StrategyResult};
use crate::ledger::PositionLedger;
use crate::ports::{GaugePort, Recipient, SwapPort, TokenPort, VaultPort};
use crate::rebalancer::Rebalancer;

/// Minimum acceptable output for any conversion call.
///
/// The design tolerates high slippage by default but never a literal
/// zero output.
const MIN_SWAP_OUT: Amount = Amount::new(1);

// =============================================================================
// Harvester
// =============================================================================

/// The top-level strategy object: owns configuration and trigger state,
/// drives the harvest cycle through the collaborator ports.
pub struct Harvester<V, G, S, T>
where
    V: VaultPort,
    G: GaugePort,
    S: SwapPort,
    T: TokenPort,
{
    vault: Arc<V>,
    gauge: Arc<G>,
    swap: Arc<S>,
    token: Arc<T>,
    rebalancer: Rebalancer<G, T>,
    governance: GovernanceKey,
    config: StrategyConfig,
    trigger: TriggerState,
}

impl<V, G, S, T> Harvester<V, G, S, T>
where
    V: VaultPort,
    G: GaugePort,
    S: SwapPort,
    T: TokenPort,
{
    /// Create a configured harvester. One instance per deployment.
    pub fn new(
        vault: Arc<V>,
        gauge: Arc<G>,
        swap: Arc<S>,
        token: Arc<T>,
        governance: GovernanceKey,
        config: StrategyConfig,
        trigger: TriggerState,
    ) -> Self {
        let rebalancer = Rebalancer::new(gauge.clone(), token.clone(), config.want.clone());
        Self {
            vault,
            gauge,
            swap,
            token,
            rebalancer,
            governance,
            config,
            trigger,
        }
    }

    /// The position ledger view.
    pub fn ledger(&self) -> &PositionLedger<G, T> {
        self.rebalancer.ledger()
    }

    /// The capital rebalancer.
    pub fn rebalancer(&self) -> &Rebalancer<G, T> {
        &self.rebalancer
    }

    /// Current strategy configuration.
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Current trigger parameters.
    pub fn trigger_state(&self) -> TriggerState {
        self.trigger
    }

    /// Current position snapshot.
    pub async fn position(&self) -> StrategyResult<Position> {
        self.ledger().snapshot().await
    }

    // -------------------------------------------------------------------------
    // Trigger policy
    // -------------------------------------------------------------------------

    /// Evaluate the trigger policy for the external scheduler.
    ///
    /// Elapsed time is measured from the vault's last report timestamp;
    /// the gas signal comes from the caller so the policy itself stays
    /// a pure decision.
    pub async fn harvest_trigger(
        &self,
        now: DateTime<Utc>,
        gas_acceptable: bool,
    ) -> StrategyResult<Option<TriggerReason>> {
        let record = self.vault.recorded_debt().await?;
        let elapsed = (now - record.last_report)
            .to_std()
            .unwrap_or_default();
        let ctx = TriggerContext {
            elapsed,
            state: self.trigger,
            gas_acceptable,
        };
        Ok(should_harvest(&ctx))
    }

    // -------------------------------------------------------------------------
    // Harvest cycle
    // -------------------------------------------------------------------------

    /// Run one full harvest cycle and report to the vault.
    ///
    /// Idempotent when there is nothing to do: with zero balances the
    /// cycle makes no venue calls beyond the no-op checks and reports
    /// all-zero figures.
    #[instrument(skip(self))]
    pub async fn harvest(&mut self) -> StrategyResult<HarvestReport> {
        // 1. Claim: only a funded gauge accrues rewards.
        let staked = self.ledger().staked_balance().await?;
        if !staked.is_zero() {
            self.claim_rewards().await?;
        }

        // 2. Distribute and convert the claimed rewards. Runs even on a
        // zero primary claim: a configured secondary reward converts on
        // its own balance, never on the primary's.
        let claimed = self.token.balance_of(&self.config.primary_reward).await?;
        self.distribute_and_convert(claimed).await?;

        // 3. Converted want is already idle; nothing is redeposited here.

        // 4. Debt service.
        let debt_outstanding = self.vault.debt_outstanding().await?;
        let debt_payment = if debt_outstanding.is_zero() {
            Amount::ZERO
        } else {
            let outcome = self.rebalancer.liquidate(debt_outstanding).await?;
            outcome.liquidated
        };

        // 5. Profit/loss against the vault's recorded debt, computed
        // only now that every balance-changing step has settled.
        let assets = self.ledger().estimated_total_assets().await?;
        let debt = self.vault.recorded_debt().await?.total_debt;
        let (profit, loss) = if assets > debt {
            (assets.checked_sub(debt)?, Amount::ZERO)
        } else {
            (Amount::ZERO, debt.checked_sub(assets)?)
        };

        if !profit.is_zero() {
            // Figures are realized in idle want. If profit plus the
            // debt payment cannot be covered from idle, unwind the
            // whole position (existing behavior, deliberately more
            // aggressive than minimally necessary).
            let required = profit.checked_add(debt_payment)?;
            let idle = self.ledger().idle_balance().await?;
            if required > idle {
                warn!(%required, %idle, "Unwinding full position to realize harvest figures");
                self.rebalancer.liquidate_all().await?;
            }
        }

        // 6. Report, then clear the one-shot force flag. The flag is
        // only touched once every collaborator call has succeeded.
        let report = HarvestReport::new(profit, loss, debt_payment);
        self.vault.report_harvest(&report).await?;
        self.trigger.force_harvest_once = false;

        info!(
            profit = %report.profit,
            loss = %report.loss,
            debt_payment = %report.debt_payment,
            "Harvest complete"
        );
        Ok(report)
    }

    /// Redeploy idle want into the gauge, honoring emergency exit.
    ///
    /// Runs after a harvest's report, never inside the cycle itself.
    pub async fn invest_idle(&self) -> StrategyResult<Amount> {
        let emergency_exit = self.vault.emergency_exit().await?;
        self.rebalancer.invest_idle(emergency_exit).await
    }

    async fn claim_rewards(&self) -> StrategyResult<()> {
        self.gauge.claim_rewards().await?;
        if let Some(secondary) = self.config.reward.secondary_reward.clone() {
            self.gauge.claim_secondary(&secondary).await?;
        }
        Ok(())
    }

    /// Split the claimed reward, ship the retained share, convert the
    /// rest into want.
    async fn distribute_and_convert(&self, claimed: Amount) -> StrategyResult<()> {
        let split = split_reward(claimed, self.config.reward.keep_bps)?;
        debug!(
            claimed = %claimed,
            retained = %split.retained,
            convertible = %split.convertible,
            "Applying reward distribution policy"
        );

        if !split.retained.is_zero() {
            self.token
                .transfer(
                    &self.config.primary_reward,
                    &self.config.retention_destination,
                    split.retained,
                )
                .await?;
        }

        // Deadline equals now: the conversion must execute atomically,
        // not rest as a pending order.
        let deadline = Utc::now();

        match self.config.reward.secondary_reward.clone() {
            None => {
                if !split.convertible.is_zero() {
                    self.swap
                        .swap_exact_input(
                            &self.config.conversion_route,
                            split.convertible,
                            MIN_SWAP_OUT,
                            deadline,
                        )
                        .await?;
                }
            }
            Some(secondary) => {
                // Secondary liquidity is deeper on a different venue,
                // so the primary stops at the intermediate and the legs
                // settle separately.
                let (primary_leg, intermediate_leg) = self.config.route_legs()?;
                if !split.convertible.is_zero() {
                    self.swap
                        .swap_exact_input(&primary_leg, split.convertible, MIN_SWAP_OUT, deadline)
                        .await?;
                }
                let secondary_balance = self.token.balance_of(&secondary).await?;
                if !secondary_balance.is_zero() {
                    self.swap
                        .swap_direct(
                            &secondary,
                            &self.config.want,
                            self.config.secondary_fee_tier,
                            secondary_balance,
                            MIN_SWAP_OUT,
                            deadline,
                        )
                        .await?;
                }
                let intermediate_balance =
                    self.token.balance_of(&self.config.intermediate).await?;
                if !intermediate_balance.is_zero() {
                    self.swap
                        .swap_exact_input(
                            &intermediate_leg,
                            intermediate_balance,
                            MIN_SWAP_OUT,
                            deadline,
                        )
                        .await?;
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Governance-gated setters
    // -------------------------------------------------------------------------

    fn authorize(&self, key: &GovernanceKey) -> StrategyResult<()> {
        if key != &self.governance {
            return Err(StrategyError::Unauthorized(
                "Governance key mismatch".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the reward keep rate.
    pub fn set_keep_bps(&mut self, key: &GovernanceKey, keep_bps: BasisPoints) -> StrategyResult<()> {
        self.authorize(key)?;
        self.config.reward.keep_bps = keep_bps;
        Ok(())
    }

    /// Register or clear the secondary reward asset.
    pub fn set_secondary_reward(
        &mut self,
        key: &GovernanceKey,
        secondary: Option<Asset>,
    ) -> StrategyResult<()> {
        self.authorize(key)?;
        if let Some(asset) = &secondary {
            if asset == &self.config.want || asset == &self.config.primary_reward {
                return Err(StrategyError::Configuration(format!(
                    "Secondary reward {} collides with a core asset",
                    asset
                )));
            }
        }
        self.config.reward.secondary_reward = secondary;
        Ok(())
    }

    /// Replace the conversion route (re-validated against the assets).
    pub fn set_conversion_route(
        &mut self,
        key: &GovernanceKey,
        route: ConversionRoute,
    ) -> StrategyResult<()> {
        self.authorize(key)?;
        self.config.validate_route(&route)?;
        self.config.conversion_route = route;
        Ok(())
    }

    /// Set the direct-venue fee tier for the secondary reward swap.
    pub fn set_secondary_fee_tier(
        &mut self,
        key: &GovernanceKey,
        fee_tier: FeeTier,
    ) -> StrategyResult<()> {
        self.authorize(key)?;
        self.config.secondary_fee_tier = fee_tier;
        Ok(())
    }

    /// Redirect the retained reward share.
    pub fn set_retention_destination(
        &mut self,
        key: &GovernanceKey,
        destination: Recipient,
    ) -> StrategyResult<()> {
        self.authorize(key)?;
        self.config.retention_destination = destination;
        Ok(())
    }

    /// Arm the one-shot force flag for the next eligible harvest.
    pub fn set_force_harvest_once(&mut self, key: &GovernanceKey) -> StrategyResult<()> {
        self.authorize(key)?;
        self.trigger.force_harvest_once = true;
        Ok(())
    }

    /// Replace the trigger delays, preserving the force flag.
    pub fn set_trigger_delays(
        &mut self,
        key: &GovernanceKey,
        min_delay: std::time::Duration,
        max_delay: std::time::Duration,
    ) -> StrategyResult<()> {
        self.authorize(key)?;
        let force = self.trigger.force_harvest_once;
        let mut state = TriggerState::new(min_delay, max_delay)?;
        state.force_harvest_once = force;
        self.trigger = state;
        Ok(())
    }
}
