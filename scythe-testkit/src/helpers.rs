//! Builders for a stubbed strategy world.

use std::sync::Arc;
use std::time::Duration;

use scythe_domain::{
    Amount, Asset, BasisPoints, ConversionRoute, FeeTier, Hop, RewardConfig, TriggerState,
};
use scythe_strategy::{
    GovernanceKey, Harvester, Recipient, StrategyConfig, StubBank, StubGasOracle, StubGauge,
    StubSwap, StubVault,
};

/// A ready-to-harvest stub world.
///
/// All venue knobs stay reachable through the `Arc` handles while the
/// harvester drives them.
pub struct HarvestWorld {
    /// Shared token balances of the strategy
    pub bank: Arc<StubBank>,
    /// Stub staking venue
    pub gauge: Arc<StubGauge>,
    /// Stub swap venue
    pub swap: Arc<StubSwap>,
    /// Stub vault ledger
    pub vault: Arc<StubVault>,
    /// Stub gas signal
    pub gas_oracle: Arc<StubGasOracle>,
    /// Governance capability matching the harvester
    pub governance: GovernanceKey,
    /// The harvester under test
    pub harvester: Harvester<StubVault, StubGauge, StubSwap, StubBank>,
}

/// Builder with defaults: WANT strategy farming CRV through WETH, 10%
/// keep rate, 1d/7d trigger delays, acceptable gas.
pub struct HarvestWorldBuilder {
    keep_bps: u16,
    secondary_reward: Option<Asset>,
    staked: Amount,
    idle: Amount,
    pending_primary: Amount,
    total_debt: Amount,
    min_delay: Duration,
    max_delay: Duration,
    gas_acceptable: bool,
}

impl HarvestWorldBuilder {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self {
            keep_bps: 1_000,
            secondary_reward: None,
            staked: Amount::ZERO,
            idle: Amount::ZERO,
            pending_primary: Amount::ZERO,
            total_debt: Amount::ZERO,
            min_delay: Duration::from_secs(86_400),
            max_delay: Duration::from_secs(7 * 86_400),
            gas_acceptable: true,
        }
    }

    /// Set the reward keep rate.
    pub fn keep_bps(mut self, bps: u16) -> Self {
        self.keep_bps = bps;
        self
    }

    /// Register a secondary reward asset.
    pub fn secondary_reward(mut self, ticker: &str) -> Self {
        self.secondary_reward = Some(Asset::new(ticker).expect("valid ticker"));
        self
    }

    /// Seed the staked balance.
    pub fn staked(mut self, amount: u128) -> Self {
        self.staked = Amount::new(amount);
        self
    }

    /// Seed the idle want balance.
    pub fn idle(mut self, amount: u128) -> Self {
        self.idle = Amount::new(amount);
        self
    }

    /// Queue a pending primary reward at the gauge.
    pub fn pending_primary(mut self, amount: u128) -> Self {
        self.pending_primary = Amount::new(amount);
        self
    }

    /// Seed the vault's recorded debt.
    pub fn total_debt(mut self, amount: u128) -> Self {
        self.total_debt = Amount::new(amount);
        self
    }

    /// Override the trigger delays.
    pub fn delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Set the initial gas signal.
    pub fn gas_acceptable(mut self, acceptable: bool) -> Self {
        self.gas_acceptable = acceptable;
        self
    }

    /// Assemble the world.
    pub fn build(self) -> HarvestWorld {
        let want = Asset::new("WANT").expect("valid ticker");
        let primary = Asset::new("CRV").expect("valid ticker");
        let intermediate = Asset::new("WETH").expect("valid ticker");

        let bank = Arc::new(StubBank::new());
        let gauge = Arc::new(StubGauge::new(bank.clone(), want.clone(), primary.clone()));
        let swap = Arc::new(StubSwap::new(bank.clone()));
        let vault = Arc::new(StubVault::new());
        let gas_oracle = Arc::new(StubGasOracle::new(self.gas_acceptable));
        let governance = GovernanceKey::generate();

        bank.set_balance(&want, self.idle);
        gauge.set_staked(self.staked);
        if !self.pending_primary.is_zero() {
            gauge.set_pending_reward(&primary, self.pending_primary);
        }
        vault.set_total_debt(self.total_debt);

        let keep = BasisPoints::new(self.keep_bps).expect("valid keep rate");
        let reward = match self.secondary_reward {
            None => RewardConfig::new(keep),
            Some(secondary) => RewardConfig::with_secondary_reward(keep, secondary),
        };
        let route = ConversionRoute::new(vec![
            Hop::new(
                primary.clone(),
                intermediate.clone(),
                FeeTier::new(3_000).expect("valid fee"),
            )
            .expect("valid hop"),
            Hop::new(intermediate, want.clone(), FeeTier::new(500).expect("valid fee"))
                .expect("valid hop"),
        ])
        .expect("valid route");
        let config = StrategyConfig::new(
            want,
            primary,
            Asset::new("WETH").expect("valid ticker"),
            reward,
            Recipient::new("treasury").expect("valid recipient"),
            route,
            FeeTier::new(3_000).expect("valid fee"),
        )
        .expect("valid config");
        let trigger =
            TriggerState::new(self.min_delay, self.max_delay).expect("valid trigger state");

        let harvester = Harvester::new(
            vault.clone(),
            gauge.clone(),
            swap.clone(),
            bank.clone(),
            governance.clone(),
            config,
            trigger,
        );

        HarvestWorld {
            bank,
            gauge,
            swap,
            vault,
            gas_oracle,
            governance,
            harvester,
        }
    }
}

impl Default for HarvestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_world_harvests_cleanly() {
        let mut world = HarvestWorldBuilder::new()
            .staked(1_000)
            .pending_primary(100)
            .total_debt(1_000)
            .build();

        let report = world.harvester.harvest().await.unwrap();
        assert_eq!(report.profit, Amount::new(90));
    }
}
