//! Stub implementations for testing.
//!
//! These implementations simulate the vault, gauge and swap venues
//! without any chain interaction. A shared `StubBank` plays the role of
//! the strategy's token balances so venue stubs can move value the way
//! the real venues would.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use scythe_domain::{
    Amount, Asset, ConversionRoute, DebtRecord, FeeTier, HarvestReport,
};

use crate::error::{StrategyError, StrategyResult};
use crate::ports::{GasOraclePort, GaugePort, Recipient, SwapPort, TokenPort, VaultPort};

// =============================================================================
// Stub Bank
// =============================================================================

/// Shared token balances for the stubbed strategy.
///
/// Implements `TokenPort`; the venue stubs hold an `Arc` to the same
/// bank and credit/debit it as swaps, deposits and claims happen.
pub struct StubBank {
    /// Balances by asset ticker
    balances: RwLock<HashMap<String, Amount>>,
    /// Outbound transfers, recorded for assertions
    transfers: RwLock<Vec<(Asset, Recipient, Amount)>>,
}

impl StubBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            transfers: RwLock::new(Vec::new()),
        }
    }

    /// Overwrite the balance of an asset.
    pub fn set_balance(&self, asset: &Asset, amount: Amount) {
        let mut balances = self.balances.write().unwrap();
        balances.insert(asset.as_str().to_string(), amount);
    }

    /// Current balance of an asset (zero when unknown).
    pub fn balance(&self, asset: &Asset) -> Amount {
        let balances = self.balances.read().unwrap();
        balances.get(asset.as_str()).copied().unwrap_or(Amount::ZERO)
    }

    /// Add to an asset's balance.
    pub fn credit(&self, asset: &Asset, amount: Amount) {
        let mut balances = self.balances.write().unwrap();
        let entry = balances
            .entry(asset.as_str().to_string())
            .or_insert(Amount::ZERO);
        *entry = entry.checked_add(amount).expect("stub balance overflow");
    }

    /// Remove from an asset's balance.
    pub fn debit(&self, asset: &Asset, amount: Amount) -> StrategyResult<()> {
        let mut balances = self.balances.write().unwrap();
        let entry = balances
            .entry(asset.as_str().to_string())
            .or_insert(Amount::ZERO);
        *entry = entry.checked_sub(amount).map_err(|_| {
            StrategyError::Venue(format!(
                "Insufficient {} balance: have {}, need {}",
                asset, entry, amount
            ))
        })?;
        Ok(())
    }

    /// All transfers made through the `TokenPort`.
    pub fn recorded_transfers(&self) -> Vec<(Asset, Recipient, Amount)> {
        self.transfers.read().unwrap().clone()
    }
}

impl Default for StubBank {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenPort for StubBank {
    async fn balance_of(&self, asset: &Asset) -> StrategyResult<Amount> {
        Ok(self.balance(asset))
    }

    async fn transfer(
        &self,
        asset: &Asset,
        recipient: &Recipient,
        amount: Amount,
    ) -> StrategyResult<()> {
        self.debit(asset, amount)?;
        let mut transfers = self.transfers.write().unwrap();
        transfers.push((asset.clone(), recipient.clone(), amount));
        Ok(())
    }
}

// =============================================================================
// Stub Gauge
// =============================================================================

/// Stub staking venue.
///
/// Tracks a staked balance, accrues configurable pending rewards, and
/// can apply a withdraw haircut to simulate venue-side losses.
pub struct StubGauge {
    bank: Arc<StubBank>,
    want: Asset,
    primary_reward: Asset,
    staked: RwLock<Amount>,
    pending_rewards: RwLock<HashMap<String, Amount>>,
    withdraw_haircut_bps: RwLock<u16>,
    claim_calls: RwLock<u32>,
    fail_next: RwLock<bool>,
}

impl StubGauge {
    /// Create a gauge over the shared bank.
    pub fn new(bank: Arc<StubBank>, want: Asset, primary_reward: Asset) -> Self {
        Self {
            bank,
            want,
            primary_reward,
            staked: RwLock::new(Amount::ZERO),
            pending_rewards: RwLock::new(HashMap::new()),
            withdraw_haircut_bps: RwLock::new(0),
            claim_calls: RwLock::new(0),
            fail_next: RwLock::new(false),
        }
    }

    /// Overwrite the staked balance directly.
    pub fn set_staked(&self, amount: Amount) {
        *self.staked.write().unwrap() = amount;
    }

    /// Queue a pending reward for the next claim.
    pub fn set_pending_reward(&self, asset: &Asset, amount: Amount) {
        let mut pending = self.pending_rewards.write().unwrap();
        pending.insert(asset.as_str().to_string(), amount);
    }

    /// Make withdrawals credit `bps` less than requested.
    ///
    /// Clamped to 10 000 (a full haircut credits nothing).
    pub fn set_withdraw_haircut_bps(&self, bps: u16) {
        *self.withdraw_haircut_bps.write().unwrap() = bps.min(10_000);
    }

    /// Configure the next call to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    /// How many claim calls the gauge has seen.
    pub fn claim_calls(&self) -> u32 {
        *self.claim_calls.read().unwrap()
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false;
        fail
    }

    fn release_pending(&self, asset: &Asset) {
        let pending = {
            let mut map = self.pending_rewards.write().unwrap();
            map.remove(asset.as_str()).unwrap_or(Amount::ZERO)
        };
        if !pending.is_zero() {
            self.bank.credit(asset, pending);
        }
    }
}

#[async_trait]
impl GaugePort for StubGauge {
    async fn staked_balance(&self) -> StrategyResult<Amount> {
        Ok(*self.staked.read().unwrap())
    }

    async fn deposit(&self, amount: Amount) -> StrategyResult<()> {
        if self.should_fail() {
            return Err(StrategyError::Venue("Simulated gauge failure".to_string()));
        }
        self.bank.debit(&self.want, amount)?;
        let mut staked = self.staked.write().unwrap();
        *staked = staked.checked_add(amount)?;
        Ok(())
    }

    async fn withdraw(&self, amount: Amount) -> StrategyResult<Amount> {
        if self.should_fail() {
            return Err(StrategyError::Venue("Simulated gauge failure".to_string()));
        }
        let withdrawn = {
            let mut staked = self.staked.write().unwrap();
            let available = (*staked).min(amount);
            *staked = staked.saturating_sub(available);
            available
        };
        let haircut_bps = u128::from(*self.withdraw_haircut_bps.read().unwrap());
        let credited = Amount::new(
            withdrawn.as_u128() * (10_000 - haircut_bps) / 10_000,
        );
        if !credited.is_zero() {
            self.bank.credit(&self.want, credited);
        }
        Ok(credited)
    }

    async fn claim_rewards(&self) -> StrategyResult<()> {
        if self.should_fail() {
            return Err(StrategyError::Venue("Simulated gauge failure".to_string()));
        }
        *self.claim_calls.write().unwrap() += 1;
        let primary = self.primary_reward.clone();
        self.release_pending(&primary);
        Ok(())
    }

    async fn claim_secondary(&self, asset: &Asset) -> StrategyResult<()> {
        if self.should_fail() {
            return Err(StrategyError::Venue("Simulated gauge failure".to_string()));
        }
        *self.claim_calls.write().unwrap() += 1;
        self.release_pending(asset);
        Ok(())
    }
}

// =============================================================================
// Stub Swap
// =============================================================================

/// Stub swap venue with configurable per-pair rates.
///
/// Rates are (numerator, denominator) pairs applied per hop; unknown
/// pairs convert 1:1. Output below `min_out` surfaces as a slippage
/// error, exactly like a real router's revert.
pub struct StubSwap {
    bank: Arc<StubBank>,
    rates: RwLock<HashMap<(String, String), (u128, u128)>>,
    swap_calls: RwLock<u32>,
    fail_next: RwLock<bool>,
}

impl StubSwap {
    /// Create a swap venue over the shared bank.
    pub fn new(bank: Arc<StubBank>) -> Self {
        Self {
            bank,
            rates: RwLock::new(HashMap::new()),
            swap_calls: RwLock::new(0),
            fail_next: RwLock::new(false),
        }
    }

    /// Set the conversion rate for a pair.
    pub fn set_rate(&self, asset_in: &Asset, asset_out: &Asset, numerator: u128, denominator: u128) {
        let mut rates = self.rates.write().unwrap();
        rates.insert(
            (asset_in.as_str().to_string(), asset_out.as_str().to_string()),
            (numerator, denominator),
        );
    }

    /// Configure the next swap to fail outright.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap() = fail;
    }

    /// How many swap calls the venue has seen.
    pub fn swap_calls(&self) -> u32 {
        *self.swap_calls.read().unwrap()
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false;
        fail
    }

    fn rate(&self, asset_in: &Asset, asset_out: &Asset) -> (u128, u128) {
        let rates = self.rates.read().unwrap();
        rates
            .get(&(asset_in.as_str().to_string(), asset_out.as_str().to_string()))
            .copied()
            .unwrap_or((1, 1))
    }

    fn execute(
        &self,
        asset_in: &Asset,
        asset_out: &Asset,
        pairs: &[(Asset, Asset)],
        amount_in: Amount,
        min_out: Amount,
    ) -> StrategyResult<Amount> {
        if self.should_fail() {
            return Err(StrategyError::Venue("Simulated swap failure".to_string()));
        }
        *self.swap_calls.write().unwrap() += 1;

        let mut out = amount_in.as_u128();
        for (hop_in, hop_out) in pairs {
            let (numerator, denominator) = self.rate(hop_in, hop_out);
            out = out * numerator / denominator;
        }
        let amount_out = Amount::new(out);
        if amount_out < min_out {
            return Err(StrategyError::Slippage {
                asset_in: asset_in.clone(),
                min_out,
                actual: amount_out,
            });
        }
        self.bank.debit(asset_in, amount_in)?;
        self.bank.credit(asset_out, amount_out);
        Ok(amount_out)
    }
}

#[async_trait]
impl SwapPort for StubSwap {
    async fn swap_exact_input(
        &self,
        route: &ConversionRoute,
        amount_in: Amount,
        min_out: Amount,
        _deadline: DateTime<Utc>,
    ) -> StrategyResult<Amount> {
        let pairs: Vec<(Asset, Asset)> = route
            .hops()
            .iter()
            .map(|hop| (hop.asset_in.clone(), hop.asset_out.clone()))
            .collect();
        self.execute(route.input(), route.output(), &pairs, amount_in, min_out)
    }

    async fn swap_direct(
        &self,
        asset_in: &Asset,
        asset_out: &Asset,
        _fee_tier: FeeTier,
        amount_in: Amount,
        min_out: Amount,
        _deadline: DateTime<Utc>,
    ) -> StrategyResult<Amount> {
        let pairs = [(asset_in.clone(), asset_out.clone())];
        self.execute(asset_in, asset_out, &pairs, amount_in, min_out)
    }
}

// =============================================================================
// Stub Vault
// =============================================================================

/// Stub vault ledger.
///
/// Applies a simple debt rule on report: the debt payment and any loss
/// reduce recorded debt, and the report timestamp advances.
pub struct StubVault {
    total_debt: RwLock<Amount>,
    debt_outstanding: RwLock<Amount>,
    emergency_exit: RwLock<bool>,
    last_report: RwLock<DateTime<Utc>>,
    reports: RwLock<Vec<HarvestReport>>,
}

impl StubVault {
    /// Create a vault with zero debt.
    pub fn new() -> Self {
        Self {
            total_debt: RwLock::new(Amount::ZERO),
            debt_outstanding: RwLock::new(Amount::ZERO),
            emergency_exit: RwLock::new(false),
            last_report: RwLock::new(Utc::now()),
            reports: RwLock::new(Vec::new()),
        }
    }

    /// Overwrite recorded debt.
    pub fn set_total_debt(&self, amount: Amount) {
        *self.total_debt.write().unwrap() = amount;
    }

    /// Overwrite the outstanding debt request.
    pub fn set_debt_outstanding(&self, amount: Amount) {
        *self.debt_outstanding.write().unwrap() = amount;
    }

    /// Flip emergency-exit mode.
    pub fn set_emergency_exit(&self, on: bool) {
        *self.emergency_exit.write().unwrap() = on;
    }

    /// Backdate the last report (for trigger tests).
    pub fn set_last_report(&self, at: DateTime<Utc>) {
        *self.last_report.write().unwrap() = at;
    }

    /// All reports received so far.
    pub fn received_reports(&self) -> Vec<HarvestReport> {
        self.reports.read().unwrap().clone()
    }
}

impl Default for StubVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultPort for StubVault {
    async fn recorded_debt(&self) -> StrategyResult<DebtRecord> {
        Ok(DebtRecord::new(
            *self.total_debt.read().unwrap(),
            *self.last_report.read().unwrap(),
        ))
    }

    async fn debt_outstanding(&self) -> StrategyResult<Amount> {
        Ok(*self.debt_outstanding.read().unwrap())
    }

    async fn emergency_exit(&self) -> StrategyResult<bool> {
        Ok(*self.emergency_exit.read().unwrap())
    }

    async fn report_harvest(&self, report: &HarvestReport) -> StrategyResult<()> {
        {
            let mut total_debt = self.total_debt.write().unwrap();
            *total_debt = total_debt
                .saturating_sub(report.loss)
                .saturating_sub(report.debt_payment);
        }
        {
            let mut outstanding = self.debt_outstanding.write().unwrap();
            *outstanding = outstanding.saturating_sub(report.debt_payment);
        }
        *self.last_report.write().unwrap() = report.completed_at;
        self.reports.write().unwrap().push(*report);
        Ok(())
    }
}

// =============================================================================
// Stub Gas Oracle
// =============================================================================

/// Stub gas-acceptability signal.
pub struct StubGasOracle {
    acceptable: RwLock<bool>,
}

impl StubGasOracle {
    /// Create an oracle with the given initial signal.
    pub fn new(acceptable: bool) -> Self {
        Self {
            acceptable: RwLock::new(acceptable),
        }
    }

    /// Flip the signal.
    pub fn set_acceptable(&self, acceptable: bool) {
        *self.acceptable.write().unwrap() = acceptable;
    }
}

#[async_trait]
impl GasOraclePort for StubGasOracle {
    async fn gas_acceptable(&self) -> StrategyResult<bool> {
        Ok(*self.acceptable.read().unwrap())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use scythe_domain::Hop;

    fn asset(ticker: &str) -> Asset {
        Asset::new(ticker).unwrap()
    }

    #[tokio::test]
    async fn test_bank_transfer_debits_and_records() {
        let bank = StubBank::new();
        bank.set_balance(&asset("CRV"), Amount::new(100));
        let treasury = Recipient::new("treasury").unwrap();
        bank.transfer(&asset("CRV"), &treasury, Amount::new(40))
            .await
            .unwrap();
        assert_eq!(bank.balance(&asset("CRV")), Amount::new(60));
        assert_eq!(
            bank.recorded_transfers(),
            vec![(asset("CRV"), treasury, Amount::new(40))]
        );
    }

    #[tokio::test]
    async fn test_bank_rejects_overdraft() {
        let bank = StubBank::new();
        let treasury = Recipient::new("treasury").unwrap();
        let result = bank.transfer(&asset("CRV"), &treasury, Amount::new(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_gauge_claim_releases_pending() {
        let bank = Arc::new(StubBank::new());
        let gauge = StubGauge::new(bank.clone(), asset("WANT"), asset("CRV"));
        gauge.set_pending_reward(&asset("CRV"), Amount::new(100));
        gauge.claim_rewards().await.unwrap();
        assert_eq!(bank.balance(&asset("CRV")), Amount::new(100));
        // Second claim finds nothing pending
        gauge.claim_rewards().await.unwrap();
        assert_eq!(bank.balance(&asset("CRV")), Amount::new(100));
    }

    #[tokio::test]
    async fn test_gauge_haircut_clamps_at_full() {
        let bank = Arc::new(StubBank::new());
        let gauge = StubGauge::new(bank.clone(), asset("WANT"), asset("CRV"));
        gauge.set_staked(Amount::new(100));
        gauge.set_withdraw_haircut_bps(12_000);

        // Anything past a full haircut still credits exactly nothing
        let credited = gauge.withdraw(Amount::new(100)).await.unwrap();
        assert_eq!(credited, Amount::ZERO);
        assert!(bank.balance(&asset("WANT")).is_zero());
    }

    #[tokio::test]
    async fn test_swap_applies_route_rates() {
        let bank = Arc::new(StubBank::new());
        bank.set_balance(&asset("CRV"), Amount::new(100));
        let swap = StubSwap::new(bank.clone());
        swap.set_rate(&asset("CRV"), &asset("WETH"), 1, 2);
        swap.set_rate(&asset("WETH"), &asset("WANT"), 3, 1);

        let route = ConversionRoute::new(vec![
            Hop::new(asset("CRV"), asset("WETH"), FeeTier::new(3_000).unwrap()).unwrap(),
            Hop::new(asset("WETH"), asset("WANT"), FeeTier::new(500).unwrap()).unwrap(),
        ])
        .unwrap();

        let out = swap
            .swap_exact_input(&route, Amount::new(100), Amount::new(1), Utc::now())
            .await
            .unwrap();
        assert_eq!(out, Amount::new(150)); // 100 / 2 * 3
        assert_eq!(bank.balance(&asset("CRV")), Amount::ZERO);
        assert_eq!(bank.balance(&asset("WANT")), Amount::new(150));
    }

    #[tokio::test]
    async fn test_swap_enforces_min_out() {
        let bank = Arc::new(StubBank::new());
        bank.set_balance(&asset("CRV"), Amount::new(10));
        let swap = StubSwap::new(bank.clone());
        swap.set_rate(&asset("CRV"), &asset("WANT"), 0, 1);

        let result = swap
            .swap_direct(
                &asset("CRV"),
                &asset("WANT"),
                FeeTier::new(3_000).unwrap(),
                Amount::new(10),
                Amount::new(1),
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(StrategyError::Slippage { .. })));
        // Nothing moved
        assert_eq!(bank.balance(&asset("CRV")), Amount::new(10));
    }

    #[tokio::test]
    async fn test_vault_report_reduces_debt() {
        let vault = StubVault::new();
        vault.set_total_debt(Amount::new(1_000));
        vault.set_debt_outstanding(Amount::new(200));

        let report = HarvestReport::new(Amount::ZERO, Amount::new(50), Amount::new(200));
        vault.report_harvest(&report).await.unwrap();

        let record = vault.recorded_debt().await.unwrap();
        assert_eq!(record.total_debt, Amount::new(750));
        assert_eq!(vault.debt_outstanding().await.unwrap(), Amount::ZERO);
        assert_eq!(record.last_report, report.completed_at);
    }
}
