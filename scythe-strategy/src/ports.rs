//! Strategy port definitions.
//!
//! Ports define the interfaces for the external collaborators (vault,
//! gauge, swap venue, token account, gas oracle). Adapters implement
//! these ports for specific venues; stubs implement them for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use scythe_domain::{
    Amount, Asset, ConversionRoute, DebtRecord, FeeTier, HarvestReport,
};

use crate::error::{StrategyError, StrategyResult};

// =============================================================================
// Recipient
// =============================================================================

/// Destination account for token transfers (e.g., the retention treasury)
///
/// # Invariants
/// - Non-empty identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient(String);

impl Recipient {
    /// Create a recipient with validation
    ///
    /// # Errors
    /// Returns `StrategyError::Configuration` for an empty identifier
    pub fn new(id: &str) -> StrategyResult<Self> {
        if id.is_empty() {
            return Err(StrategyError::Configuration(
                "Recipient identifier must be non-empty".to_string(),
            ));
        }
        Ok(Self(id.to_string()))
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Vault Port
// =============================================================================

/// Port for the vault ledger this strategy answers to.
///
/// The strategy never mutates the debt record directly; it reports a
/// `HarvestReport` and the vault updates its own accounting.
#[async_trait]
pub trait VaultPort: Send + Sync {
    /// The vault's recorded debt and last report timestamp for this strategy.
    async fn recorded_debt(&self) -> StrategyResult<DebtRecord>;

    /// Principal the vault wants recalled from this strategy right now.
    async fn debt_outstanding(&self) -> StrategyResult<Amount>;

    /// Whether the strategy is in emergency-exit mode.
    async fn emergency_exit(&self) -> StrategyResult<bool>;

    /// Deliver the figures from a completed harvest.
    async fn report_harvest(&self, report: &HarvestReport) -> StrategyResult<()>;
}

// =============================================================================
// Gauge Port
// =============================================================================

/// Port for the staking venue holding the strategy's deposited want.
#[async_trait]
pub trait GaugePort: Send + Sync {
    /// Want currently deposited, as reported by the venue.
    async fn staked_balance(&self) -> StrategyResult<Amount>;

    /// Deposit want from the strategy's idle balance into the venue.
    async fn deposit(&self, amount: Amount) -> StrategyResult<()>;

    /// Withdraw want from the venue back to idle balance.
    ///
    /// Returns the amount actually credited, which may be less than
    /// requested when the venue takes a haircut or holds less.
    async fn withdraw(&self, amount: Amount) -> StrategyResult<Amount>;

    /// Claim the accrued primary reward into the strategy's balance.
    async fn claim_rewards(&self) -> StrategyResult<()>;

    /// Claim an accrued secondary reward into the strategy's balance.
    async fn claim_secondary(&self, asset: &Asset) -> StrategyResult<()>;
}

// =============================================================================
// Swap Port
// =============================================================================

/// Port for the swap venue(s) converting rewards into want.
///
/// Both calls are exact-input with a minimum-output floor and a
/// deadline; an output below the floor must surface as
/// `StrategyError::Slippage`, never as a silent partial fill.
#[async_trait]
pub trait SwapPort: Send + Sync {
    /// Exact-input multi-hop swap along a validated route.
    async fn swap_exact_input(
        &self,
        route: &ConversionRoute,
        amount_in: Amount,
        min_out: Amount,
        deadline: DateTime<Utc>,
    ) -> StrategyResult<Amount>;

    /// Direct two-asset swap on the deeper-liquidity venue.
    ///
    /// Used for the secondary reward, whose liquidity sits on a
    /// different venue than the primary reward's.
    async fn swap_direct(
        &self,
        asset_in: &Asset,
        asset_out: &Asset,
        fee_tier: FeeTier,
        amount_in: Amount,
        min_out: Amount,
        deadline: DateTime<Utc>,
    ) -> StrategyResult<Amount>;
}

// =============================================================================
// Token Port
// =============================================================================

/// Port over the strategy's own token balances.
#[async_trait]
pub trait TokenPort: Send + Sync {
    /// Balance of an asset held directly by the strategy.
    async fn balance_of(&self, asset: &Asset) -> StrategyResult<Amount>;

    /// Transfer an asset out of the strategy (retention share).
    async fn transfer(
        &self,
        asset: &Asset,
        recipient: &Recipient,
        amount: Amount,
    ) -> StrategyResult<()>;
}

// =============================================================================
// Gas Oracle Port
// =============================================================================

/// Port for the external gas-price-acceptability signal.
///
/// Feeds the trigger policy; the harvest itself never consults it.
#[async_trait]
pub trait GasOraclePort: Send + Sync {
    /// Whether current gas pricing is acceptable for a harvest.
    async fn gas_acceptable(&self) -> StrategyResult<bool>;
}
