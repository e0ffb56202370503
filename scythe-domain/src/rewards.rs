//! Reward Distribution Policy (Pure Functions)
//!
//! Splits a harvested primary-reward balance between the fixed retention
//! destination and the convertible remainder.
//!
//! # Exactness
//!
//! The retained share is computed with truncating integer division; the
//! convertible remainder is then computed **by subtraction** from the
//! original amount. The remainder is never derived from an independent
//! multiplication, so `retained + convertible == amount` holds exactly
//! for every amount and every rate.

use crate::value_objects::{Amount, Asset, BasisPoints, DomainError};
use serde::{Deserialize, Serialize};

/// Rate denominator for basis-point math
const BPS_DENOMINATOR: u128 = 10_000;

// =============================================================================
// RewardConfig
// =============================================================================

/// Governance-owned reward handling configuration
///
/// Read by the harvest orchestrator at the top of every cycle; mutable
/// only through capability-gated setters between harvests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Share of the primary reward routed to the retention destination
    pub keep_bps: BasisPoints,
    /// Secondary reward asset, converted in full when configured
    pub secondary_reward: Option<Asset>,
}

impl RewardConfig {
    /// Create a config with no secondary reward
    pub fn new(keep_bps: BasisPoints) -> Self {
        Self {
            keep_bps,
            secondary_reward: None,
        }
    }

    /// Create a config with a secondary reward registered
    pub fn with_secondary_reward(keep_bps: BasisPoints, secondary: Asset) -> Self {
        Self {
            keep_bps,
            secondary_reward: Some(secondary),
        }
    }

    /// Whether a secondary reward is registered
    pub fn has_secondary_reward(&self) -> bool {
        self.secondary_reward.is_some()
    }
}

// =============================================================================
// RewardSplit
// =============================================================================

/// Result of applying the distribution policy to a claimed reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    /// Share sent to the fixed retention destination
    pub retained: Amount,
    /// Remainder queued for conversion into want
    pub convertible: Amount,
}

/// Split a claimed reward amount by the keep rate
///
/// # Arguments
///
/// * `amount` - Gross primary reward claimed this harvest
/// * `keep_bps` - Retention rate (already validated at configuration time)
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` only when `amount * keep_bps`
/// exceeds `u128::MAX`, which no real token supply approaches.
///
/// # Examples
///
/// ```
/// # use scythe_domain::rewards::split_reward;
/// # use scythe_domain::value_objects::{Amount, BasisPoints};
/// // 100 CRV claimed at a 10% keep rate
/// let split = split_reward(Amount::new(100), BasisPoints::new(1_000).unwrap()).unwrap();
/// assert_eq!(split.retained, Amount::new(10));
/// assert_eq!(split.convertible, Amount::new(90));
/// ```
pub fn split_reward(amount: Amount, keep_bps: BasisPoints) -> Result<RewardSplit, DomainError> {
    let retained_units = amount
        .as_u128()
        .checked_mul(u128::from(keep_bps.as_u16()))
        .ok_or_else(|| {
            DomainError::AmountOverflow(format!("{} * {}", amount, keep_bps))
        })?
        / BPS_DENOMINATOR;
    let retained = Amount::new(retained_units);

    // Remainder by subtraction: truncation loss stays in the convertible
    // share, the two always sum back to the original amount.
    let convertible = amount.checked_sub(retained)?;

    Ok(RewardSplit {
        retained,
        convertible,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bps(value: u16) -> BasisPoints {
        BasisPoints::new(value).unwrap()
    }

    #[test]
    fn test_split_ten_percent() {
        let split = split_reward(Amount::new(100), bps(1_000)).unwrap();
        assert_eq!(split.retained, Amount::new(10));
        assert_eq!(split.convertible, Amount::new(90));
    }

    #[test]
    fn test_split_truncates_toward_zero() {
        // 333 * 1000 / 10000 = 33.3 -> 33 retained, 300 convertible
        let split = split_reward(Amount::new(333), bps(1_000)).unwrap();
        assert_eq!(split.retained, Amount::new(33));
        assert_eq!(split.convertible, Amount::new(300));
    }

    #[test]
    fn test_split_zero_rate_keeps_nothing() {
        let split = split_reward(Amount::new(12_345), BasisPoints::ZERO).unwrap();
        assert_eq!(split.retained, Amount::ZERO);
        assert_eq!(split.convertible, Amount::new(12_345));
    }

    #[test]
    fn test_split_full_rate_converts_nothing() {
        let split = split_reward(Amount::new(12_345), BasisPoints::MAX).unwrap();
        assert_eq!(split.retained, Amount::new(12_345));
        assert_eq!(split.convertible, Amount::ZERO);
    }

    #[test]
    fn test_split_sums_back_exactly() {
        // Sweep awkward amounts against every rate in 1bps steps; the
        // subtraction construction must never leak a single base unit.
        for amount in [0u128, 1, 7, 99, 10_000, 10_001, 333_333_333_333] {
            for rate in (0..=10_000).step_by(1) {
                let split = split_reward(Amount::new(amount), bps(rate as u16)).unwrap();
                assert_eq!(
                    split.retained.checked_add(split.convertible).unwrap(),
                    Amount::new(amount),
                    "leaked units at amount={} rate={}",
                    amount,
                    rate
                );
            }
        }
    }

    #[test]
    fn test_config_secondary_reward() {
        let config = RewardConfig::new(bps(500));
        assert!(!config.has_secondary_reward());

        let config = RewardConfig::with_secondary_reward(
            bps(500),
            Asset::new("CVX").unwrap(),
        );
        assert!(config.has_secondary_reward());
    }
}
