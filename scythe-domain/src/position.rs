//! Position math and vault debt views
//!
//! A `Position` is a derived snapshot of where the strategy's capital
//! sits right now. It is always recomputed from live balances and never
//! persisted, so there is no stale-position state to reconcile.

use crate::value_objects::{Amount, DomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Position
// =============================================================================

/// Snapshot of the strategy's capital split
///
/// # Invariants
/// - Both balances are non-negative (unsigned `Amount`)
/// - `total()` is a checked sum, never a silent wrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Want-token balance held directly by the strategy
    pub idle: Amount,
    /// Balance deposited at the gauge, as reported by the gauge
    pub staked: Amount,
}

impl Position {
    /// Create a snapshot from live balances
    pub fn new(idle: Amount, staked: Amount) -> Self {
        Self { idle, staked }
    }

    /// Estimated total assets: idle + staked
    ///
    /// # Errors
    /// Returns `DomainError::AmountOverflow` if the sum exceeds `u128::MAX`
    pub fn total(&self) -> Result<Amount, DomainError> {
        self.idle.checked_add(self.staked)
    }
}

// =============================================================================
// DebtRecord
// =============================================================================

/// The vault's view of capital allocated to this strategy
///
/// Owned by the vault, read-only to the strategy. The strategy reports
/// profit/loss each harvest and the vault updates the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRecord {
    /// Principal the vault believes is allocated here
    pub total_debt: Amount,
    /// When the strategy last reported
    pub last_report: DateTime<Utc>,
}

impl DebtRecord {
    /// Create a debt record
    pub fn new(total_debt: Amount, last_report: DateTime<Utc>) -> Self {
        Self {
            total_debt,
            last_report,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
