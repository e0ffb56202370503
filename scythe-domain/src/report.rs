//! Harvest reports
//!
//! The figures a completed harvest hands back to the vault. Profit and
//! loss are mutually exclusive by construction of the orchestrator's
//! final accounting step; both are reported in want base units.

use crate::value_objects::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a completed harvest cycle
pub type HarvestId = Uuid;

/// Outcome of one completed harvest invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    /// Time-ordered harvest id
    pub id: HarvestId,
    /// Assets above the vault's recorded debt
    pub profit: Amount,
    /// Shortfall below the vault's recorded debt
    pub loss: Amount,
    /// Idle funds produced toward the vault's outstanding debt request
    pub debt_payment: Amount,
    /// When the harvest completed
    pub completed_at: DateTime<Utc>,
}

impl HarvestReport {
    /// Create a report for a harvest that just completed
    pub fn new(profit: Amount, loss: Amount, debt_payment: Amount) -> Self {
        Self {
            id: Uuid::now_v7(),
            profit,
            loss,
            debt_payment,
            completed_at: Utc::now(),
        }
    }

    /// True when the harvest moved no value at all
    pub fn is_empty(&self) -> bool {
        self.profit.is_zero() && self.loss.is_zero() && self.debt_payment.is_zero()
    }
}
