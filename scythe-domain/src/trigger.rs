//! Harvest Trigger Policy (Pure Functions)
//!
//! Decides whether a harvest should run now, from external time and gas
//! signals. Deterministic, no side effects.
//!
//! # Decision order
//!
//! 1. Elapsed time past `max_delay` → harvest, gas price irrelevant
//!    (the max delay is an absolute deadline; correctness beats cost)
//! 2. Gas price unacceptable → wait, even if otherwise eligible
//! 3. Force flag set → harvest
//! 4. Elapsed time past `min_delay` → harvest
//! 5. Otherwise → wait
//!
//! Rules 3 and 4 are therefore both gated on acceptable gas; only the
//! max-delay deadline overrides it.

use crate::value_objects::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// TriggerState
// =============================================================================

/// Persistent trigger parameters
///
/// `force_harvest_once` is the single piece of core-owned mutable state
/// that survives across cycles: set externally, cleared unconditionally
/// by the orchestrator at the end of every completed harvest.
///
/// # Invariants
/// - `min_delay <= max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    /// One-shot flag forcing the next eligible harvest
    pub force_harvest_once: bool,
    /// Eligible-but-optional threshold
    pub min_delay: Duration,
    /// Absolute deadline overriding gas considerations
    pub max_delay: Duration,
}

impl TriggerState {
    /// Create a trigger state with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTriggerState` if `min_delay > max_delay`
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self, DomainError> {
        if min_delay > max_delay {
            return Err(DomainError::InvalidTriggerState(format!(
                "min_delay {:?} exceeds max_delay {:?}",
                min_delay, max_delay
            )));
        }
        Ok(Self {
            force_harvest_once: false,
            min_delay,
            max_delay,
        })
    }
}

// =============================================================================
// Trigger decision
// =============================================================================

/// Why a harvest should run now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReason {
    /// Elapsed time passed the absolute deadline
    MaxDelayExceeded,
    /// The one-shot force flag was set
    Forced,
    /// Elapsed time passed the optional threshold
    MinDelayElapsed,
}

/// Inputs to one trigger evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerContext {
    /// Time since the strategy last reported to the vault
    pub elapsed: Duration,
    /// Current trigger parameters
    pub state: TriggerState,
    /// External gas-price-acceptability signal
    pub gas_acceptable: bool,
}

/// Decide whether a harvest should run now
///
/// Returns the reason to harvest, or `None` to wait.
///
/// # Examples
///
/// ```
/// # use scythe_domain::trigger::{should_harvest, TriggerContext, TriggerReason, TriggerState};
/// # use std::time::Duration;
/// let day = Duration::from_secs(86_400);
/// let state = TriggerState::new(day, 7 * day).unwrap();
///
/// // Past the deadline: harvest even on unacceptable gas
/// let ctx = TriggerContext { elapsed: 8 * day, state, gas_acceptable: false };
/// assert_eq!(should_harvest(&ctx), Some(TriggerReason::MaxDelayExceeded));
///
/// // Eligible by min delay, but gas is too expensive
/// let ctx = TriggerContext { elapsed: 2 * day, state, gas_acceptable: false };
/// assert_eq!(should_harvest(&ctx), None);
///
/// // Eligible and gas is fine
/// let ctx = TriggerContext { elapsed: 2 * day, state, gas_acceptable: true };
/// assert_eq!(should_harvest(&ctx), Some(TriggerReason::MinDelayElapsed));
/// ```
pub fn should_harvest(ctx: &TriggerContext) -> Option<TriggerReason> {
    // 1. Absolute deadline, gas price irrelevant
    if ctx.elapsed > ctx.state.max_delay {
        return Some(TriggerReason::MaxDelayExceeded);
    }

    // 2. Gas veto for everything below the deadline
    if !ctx.gas_acceptable {
        return None;
    }

    // 3. One-shot force flag
    if ctx.state.force_harvest_once {
        return Some(TriggerReason::Forced);
    }

    // 4. Optional threshold
    if ctx.elapsed > ctx.state.min_delay {
        return Some(TriggerReason::MinDelayElapsed);
    }

    // 5. Nothing due yet
    None
}

// =============================================================================
// Tests
// =============================================================================
