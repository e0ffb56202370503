//! Conversion routes for reward-to-want swaps
//!
//! A route is an ordered sequence of pool hops, each with its own fee
//! tier. Routes are validated when governance configures them and are
//! immutable for the duration of a harvest.

use crate::value_objects::{Asset, DomainError, FeeTier};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Hop
// =============================================================================

/// A single pool hop within a conversion route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    /// Asset paid into the pool
    pub asset_in: Asset,
    /// Asset received from the pool
    pub asset_out: Asset,
    /// Pool fee tier
    pub fee_tier: FeeTier,
}

impl Hop {
    /// Create a hop
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRoute` for a self-swap hop
    pub fn new(asset_in: Asset, asset_out: Asset, fee_tier: FeeTier) -> Result<Self, DomainError> {
        if asset_in == asset_out {
            return Err(DomainError::InvalidRoute(format!(
                "Hop cannot swap {} into itself",
                asset_in
            )));
        }
        Ok(Self {
            asset_in,
            asset_out,
            fee_tier,
        })
    }
}

// =============================================================================
// ConversionRoute
// =============================================================================

/// Ordered multi-hop path from a reward asset into another asset
///
/// # Invariants
/// - At least one hop
/// - Hops are contiguous: each hop's output is the next hop's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRoute {
    hops: Vec<Hop>,
}

impl ConversionRoute {
    /// Create a route with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRoute` if empty or discontiguous
    pub fn new(hops: Vec<Hop>) -> Result<Self, DomainError> {
        if hops.is_empty() {
            return Err(DomainError::InvalidRoute(
                "Route must have at least one hop".to_string(),
            ));
        }
        for window in hops.windows(2) {
            if window[0].asset_out != window[1].asset_in {
                return Err(DomainError::InvalidRoute(format!(
                    "Discontiguous hops: {} out, {} in",
                    window[0].asset_out, window[1].asset_in
                )));
            }
        }
        Ok(Self { hops })
    }

    /// The hops making up the route
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// The asset the route consumes
    pub fn input(&self) -> &Asset {
        &self.hops[0].asset_in
    }

    /// The asset the route produces
    pub fn output(&self) -> &Asset {
        &self.hops[self.hops.len() - 1].asset_out
    }

    /// Split the route at an intermediate asset
    ///
    /// Returns the leg ending at `asset` and the leg continuing from it.
    /// Used when a secondary reward forces the primary conversion to stop
    /// at the intermediate and finish in a separate call.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRoute` when `asset` is an endpoint or
    /// never appears between two hops
    pub fn split_at(&self, asset: &Asset) -> Result<(ConversionRoute, ConversionRoute), DomainError> {
        let boundary = self
            .hops
            .iter()
            .position(|hop| &hop.asset_out == asset)
            .ok_or_else(|| {
                DomainError::InvalidRoute(format!("Route {} does not pass through {}", self, asset))
            })?;
        if boundary + 1 == self.hops.len() {
            return Err(DomainError::InvalidRoute(format!(
                "{} is the route output, not an intermediate",
                asset
            )));
        }
        Ok((
            ConversionRoute {
                hops: self.hops[..=boundary].to_vec(),
            },
            ConversionRoute {
                hops: self.hops[boundary + 1..].to_vec(),
            },
        ))
    }
}

impl fmt::Display for ConversionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.input())?;
        for hop in &self.hops {
            write!(f, " -{}-> {}", hop.fee_tier, hop.asset_out)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
