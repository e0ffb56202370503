//! Strategy configuration and the governance capability.
//!
//! All mutable configuration is owned by the harvester and changed only
//! through setters that take an explicit `GovernanceKey`. There is no
//! ambient caller inspection anywhere in the core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scythe_domain::{Asset, ConversionRoute, FeeTier, RewardConfig};

use crate::error::{StrategyError, StrategyResult};
use crate::ports::Recipient;

// =============================================================================
// GovernanceKey
// =============================================================================

/// Capability object authorizing configuration changes.
///
/// Generated once at deployment and handed to the operator; every
/// mutating setter compares the presented key against the one the
/// harvester was constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceKey(Uuid);

impl GovernanceKey {
    /// Generate a fresh capability.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for GovernanceKey {
    fn default() -> Self {
        Self::generate()
    }
}

// =============================================================================
// StrategyConfig
// =============================================================================

/// Everything the harvester needs to know about assets and routing.
///
/// Validated as a whole at construction; individual fields are then
/// replaced through governance-gated setters that re-run the relevant
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// The asset the strategy accumulates
    pub want: Asset,
    /// Primary reward emitted by the gauge
    pub primary_reward: Asset,
    /// Intermediate asset the conversion route passes through
    pub intermediate: Asset,
    /// Reward keep rate and optional secondary reward
    pub reward: RewardConfig,
    /// Fixed destination for the retained reward share
    pub retention_destination: Recipient,
    /// Full conversion route: primary reward → ... → want
    pub conversion_route: ConversionRoute,
    /// Direct-venue fee tier for the secondary reward → want swap
    pub secondary_fee_tier: FeeTier,
}

impl StrategyConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    /// Returns `StrategyError::Configuration` when the route endpoints
    /// do not match the assets, the route skips the intermediate, or
    /// want doubles as a reward asset.
    pub fn new(
        want: Asset,
        primary_reward: Asset,
        intermediate: Asset,
        reward: RewardConfig,
        retention_destination: Recipient,
        conversion_route: ConversionRoute,
        secondary_fee_tier: FeeTier,
    ) -> StrategyResult<Self> {
        if want == primary_reward {
            return Err(StrategyError::Configuration(
                "Want cannot double as the primary reward".to_string(),
            ));
        }
        if let Some(secondary) = &reward.secondary_reward {
            if secondary == &want || secondary == &primary_reward {
                return Err(StrategyError::Configuration(format!(
                    "Secondary reward {} collides with a core asset",
                    secondary
                )));
            }
        }
        let config = Self {
            want,
            primary_reward,
            intermediate,
            reward,
            retention_destination,
            conversion_route,
            secondary_fee_tier,
        };
        config.validate_route(&config.conversion_route)?;
        Ok(config)
    }

    /// Check a candidate route against this configuration's assets.
    ///
    /// # Errors
    /// Returns `StrategyError::Configuration` on mismatched endpoints or
    /// a route that never passes through the intermediate.
    pub fn validate_route(&self, route: &ConversionRoute) -> StrategyResult<()> {
        if route.input() != &self.primary_reward {
            return Err(StrategyError::Configuration(format!(
                "Route consumes {}, expected {}",
                route.input(),
                self.primary_reward
            )));
        }
        if route.output() != &self.want {
            return Err(StrategyError::Configuration(format!(
                "Route produces {}, expected {}",
                route.output(),
                self.want
            )));
        }
        // The split must exist so a secondary reward can stop the
        // primary conversion at the intermediate.
        route
            .split_at(&self.intermediate)
            .map_err(|e| StrategyError::Configuration(e.to_string()))?;
        Ok(())
    }

    /// The two legs of the conversion route, split at the intermediate.
    ///
    /// # Errors
    /// Validated at configuration time; only fails if the config was
    /// mutated without revalidation, which the setters prevent.
    pub fn route_legs(&self) -> StrategyResult<(ConversionRoute, ConversionRoute)> {
        self.conversion_route
            .split_at(&self.intermediate)
            .map_err(StrategyError::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
