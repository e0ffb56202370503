//! Scythe Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Value objects, position math, reward distribution and the harvest
//! trigger policy all live here as deterministic code.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod position;
pub mod report;
pub mod rewards;
pub mod route;
pub mod trigger;
pub mod value_objects;

// Re-export commonly used types
pub use position::{DebtRecord, Position};
pub use report::{HarvestId, HarvestReport};
pub use rewards::{split_reward, RewardConfig, RewardSplit};
pub use route::{ConversionRoute, Hop};
pub use trigger::{should_harvest, TriggerContext, TriggerReason, TriggerState};
pub use value_objects::{Amount, Asset, BasisPoints, DomainError, FeeTier};
