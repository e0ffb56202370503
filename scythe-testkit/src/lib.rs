//! Test helpers for Scythe integration tests.
//!
//! Provides a fully stubbed strategy world with sensible defaults, so
//! daemon and strategy tests assemble scenarios in a few lines.

mod helpers;

pub use helpers::{HarvestWorld, HarvestWorldBuilder};
