//! Scythe Connectors
//!
//! Outbound adapters for external signal providers.
//! Normalizes provider-specific payloads to the strategy's ports.

#![warn(clippy::all)]

// Public modules
pub mod gas_oracle;

// Re-exports
pub use gas_oracle::{ConnectorError, FeeOracleClient, FeeSnapshot};
