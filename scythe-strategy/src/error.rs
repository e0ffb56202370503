//! Strategy layer error types.

use scythe_domain::{Amount, Asset, DomainError};
use thiserror::Error;

/// Errors that can occur while operating the strategy.
///
/// Shortfall loss is deliberately absent: a liquidation producing less
/// than requested is a designed outcome, surfaced as data
/// (`LiquidationOutcome::loss`), never as an error.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Invalid configuration, rejected before any state mutation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller presented the wrong governance capability
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A conversion hop returned below its minimum-output floor.
    ///
    /// Fatal to the in-progress harvest: partial conversion would
    /// misstate profit, so the whole invocation aborts.
    #[error("Slippage converting {asset_in}: minimum {min_out}, got {actual}")]
    Slippage {
        /// Asset being converted when the floor was breached
        asset_in: Asset,
        /// Configured minimum output
        min_out: Amount,
        /// Output the venue actually produced
        actual: Amount,
    },

    /// Vault communication error
    #[error("Vault error: {0}")]
    Vault(String),

    /// Gauge or swap venue communication error
    #[error("Venue error: {0}")]
    Venue(String),

    /// Domain validation error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for strategy operations.
pub type StrategyResult<T> = Result<T, StrategyError>;
