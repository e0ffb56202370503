//! Daemon error types.

use scythe_connectors::ConnectorError;
use scythe_domain::DomainError;
use scythe_strategy::StrategyError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Strategy error
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    /// Connector error
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shutdown requested
    #[error("Shutdown requested")]
    Shutdown,
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
