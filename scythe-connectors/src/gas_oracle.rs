//! Fee oracle HTTP client
//!
//! Polls a gas-station style JSON endpoint for current fee levels and
//! answers the strategy's gas-acceptability question against a
//! configured ceiling. The trigger policy itself stays pure; this
//! adapter is the only place that knows where the signal comes from.
//!
//! Expected payload:
//!
//! ```json
//! { "fast": { "max_fee_gwei": 24.1, "priority_fee_gwei": 1.5 } }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use scythe_strategy::{GasOraclePort, StrategyError, StrategyResult};

// =============================================================================
// Constants
// =============================================================================

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur in the fee oracle client.
#[derive(Debug, Clone, Error)]
pub enum ConnectorError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// =============================================================================
// Response types
// =============================================================================

/// One fee level from the oracle.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeeSnapshot {
    /// Suggested max fee in gwei
    pub max_fee_gwei: f64,
    /// Suggested priority fee in gwei
    pub priority_fee_gwei: f64,
}

#[derive(Debug, Deserialize)]
struct FeeResponse {
    fast: FeeSnapshot,
}

// =============================================================================
// Fee Oracle Client
// =============================================================================

/// HTTP client for a gas-station style fee endpoint.
pub struct FeeOracleClient {
    /// HTTP client
    client: Client,
    /// Endpoint serving the fee payload
    endpoint: String,
    /// Ceiling above which harvesting is not worth the gas
    max_acceptable_gwei: f64,
}

impl FeeOracleClient {
    /// Create a new fee oracle client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the fee endpoint
    /// * `max_acceptable_gwei` - Fast-lane fee ceiling for harvesting
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidParameter` for an empty endpoint
    /// or a non-positive ceiling.
    pub fn new(endpoint: String, max_acceptable_gwei: f64) -> Result<Self, ConnectorError> {
        if endpoint.is_empty() {
            return Err(ConnectorError::InvalidParameter(
                "Endpoint must be non-empty".to_string(),
            ));
        }
        if max_acceptable_gwei <= 0.0 {
            return Err(ConnectorError::InvalidParameter(format!(
                "Ceiling must be positive, got {}",
                max_acceptable_gwei
            )));
        }
        Ok(Self {
            client: Client::new(),
            endpoint,
            max_acceptable_gwei,
        })
    }

    /// Fetch the current fast-lane fee level.
    pub async fn current_fees(&self) -> Result<FeeSnapshot, ConnectorError> {
        let request = self.client.get(&self.endpoint).send();
        let response = timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), request)
            .await
            .map_err(|_| ConnectorError::Timeout)?
            .map_err(|e| ConnectorError::RequestFailed(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| ConnectorError::RequestFailed(e.to_string()))?;
        let parsed = parse_fee_response(&body)?;
        debug!(
            max_fee_gwei = parsed.max_fee_gwei,
            priority_fee_gwei = parsed.priority_fee_gwei,
            "Fetched fee snapshot"
        );
        Ok(parsed)
    }

    /// Whether the snapshot clears the configured ceiling.
    pub fn is_acceptable(&self, snapshot: &FeeSnapshot) -> bool {
        snapshot.max_fee_gwei <= self.max_acceptable_gwei
    }
}

/// Parse the oracle payload into a fast-lane snapshot.
fn parse_fee_response(body: &str) -> Result<FeeSnapshot, ConnectorError> {
    let response: FeeResponse =
        serde_json::from_str(body).map_err(|e| ConnectorError::ParseError(e.to_string()))?;
    if !response.fast.max_fee_gwei.is_finite() || response.fast.max_fee_gwei < 0.0 {
        return Err(ConnectorError::ParseError(format!(
            "Implausible max fee: {}",
            response.fast.max_fee_gwei
        )));
    }
    Ok(response.fast)
}

#[async_trait]
impl GasOraclePort for FeeOracleClient {
    async fn gas_acceptable(&self) -> StrategyResult<bool> {
        let snapshot = self
            .current_fees()
            .await
            .map_err(|e| StrategyError::Venue(e.to_string()))?;
        Ok(self.is_acceptable(&snapshot))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fee_response() {
        let body = r#"{ "fast": { "max_fee_gwei": 24.1, "priority_fee_gwei": 1.5 } }"#;
        let snapshot = parse_fee_response(body).unwrap();
        assert_eq!(snapshot.max_fee_gwei, 24.1);
        assert_eq!(snapshot.priority_fee_gwei, 1.5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_fee_response("not json").is_err());
        assert!(parse_fee_response(r#"{ "fast": {} }"#).is_err());
        assert!(
            parse_fee_response(r#"{ "fast": { "max_fee_gwei": -3.0, "priority_fee_gwei": 0 } }"#)
                .is_err()
        );
    }

    #[test]
    fn test_ceiling_comparison() {
        let client = FeeOracleClient::new("http://localhost/fee".to_string(), 30.0).unwrap();
        let cheap = FeeSnapshot {
            max_fee_gwei: 12.0,
            priority_fee_gwei: 1.0,
        };
        let expensive = FeeSnapshot {
            max_fee_gwei: 95.0,
            priority_fee_gwei: 2.0,
        };
        assert!(client.is_acceptable(&cheap));
        assert!(!client.is_acceptable(&expensive));
    }

    #[test]
    fn test_client_validation() {
        assert!(FeeOracleClient::new(String::new(), 30.0).is_err());
        assert!(FeeOracleClient::new("http://localhost/fee".to_string(), 0.0).is_err());
    }
}
