//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use scythe_domain::{Asset, BasisPoints, ConversionRoute, FeeTier, Hop, RewardConfig};
use scythe_strategy::{Recipient, StrategyConfig};
use std::env;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Keeper loop configuration
    pub keeper: KeeperConfig,

    /// Strategy wiring parameters
    pub strategy: StrategyParams,

    /// Gas oracle configuration
    pub gas: GasConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Keeper loop configuration.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    /// How often the keeper evaluates the harvest trigger
    pub poll_interval: Duration,
    /// Earliest a harvest becomes eligible after a report
    pub min_report_delay: Duration,
    /// Latest a harvest may wait after a report
    pub max_report_delay: Duration,
}

/// Strategy wiring parameters.
///
/// Kept as plain values so the config layer stays independent of the
/// strategy types; [`StrategyParams::build`] validates and converts.
#[derive(Debug, Clone)]
pub struct StrategyParams {
    /// Ticker of the asset the vault accounts in
    pub want: String,
    /// Ticker of the primary staking reward
    pub primary_reward: String,
    /// Ticker of the shared routing asset
    pub intermediate: String,
    /// Optional ticker of a secondary staking reward
    pub secondary_reward: Option<String>,
    /// Basis points of primary rewards retained for the treasury
    pub keep_bps: u16,
    /// Destination for retained rewards
    pub retention_destination: String,
    /// Fee tier of the reward -> intermediate leg
    pub reward_leg_fee: u32,
    /// Fee tier of the intermediate -> want leg
    pub want_leg_fee: u32,
    /// Fee tier for direct secondary-reward swaps
    pub secondary_fee: u32,
}

/// Gas oracle configuration.
#[derive(Debug, Clone)]
pub struct GasConfig {
    /// Endpoint serving the fee payload
    pub endpoint: String,
    /// Ceiling above which harvesting waits
    pub max_fee_gwei: f64,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (uses stubs)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let keeper = Self::load_keeper_config()?;
        let strategy = Self::load_strategy_params()?;
        let gas = Self::load_gas_config()?;

        Ok(Self {
            api,
            keeper,
            strategy,
            gas,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            keeper: KeeperConfig {
                poll_interval: Duration::from_millis(50),
                min_report_delay: Duration::from_secs(60),
                max_report_delay: Duration::from_secs(600),
            },
            strategy: StrategyParams::default(),
            gas: GasConfig {
                endpoint: "http://127.0.0.1:0/fees".to_string(),
                max_fee_gwei: 40.0,
            },
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("SCYTHE_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid SCYTHE_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("SCYTHE_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("SCYTHE_API_PORT").unwrap_or_else(|_| "8080".to_string());

        let port = port_str
            .parse::<u16>()
            .map_err(|_| DaemonError::Config(format!("Invalid SCYTHE_API_PORT: {}", port_str)))?;

        Ok(ApiConfig { host, port })
    }

    fn load_keeper_config() -> DaemonResult<KeeperConfig> {
        let poll_interval = Self::load_secs_env("SCYTHE_POLL_INTERVAL_SECS", 300)?;
        let min_report_delay = Self::load_secs_env("SCYTHE_MIN_REPORT_DELAY_SECS", 86_400)?;
        let max_report_delay = Self::load_secs_env("SCYTHE_MAX_REPORT_DELAY_SECS", 604_800)?;

        if min_report_delay > max_report_delay {
            return Err(DaemonError::Config(format!(
                "SCYTHE_MIN_REPORT_DELAY_SECS ({:?}) exceeds SCYTHE_MAX_REPORT_DELAY_SECS ({:?})",
                min_report_delay, max_report_delay
            )));
        }

        Ok(KeeperConfig {
            poll_interval,
            min_report_delay,
            max_report_delay,
        })
    }

    fn load_strategy_params() -> DaemonResult<StrategyParams> {
        let defaults = StrategyParams::default();

        Ok(StrategyParams {
            want: env::var("SCYTHE_WANT_ASSET").unwrap_or(defaults.want),
            primary_reward: env::var("SCYTHE_PRIMARY_REWARD").unwrap_or(defaults.primary_reward),
            intermediate: env::var("SCYTHE_INTERMEDIATE_ASSET").unwrap_or(defaults.intermediate),
            secondary_reward: env::var("SCYTHE_SECONDARY_REWARD").ok(),
            keep_bps: Self::load_u16_env("SCYTHE_KEEP_BPS", defaults.keep_bps)?,
            retention_destination: env::var("SCYTHE_TREASURY")
                .unwrap_or(defaults.retention_destination),
            reward_leg_fee: Self::load_u32_env("SCYTHE_REWARD_LEG_FEE", defaults.reward_leg_fee)?,
            want_leg_fee: Self::load_u32_env("SCYTHE_WANT_LEG_FEE", defaults.want_leg_fee)?,
            secondary_fee: Self::load_u32_env("SCYTHE_SECONDARY_FEE", defaults.secondary_fee)?,
        })
    }

    fn load_gas_config() -> DaemonResult<GasConfig> {
        let endpoint = env::var("SCYTHE_GAS_ENDPOINT")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/fees".to_string());
        let gwei_str = env::var("SCYTHE_MAX_FEE_GWEI").unwrap_or_else(|_| "40".to_string());

        let max_fee_gwei = gwei_str
            .parse::<f64>()
            .map_err(|_| DaemonError::Config(format!("Invalid SCYTHE_MAX_FEE_GWEI: {}", gwei_str)))?;

        Ok(GasConfig {
            endpoint,
            max_fee_gwei,
        })
    }

    fn load_secs_env(key: &str, default_secs: u64) -> DaemonResult<Duration> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(Duration::from_secs(default_secs)),
        }
    }

    fn load_u16_env(key: &str, default: u16) -> DaemonResult<u16> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u16>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }

    fn load_u32_env(key: &str, default: u32) -> DaemonResult<u32> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u32>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl StrategyParams {
    /// Validate the raw parameters into a [`StrategyConfig`].
    pub fn build(&self) -> DaemonResult<StrategyConfig> {
        let want = Asset::new(&self.want)?;
        let primary_reward = Asset::new(&self.primary_reward)?;
        let intermediate = Asset::new(&self.intermediate)?;

        let keep_bps = BasisPoints::new(self.keep_bps)?;
        let reward = match &self.secondary_reward {
            Some(ticker) => RewardConfig::with_secondary_reward(keep_bps, Asset::new(ticker)?),
            None => RewardConfig::new(keep_bps),
        };

        let conversion_route = ConversionRoute::new(vec![
            Hop::new(
                primary_reward.clone(),
                intermediate.clone(),
                FeeTier::new(self.reward_leg_fee)?,
            )?,
            Hop::new(
                intermediate.clone(),
                want.clone(),
                FeeTier::new(self.want_leg_fee)?,
            )?,
        ])?;

        let config = StrategyConfig::new(
            want,
            primary_reward,
            intermediate,
            reward,
            Recipient::new(&self.retention_destination)?,
            conversion_route,
            FeeTier::new(self.secondary_fee)?,
        )?;

        Ok(config)
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            want: "USDT".to_string(),
            primary_reward: "CRV".to_string(),
            intermediate: "WETH".to_string(),
            secondary_reward: None,
            keep_bps: 1000,
            retention_destination: "treasury".to_string(),
            reward_leg_fee: 3000,
            want_leg_fee: 500,
            secondary_fee: 10_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            keeper: KeeperConfig {
                poll_interval: Duration::from_secs(300),
                min_report_delay: Duration::from_secs(86_400),
                max_report_delay: Duration::from_secs(604_800),
            },
            strategy: StrategyParams::default(),
            gas: GasConfig {
                endpoint: "http://127.0.0.1:3000/fees".to_string(),
                max_fee_gwei: 40.0,
            },
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.keeper.poll_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.api.port, 0);
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_default_strategy_params_build() {
        let config = StrategyParams::default().build().unwrap();

        assert_eq!(config.want.as_str(), "USDT");
        assert_eq!(config.primary_reward.as_str(), "CRV");
        assert_eq!(config.reward.keep_bps.as_u16(), 1000);
        assert_eq!(config.conversion_route.hops().len(), 2);
    }

    #[test]
    fn test_strategy_params_reject_bad_ticker() {
        let params = StrategyParams {
            want: "not a ticker".to_string(),
            ..StrategyParams::default()
        };

        assert!(params.build().is_err());
    }

    #[test]
    fn test_strategy_params_with_secondary_reward() {
        let params = StrategyParams {
            secondary_reward: Some("LDO".to_string()),
            ..StrategyParams::default()
        };

        let config = params.build().unwrap();
        assert!(config.reward.has_secondary_reward());
    }
}
