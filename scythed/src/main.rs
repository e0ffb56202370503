//! Scythe Daemon
//!
//! Runtime orchestrator for the harvest strategy, keeper loop, and API
//! server.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p scythed
//!
//! # Start with custom environment
//! SCYTHE_ENV=test SCYTHE_API_PORT=8081 cargo run -p scythed
//! ```
//!
//! # Environment Variables
//!
//! - `SCYTHE_ENV`: Environment (test, development, production)
//! - `SCYTHE_API_HOST`: API host (default: 0.0.0.0)
//! - `SCYTHE_API_PORT`: API port (default: 8080)
//! - `SCYTHE_POLL_INTERVAL_SECS`: Trigger poll cadence (default: 300)
//! - `SCYTHE_MIN_REPORT_DELAY_SECS`: Earliest harvest after a report (default: 86400)
//! - `SCYTHE_MAX_REPORT_DELAY_SECS`: Harvest deadline after a report (default: 604800)
//! - `SCYTHE_WANT_ASSET` / `SCYTHE_PRIMARY_REWARD` / `SCYTHE_INTERMEDIATE_ASSET`: Asset tickers
//! - `SCYTHE_SECONDARY_REWARD`: Optional secondary reward ticker
//! - `SCYTHE_KEEP_BPS`: Retained reward share in basis points (default: 1000)
//! - `SCYTHE_TREASURY`: Destination for retained rewards
//! - `SCYTHE_GAS_ENDPOINT` / `SCYTHE_MAX_FEE_GWEI`: Fee oracle wiring

use scythed::{Config, Daemon, Environment};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("scythed=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        "Scythe daemon"
    );

    // Production reads gas pressure from the fee oracle; test and
    // development run fully stubbed.
    match config.environment {
        Environment::Production => Daemon::with_fee_oracle(config)?.run().await?,
        _ => Daemon::new_stub(config)?.run().await?,
    }

    Ok(())
}
