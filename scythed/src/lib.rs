//! Scythe Daemon Library
//!
//! Runtime orchestrator for the scythe harvest strategy.
//!
//! # Architecture
//!
//! ```text
//! CLI → API Server → Harvester → Rebalancer → Gauge / Swap venues
//!                        ↑
//!                   Keeper loop (trigger polling)
//!                        ↑
//!                   Gas oracle
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **Keeper**: Polls the harvest trigger and runs harvest cycles
//! - **API**: HTTP endpoints for position and harvest inspection
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use scythed::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::new_stub(config).expect("Failed to wire daemon");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod keeper;

// Re-exports for convenience
pub use config::{ApiConfig, Config, Environment, GasConfig, KeeperConfig, StrategyParams};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use keeper::Keeper;
