//! Scythe Strategy Layer
//!
//! The harvest-and-rebalance engine: moves deposited collateral between
//! idle balance and the gauge, claims and converts rewards, and reports
//! profit/loss back to the vault.
//!
//! # Architecture
//!
//! ```text
//! Keeper tick → Trigger Policy → Harvester → Ports (vault/gauge/swap) → Report
//! ```
//!
//! # Components
//!
//! - **Ports**: Traits for the external collaborators (vault, gauge,
//!   swap venue, token account, gas oracle)
//! - **Ledger**: Read-only idle/staked position composition
//! - **Rebalancer**: Deposit/withdraw movement with honest loss accounting
//! - **Harvester**: The per-cycle claim → convert → settle state machine
//! - **Stub**: Test implementations of every port
//!
//! # Example
//!
//! ```rust,ignore
//! use scythe_strategy::{Harvester, StrategyConfig, StubBank, StubGauge, StubSwap, StubVault};
//! use std::sync::Arc;
//!
//! let bank = Arc::new(StubBank::new());
//! let gauge = Arc::new(StubGauge::new(bank.clone(), want, crv));
//! let swap = Arc::new(StubSwap::new(bank.clone()));
//! let vault = Arc::new(StubVault::new());
//!
//! let mut harvester = Harvester::new(vault, gauge, swap, bank, governance, config, trigger);
//! let report = harvester.harvest().await?;
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod harvester;
pub mod ledger;
pub mod ports;
pub mod rebalancer;
pub mod stub;

// Re-exports for convenience
pub use config::{GovernanceKey, StrategyConfig};
pub use error::{StrategyError, StrategyResult};
pub use harvester::Harvester;
pub use ledger::PositionLedger;
pub use ports::{GasOraclePort, GaugePort, Recipient, SwapPort, TokenPort, VaultPort};
pub use rebalancer::{LiquidationOutcome, Rebalancer};
pub use stub::{StubBank, StubGasOracle, StubGauge, StubSwap, StubVault};
