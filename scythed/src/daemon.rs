//! Daemon: Main runtime orchestrator.
//!
//! Ties together the harvester, the keeper loop, the gas oracle, and
//! the HTTP API.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Wire the harvester against its venues
//! 3. Start API server
//! 4. Keeper loop (poll trigger, harvest, reinvest)
//! 5. Graceful shutdown on SIGINT

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info};

use scythe_connectors::FeeOracleClient;
use scythe_domain::{Amount, TriggerState};
use scythe_strategy::{
    GasOraclePort, GaugePort, GovernanceKey, Harvester, StubBank, StubGasOracle, StubGauge,
    StubSwap, StubVault, SwapPort, TokenPort, VaultPort,
};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::keeper::Keeper;

// =============================================================================
// Daemon
// =============================================================================

/// The main scythe daemon.
pub struct Daemon<V, G, S, T, O>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
    O: GasOraclePort + 'static,
{
    /// Configuration
    config: Config,
    /// The harvester, shared between keeper and API
    harvester: Arc<RwLock<Harvester<V, G, S, T>>>,
    /// The keeper loop
    keeper: Keeper<V, G, S, T, O>,
    /// Governance capability for the wired harvester
    governance: GovernanceKey,
}

impl Daemon<StubVault, StubGauge, StubSwap, StubBank, StubGasOracle> {
    /// Create a daemon with stub venues (for testing/development).
    pub fn new_stub(config: Config) -> DaemonResult<Self> {
        let (harvester, governance) = Self::wire_stub_harvester(&config)?;
        let harvester = Arc::new(RwLock::new(harvester));
        let gas_oracle = Arc::new(StubGasOracle::new(true));
        let keeper = Keeper::new(
            harvester.clone(),
            gas_oracle,
            config.keeper.poll_interval,
        );

        Ok(Self {
            config,
            harvester,
            keeper,
            governance,
        })
    }
}

impl Daemon<StubVault, StubGauge, StubSwap, StubBank, FeeOracleClient> {
    /// Create a daemon with stub venues and a live fee oracle.
    pub fn with_fee_oracle(config: Config) -> DaemonResult<Self> {
        let (harvester, governance) = Self::wire_stub_harvester(&config)?;
        let harvester = Arc::new(RwLock::new(harvester));
        let gas_oracle = Arc::new(FeeOracleClient::new(
            config.gas.endpoint.clone(),
            config.gas.max_fee_gwei,
        )?);
        let keeper = Keeper::new(
            harvester.clone(),
            gas_oracle,
            config.keeper.poll_interval,
        );

        Ok(Self {
            config,
            harvester,
            keeper,
            governance,
        })
    }
}

impl<O> Daemon<StubVault, StubGauge, StubSwap, StubBank, O>
where
    O: GasOraclePort + 'static,
{
    fn wire_stub_harvester(
        config: &Config,
    ) -> DaemonResult<(
        Harvester<StubVault, StubGauge, StubSwap, StubBank>,
        GovernanceKey,
    )> {
        let strategy_config = config.strategy.build()?;

        let bank = Arc::new(StubBank::new());
        let gauge = Arc::new(StubGauge::new(
            bank.clone(),
            strategy_config.want.clone(),
            strategy_config.primary_reward.clone(),
        ));
        let swap = Arc::new(StubSwap::new(bank.clone()));
        let vault = Arc::new(StubVault::new());

        let trigger = TriggerState::new(
            config.keeper.min_report_delay,
            config.keeper.max_report_delay,
        )?;
        let governance = GovernanceKey::generate();

        let harvester = Harvester::new(
            vault,
            gauge,
            swap,
            bank,
            governance.clone(),
            strategy_config,
            trigger,
        );

        Ok((harvester, governance))
    }
}

impl<V, G, S, T, O> Daemon<V, G, S, T, O>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
    O: GasOraclePort + 'static,
{
    /// Governance capability for the wired harvester.
    pub fn governance(&self) -> GovernanceKey {
        self.governance.clone()
    }

    /// Shared handle to the harvester.
    pub fn harvester(&self) -> Arc<RwLock<Harvester<V, G, S, T>>> {
        self.harvester.clone()
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            "Starting scythe daemon"
        );

        let api_addr = self.start_api_server().await?;
        info!(%api_addr, "API server started");

        self.keeper.run().await?;

        self.shutdown().await
    }

    /// Start the API server.
    async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let state = Arc::new(ApiState {
            harvester: self.harvester.clone(),
            last_report: self.keeper.last_report(),
        });

        let router = create_router(state);
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| DaemonError::Config(format!("Failed to get local address: {}", e)))?;

        // Spawn the server task
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "API server error");
            }
        });

        Ok(local_addr)
    }

    /// Graceful shutdown.
    async fn shutdown(&self) -> DaemonResult<()> {
        info!("Initiating graceful shutdown");

        let harvester = self.harvester.read().await;
        let position = harvester.position().await?;
        let total = position.total().unwrap_or(Amount::ZERO);
        info!(
            idle = %position.idle,
            staked = %position.staked,
            %total,
            "Shutdown complete"
        );

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
