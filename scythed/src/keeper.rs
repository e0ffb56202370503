//! Keeper: periodic harvest scheduler.
//!
//! Polls the harvest trigger on a fixed interval. When the trigger
//! fires, runs one harvest cycle and redeposits the idle balance the
//! vault left with the strategy. Gas pressure is read from the oracle
//! on every poll; an unreachable oracle counts as unacceptable gas so
//! only the absolute deadline can force a harvest through.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use scythe_domain::HarvestReport;
use scythe_strategy::{GasOraclePort, GaugePort, Harvester, SwapPort, TokenPort, VaultPort};

use crate::error::DaemonResult;

// =============================================================================
// Keeper
// =============================================================================

/// Drives the harvester on a schedule.
pub struct Keeper<V, G, S, T, O>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
    O: GasOraclePort + 'static,
{
    harvester: Arc<RwLock<Harvester<V, G, S, T>>>,
    gas_oracle: Arc<O>,
    last_report: Arc<RwLock<Option<HarvestReport>>>,
    poll_interval: Duration,
}

impl<V, G, S, T, O> Keeper<V, G, S, T, O>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
    O: GasOraclePort + 'static,
{
    /// Create a keeper around a shared harvester.
    pub fn new(
        harvester: Arc<RwLock<Harvester<V, G, S, T>>>,
        gas_oracle: Arc<O>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            harvester,
            gas_oracle,
            last_report: Arc::new(RwLock::new(None)),
            poll_interval,
        }
    }

    /// Handle to the most recent harvest report, shared with the API.
    pub fn last_report(&self) -> Arc<RwLock<Option<HarvestReport>>> {
        self.last_report.clone()
    }

    /// Evaluate the trigger once and harvest if it fires.
    ///
    /// Returns the report when a harvest ran, `None` when the trigger
    /// declined.
    pub async fn tick(&self) -> DaemonResult<Option<HarvestReport>> {
        let gas_acceptable = match self.gas_oracle.gas_acceptable().await {
            Ok(acceptable) => acceptable,
            Err(e) => {
                warn!(error = %e, "Gas oracle unavailable, treating gas as unacceptable");
                false
            }
        };

        let decision = {
            let harvester = self.harvester.read().await;
            harvester.harvest_trigger(Utc::now(), gas_acceptable).await?
        };

        let Some(reason) = decision else {
            return Ok(None);
        };

        info!(?reason, "Harvest trigger fired");

        let mut harvester = self.harvester.write().await;
        let report = harvester.harvest().await?;
        let invested = harvester.invest_idle().await?;

        info!(
            harvest_id = %report.id,
            profit = %report.profit,
            loss = %report.loss,
            debt_payment = %report.debt_payment,
            %invested,
            "Harvest cycle complete"
        );

        *self.last_report.write().await = Some(report);
        Ok(Some(report))
    }

    /// Run the polling loop until shutdown is requested.
    pub async fn run(&self) -> DaemonResult<()> {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(poll_interval = ?self.poll_interval, "Keeper loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // A failed cycle leaves state untouched; retry next tick.
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "Harvest cycle failed");
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    return Ok(());
                }
            }
        }
    }
}
