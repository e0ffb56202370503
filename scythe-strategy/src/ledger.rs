//! Position Ledger: read-only view composition.
//!
//! Composes the strategy's idle want balance with the gauge-reported
//! staked balance. Nothing here mutates state; the snapshot is derived
//! on demand and never stored.

use std::sync::Arc;

use scythe_domain::{Amount, Asset, Position};

use crate::error::StrategyResult;
use crate::ports::{GaugePort, TokenPort};

/// Read-only composition of idle and staked balances.
pub struct PositionLedger<G: GaugePort, T: TokenPort> {
    gauge: Arc<G>,
    token: Arc<T>,
    want: Asset,
}

impl<G: GaugePort, T: TokenPort> PositionLedger<G, T> {
    /// Create a ledger over the given ports.
    pub fn new(gauge: Arc<G>, token: Arc<T>, want: Asset) -> Self {
        Self { gauge, token, want }
    }

    /// Unstaked want held directly by the strategy.
    pub async fn idle_balance(&self) -> StrategyResult<Amount> {
        self.token.balance_of(&self.want).await
    }

    /// Want deposited at the gauge, as the gauge reports it.
    pub async fn staked_balance(&self) -> StrategyResult<Amount> {
        self.gauge.staked_balance().await
    }

    /// Idle plus staked, as a checked sum.
    pub async fn estimated_total_assets(&self) -> StrategyResult<Amount> {
        Ok(self.snapshot().await?.total()?)
    }

    /// A full position snapshot.
    pub async fn snapshot(&self) -> StrategyResult<Position> {
        let idle = self.idle_balance().await?;
        let staked = self.staked_balance().await?;
        Ok(Position::new(idle, staked))
    }
}

impl<G: GaugePort, T: TokenPort> Clone for PositionLedger<G, T> {
    fn clone(&self) -> Self {
        Self {
            gauge: self.gauge.clone(),
            token: self.token.clone(),
            want: self.want.clone(),
        }
    }
}
