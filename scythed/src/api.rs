//! HTTP API for the scythe daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Position (idle / staked / total balances)
//! - Last harvest report
//! - Strategy summary

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use scythe_domain::HarvestReport;
use scythe_strategy::{GaugePort, Harvester, SwapPort, TokenPort, VaultPort};

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<V, G, S, T>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
{
    /// The harvester shared with the keeper loop
    pub harvester: Arc<RwLock<Harvester<V, G, S, T>>>,
    /// Most recent harvest report, written by the keeper
    pub last_report: Arc<RwLock<Option<HarvestReport>>>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Position response.
///
/// Amounts are base units rendered as strings so clients never lose
/// precision to JSON number limits.
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub idle: String,
    pub staked: String,
    pub total: String,
}

/// Strategy summary response.
#[derive(Debug, Serialize)]
pub struct StrategyResponse {
    pub want: String,
    pub primary_reward: String,
    pub conversion_route: String,
    pub keep_bps: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_reward: Option<String>,
}

/// Last harvest response.
#[derive(Debug, Serialize)]
pub struct HarvestResponse {
    pub id: Uuid,
    pub profit: String,
    pub loss: String,
    pub debt_payment: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<V, G, S, T>(state: Arc<ApiState<V, G, S, T>>) -> Router
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/position", get(position_handler))
        .route("/strategy", get(strategy_handler))
        .route("/last-harvest", get(last_harvest_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Current idle and staked balances.
async fn position_handler<V, G, S, T>(
    State(state): State<Arc<ApiState<V, G, S, T>>>,
) -> Result<Json<PositionResponse>, (StatusCode, Json<ErrorResponse>)>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
{
    let harvester = state.harvester.read().await;
    let position = harvester.position().await.map_err(internal_error)?;
    let total = position.total().map_err(internal_error)?;

    Ok(Json(PositionResponse {
        idle: position.idle.to_string(),
        staked: position.staked.to_string(),
        total: total.to_string(),
    }))
}

/// Static strategy wiring.
async fn strategy_handler<V, G, S, T>(
    State(state): State<Arc<ApiState<V, G, S, T>>>,
) -> Json<StrategyResponse>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
{
    let harvester = state.harvester.read().await;
    let config = harvester.config();

    Json(StrategyResponse {
        want: config.want.to_string(),
        primary_reward: config.primary_reward.to_string(),
        conversion_route: config.conversion_route.to_string(),
        keep_bps: config.reward.keep_bps.as_u16(),
        secondary_reward: config
            .reward
            .secondary_reward
            .as_ref()
            .map(|a| a.to_string()),
    })
}

/// Most recent harvest report, 404 before the first harvest.
async fn last_harvest_handler<V, G, S, T>(
    State(state): State<Arc<ApiState<V, G, S, T>>>,
) -> Result<Json<HarvestResponse>, (StatusCode, Json<ErrorResponse>)>
where
    V: VaultPort + 'static,
    G: GaugePort + 'static,
    S: SwapPort + 'static,
    T: TokenPort + 'static,
{
    let report = state.last_report.read().await;

    match *report {
        Some(report) => Ok(Json(HarvestResponse {
            id: report.id,
            profit: report.profit.to_string(),
            loss: report.loss.to_string(),
            debt_payment: report.debt_payment.to_string(),
            completed_at: report.completed_at,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No harvest has completed yet".to_string(),
            }),
        )),
    }
}

fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
