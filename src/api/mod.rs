//! Stateless REST API over the rate-impact engine.
//!
//! Endpoints:
//! - `GET /defaults`: default study configuration
//! - `POST /trajectories`: four scenario trajectories
//! - `POST /summary`: trajectories plus summary statistics
//! - `POST /capacity-price`: reserve margins and scarcity price
//! - `POST /revenue-adequacy`: whether a load pays its cost to serve

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::StudyConfig;
use crate::model::RateImpactEngine;

pub use types::{
    CapacityPriceRequest, ErrorResponse, RevenueAdequacyRequest, StudyRequest, SummaryResponse,
};

/// Immutable application state shared across all request handlers.
///
/// Every request recomputes from its own body, so no locks are needed.
pub struct AppState {
    /// Engine with the server's modeling assumptions.
    pub engine: RateImpactEngine,
    /// Study returned by `GET /defaults`.
    pub defaults: StudyConfig,
}

impl AppState {
    /// State serving `study` as the defaults, with its assumptions.
    pub fn from_study(study: StudyConfig) -> Self {
        Self {
            engine: study.engine(),
            defaults: study,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/defaults", get(handlers::get_defaults))
        .route("/utilities", get(handlers::get_utilities))
        .route("/utilities/{id}", get(handlers::get_utility_study))
        .route("/trajectories", post(handlers::post_trajectories))
        .route("/summary", post(handlers::post_summary))
        .route("/capacity-price", post(handlers::post_capacity_price))
        .route("/revenue-adequacy", post(handlers::post_revenue_adequacy))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
