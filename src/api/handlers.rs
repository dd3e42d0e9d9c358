//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::debug;

use super::AppState;
use super::types::{
    CapacityPriceRequest, ErrorResponse, RevenueAdequacyRequest, StudyRequest, SummaryResponse,
};
use crate::config::StudyConfig;
use crate::error::EngineError;
use crate::model::{AllTrajectories, CapacityPriceResult, RevenueAdequacyResult};
use crate::profiles::{self, UTILITY_PROFILES, UtilityEntry};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn bad_request(e: &EngineError) -> (StatusCode, Json<ErrorResponse>) {
    debug!(error = %e, "rejecting request");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(e)))
}

/// Returns the server's default study.
///
/// `GET /defaults` → 200 + `StudyConfig` JSON
pub async fn get_defaults(State(state): State<Arc<AppState>>) -> Json<StudyConfig> {
    Json(state.defaults.clone())
}

/// Lists the utility catalog.
///
/// `GET /utilities` → 200 + `[UtilityEntry]` JSON
pub async fn get_utilities() -> Json<&'static [UtilityEntry]> {
    Json(UTILITY_PROFILES)
}

/// Study for one catalog utility.
///
/// `GET /utilities/{id}` → 200 + `StudyConfig` JSON, or 404 + `ErrorResponse`
pub async fn get_utility_study(Path(id): Path<String>) -> ApiResult<StudyConfig> {
    profiles::study_for(&id).map(Json).map_err(|e| {
        debug!(error = %e, "unknown utility");
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.message,
                field: Some(e.field),
            }),
        )
    })
}

/// Projects all four scenarios.
///
/// `POST /trajectories` → 200 + `AllTrajectories` JSON, or 400 + `ErrorResponse`
pub async fn post_trajectories(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StudyRequest>,
) -> ApiResult<AllTrajectories> {
    state
        .engine
        .compute_all_trajectories(&req.utility, &req.data_center, req.years)
        .map(Json)
        .map_err(|e| bad_request(&e))
}

/// Projects all four scenarios and summarizes them.
///
/// `POST /summary` → 200 + `SummaryResponse` JSON, or 400 + `ErrorResponse`
pub async fn post_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StudyRequest>,
) -> ApiResult<SummaryResponse> {
    let trajectories = state
        .engine
        .compute_all_trajectories(&req.utility, &req.data_center, req.years)
        .map_err(|e| bad_request(&e))?;
    let summary = state
        .engine
        .compute_summary(&trajectories, &req.utility)
        .map_err(|e| bad_request(&e))?;
    Ok(Json(SummaryResponse {
        trajectories,
        summary,
    }))
}

/// Reserve margins and scarcity price for an incremental peak.
///
/// `POST /capacity-price` → 200 + `CapacityPriceResult` JSON, or 400
pub async fn post_capacity_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CapacityPriceRequest>,
) -> ApiResult<CapacityPriceResult> {
    state
        .engine
        .compute_capacity_price(&req.utility, req.incremental_peak_mw)
        .map(Json)
        .map_err(|e| bad_request(&e))
}

/// Whether a load's tariff payments cover its cost to serve.
///
/// `POST /revenue-adequacy` → 200 + `RevenueAdequacyResult` JSON, or 400
pub async fn post_revenue_adequacy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevenueAdequacyRequest>,
) -> ApiResult<RevenueAdequacyResult> {
    state
        .engine
        .compute_revenue_adequacy(
            req.capacity_mw,
            req.load_factor,
            req.peak_coincidence,
            &req.tariff,
            &req.utility,
            req.onsite_generation_mw,
        )
        .map(Json)
        .map_err(|e| bad_request(&e))
}
