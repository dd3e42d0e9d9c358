//! API request and response types.
//!
//! Request bodies reuse the engine records, so omitted fields take the same
//! defaults as a TOML study.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PROJECTION_YEARS;
use crate::error::EngineError;
use crate::model::{
    AllTrajectories, DataCenterLoadProfile, SummaryStats, TariffStructure, UtilityProfile,
};

/// Body for `/trajectories` and `/summary`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyRequest {
    /// Host utility.
    pub utility: UtilityProfile,
    /// New large load.
    pub data_center: DataCenterLoadProfile,
    /// Projection horizon in years.
    pub years: usize,
}

impl Default for StudyRequest {
    fn default() -> Self {
        Self {
            utility: UtilityProfile::default(),
            data_center: DataCenterLoadProfile::default(),
            years: DEFAULT_PROJECTION_YEARS,
        }
    }
}

/// Body for `/capacity-price`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapacityPriceRequest {
    /// Host utility.
    #[serde(default)]
    pub utility: UtilityProfile,
    /// Peak the new load adds (MW).
    pub incremental_peak_mw: f64,
}

/// Body for `/revenue-adequacy`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevenueAdequacyRequest {
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Load factor (0.0–1.0).
    pub load_factor: f64,
    /// Share of nameplate at system peak (0.0–1.0).
    pub peak_coincidence: f64,
    /// Tariff billed to the load.
    #[serde(default)]
    pub tariff: TariffStructure,
    /// Host utility.
    #[serde(default)]
    pub utility: UtilityProfile,
    /// On-site generation (MW).
    #[serde(default)]
    pub onsite_generation_mw: f64,
}

/// Trajectories together with their summary.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Four scenario trajectories.
    pub trajectories: AllTrajectories,
    /// Summary statistics.
    pub summary: SummaryStats,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Offending field path, when the error names one.
    pub field: Option<String>,
}

impl From<&EngineError> for ErrorResponse {
    fn from(e: &EngineError) -> Self {
        Self {
            error: e.to_string(),
            field: e.field().map(str::to_string),
        }
    }
}
