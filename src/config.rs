//! TOML-based study configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_PROJECTION_YEARS;
use crate::error::EngineError;
use crate::model::types::validate_projection_years;
use crate::model::{
    DataCenterLoadProfile, MarketType, ModelAssumptions, RateImpactEngine, TariffStructure,
    UtilityProfile,
};

/// Top-level study configuration parsed from TOML.
///
/// Every section has defaults matching the `regulated` preset. Load from
/// TOML with [`StudyConfig::from_toml_file`] or use [`StudyConfig::from_preset`]
/// for a built-in market profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Projection horizon.
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Host utility.
    #[serde(default)]
    pub utility: UtilityProfile,
    /// New large load.
    #[serde(default)]
    pub data_center: DataCenterLoadProfile,
    /// Tariff the load is billed under (revenue adequacy only).
    #[serde(default)]
    pub tariff: TariffStructure,
    /// Modeling assumptions.
    #[serde(default)]
    pub assumptions: ModelAssumptions,
}

/// Projection horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Years to project beyond the current year (5–30).
    pub years: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            years: DEFAULT_PROJECTION_YEARS,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"utility.system_peak_mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl From<EngineError> for ConfigError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidParameter { field, constraint }
            | EngineError::InconsistentMarketConfig { field, constraint } => Self {
                field,
                message: constraint,
            },
            other @ EngineError::NonFiniteResult { .. } => Self {
                field: "engine".to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl StudyConfig {
    /// Default vertically integrated utility with the default 1 GW load.
    pub fn regulated() -> Self {
        Self::default()
    }

    /// Large PJM utility facing 2024 capacity auction prices.
    pub fn pjm() -> Self {
        Self {
            utility: UtilityProfile {
                residential_customers: 2_500_000,
                commercial_customers: 270_000,
                industrial_customers: 30_000,
                average_monthly_bill: 145.0,
                system_peak_mw: 18_000.0,
                total_generation_capacity_mw: Some(21_240.0),
                has_capacity_market: true,
                capacity_price_2024: Some(269.92),
                market_type: MarketType::IsoCapacityMarket,
                base_residential_allocation: 0.35,
                capacity_cost_pass_through: 0.50,
                pre_dc_system_energy_gwh: 86_000.0,
                ..UtilityProfile::default()
            },
            data_center: DataCenterLoadProfile {
                capacity_mw: 1_500.0,
                onsite_generation_mw: 300.0,
                ..DataCenterLoadProfile::default()
            },
            ..Self::default()
        }
    }

    /// Mid-size MISO utility with low capacity prices.
    pub fn miso() -> Self {
        Self {
            utility: UtilityProfile {
                total_generation_capacity_mw: Some(4_720.0),
                has_capacity_market: true,
                capacity_price_2024: Some(30.0),
                market_type: MarketType::IsoCapacityMarket,
                base_residential_allocation: 0.38,
                capacity_cost_pass_through: 0.35,
                ..UtilityProfile::default()
            },
            ..Self::default()
        }
    }

    /// ERCOT-wide energy-only market with 4CP transmission allocation.
    pub fn ercot() -> Self {
        Self {
            utility: UtilityProfile {
                residential_customers: 12_000_000,
                commercial_customers: 13_500_000,
                industrial_customers: 500_000,
                average_monthly_bill: 140.0,
                system_peak_mw: 85_508.0,
                market_type: MarketType::EnergyOnly,
                base_residential_allocation: 0.30,
                capacity_cost_pass_through: 0.25,
                pre_dc_system_energy_gwh: 450_000.0,
                ..UtilityProfile::default()
            },
            data_center: DataCenterLoadProfile {
                capacity_mw: 3_000.0,
                onsite_generation_mw: 600.0,
                ..DataCenterLoadProfile::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["regulated", "pjm", "miso", "ercot"];

    /// Loads a study from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "regulated" => Ok(Self::regulated()),
            "pjm" => Ok(Self::pjm()),
            "miso" => Ok(Self::miso()),
            "ercot" => Ok(Self::ercot()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a study from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a study from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all sections and returns every violation.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors: Vec<ConfigError> = Vec::new();
        if let Err(e) = validate_projection_years(self.projection.years) {
            errors.push(e.into());
        }
        errors.extend(self.utility.violations().into_iter().map(ConfigError::from));
        errors.extend(self.data_center.violations().into_iter().map(ConfigError::from));
        errors.extend(self.tariff.violations().into_iter().map(ConfigError::from));
        errors.extend(self.assumptions.violations().into_iter().map(ConfigError::from));
        errors
    }

    /// Engine configured with this study's assumptions.
    pub fn engine(&self) -> RateImpactEngine {
        RateImpactEngine::new(self.assumptions.clone())
    }
}
