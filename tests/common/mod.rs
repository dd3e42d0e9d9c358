//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rate_impact_sim::model::{
    AllTrajectories, DataCenterLoadProfile, MarketType, RateImpactEngine, UtilityProfile,
};

/// Default projection horizon used by most tests.
pub const YEARS: usize = 20;

/// Default utility (560,000 residential customers, $130 bill, 4,000 MW peak).
pub fn default_utility() -> UtilityProfile {
    UtilityProfile::default()
}

/// Capacity-market utility with a 4,000 MW peak and the given generation.
pub fn capacity_market_utility(generation_mw: f64) -> UtilityProfile {
    UtilityProfile {
        has_capacity_market: true,
        market_type: MarketType::IsoCapacityMarket,
        total_generation_capacity_mw: Some(generation_mw),
        capacity_price_2024: Some(100.0),
        ..UtilityProfile::default()
    }
}

/// Default 1 GW data center with 200 MW on-site generation.
pub fn default_data_center() -> DataCenterLoadProfile {
    DataCenterLoadProfile::default()
}

/// Engine with default assumptions.
pub fn engine() -> RateImpactEngine {
    RateImpactEngine::default()
}

/// All four trajectories for the default study.
pub fn default_trajectories() -> AllTrajectories {
    engine()
        .compute_all_trajectories(&default_utility(), &default_data_center(), YEARS)
        .expect("default study should project")
}
