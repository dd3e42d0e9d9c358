//! Rate-impact engine: capacity pricing, cost allocation, bill impact,
//! revenue adequacy, trajectories and summaries.

pub mod adequacy;
pub mod allocation;
pub mod capacity;
pub mod impact;
pub mod summary;
pub mod trajectory;
pub mod types;

pub use adequacy::RevenueAdequacyResult;
pub use capacity::CapacityPriceResult;
pub use impact::ImpactMetrics;
pub use summary::SummaryStats;
pub use trajectory::{AllTrajectories, RateImpactEngine, YearRecord};
pub use types::{
    DataCenterLoadProfile, Interconnection, MarketType, ModelAssumptions, Scenario,
    TariffStructure, UtilityProfile,
};
