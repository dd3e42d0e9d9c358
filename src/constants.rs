//! Named model constants.
//!
//! Every literal the rate-impact model depends on lives here so scenario
//! comparisons stay internally consistent. Values a study may want to tune are
//! mirrored into [`ModelAssumptions`](crate::model::types::ModelAssumptions);
//! the rest are structural and fixed for a given [`MODEL_VERSION`].

/// Version of this constants table. Bump when any value below changes.
pub const MODEL_VERSION: &str = "2025.1";

// -- Time --

/// Calendar year of projection index 0.
pub const BASE_YEAR: u32 = 2025;
/// Default projection horizon (years).
pub const DEFAULT_PROJECTION_YEARS: usize = 20;
/// Shortest accepted projection horizon (years).
pub const MIN_PROJECTION_YEARS: usize = 5;
/// Longest accepted projection horizon (years).
pub const MAX_PROJECTION_YEARS: usize = 30;
/// Projection index at which the data center energizes.
pub const ONLINE_YEAR_INDEX: usize = 2;
/// Fraction of the load served in its first online year.
pub const FIRST_YEAR_PHASE_IN: f64 = 0.5;
/// Hours per year.
pub const HOURS_PER_YEAR: f64 = 8760.0;
/// Days per year, used to annualize $/MW-day capacity prices.
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Months per year.
pub const MONTHS_PER_YEAR: f64 = 12.0;

// -- Baseline escalation --

/// General inflation rate.
pub const GENERAL_INFLATION: f64 = 0.025;
/// Annual cost growth from replacing aging infrastructure.
pub const INFRASTRUCTURE_AGING: f64 = 0.015;
/// Annual cost growth from grid modernization programs.
pub const GRID_MODERNIZATION: f64 = 0.005;

// -- Infrastructure and capacity costs --

/// Embedded transmission cost per MW of peak ($).
pub const TRANSMISSION_COST_PER_MW: f64 = 350_000.0;
/// Embedded distribution cost per MW of peak ($).
pub const DISTRIBUTION_COST_PER_MW: f64 = 150_000.0;
/// Forward-looking capacity cost ($/MW-year).
pub const CAPACITY_COST_PER_MW_YEAR: f64 = 150_000.0;
/// Amortization life for grid assets (years).
pub const ASSET_LIFE_YEARS: f64 = 20.0;

// -- Data center rate structure --

/// Total demand charge ($/MW-month).
pub const DEMAND_CHARGE_PER_MW_MONTH: f64 = 9_050.0;
/// Share of the demand charge billed on coincident peak (the rest is NCP).
pub const COINCIDENT_PEAK_CHARGE_SHARE: f64 = 0.60;
/// Utility margin on energy sold to the data center ($/MWh).
pub const ENERGY_MARGIN_PER_MWH: f64 = 4.88;
/// ERCOT-style 4CP transmission rate ($/kW-month).
pub const FOUR_CP_TRANSMISSION_RATE_PER_KW_MONTH: f64 = 5.50;

// -- Revenue flow-through --

/// Share of energy margin credited to other ratepayers.
pub const ENERGY_MARGIN_FLOW_THROUGH: f64 = 0.85;
/// Energy margin flow-through in energy-only markets.
pub const ENERGY_ONLY_ENERGY_MARGIN_FLOW_THROUGH: f64 = 0.90;
/// Share of demand-charge revenue credited to other ratepayers.
pub const DEMAND_CHARGE_FLOW_THROUGH: f64 = 0.15;

// -- Capacity credits --

/// Credit per curtailable MW, as a share of capacity cost.
pub const DEMAND_RESPONSE_CREDIT: f64 = 0.80;
/// Curtailment credit where a capacity market values demand response.
pub const CAPACITY_MARKET_DEMAND_RESPONSE_CREDIT: f64 = 0.90;
/// Credit per MW of on-site dispatchable generation.
pub const ONSITE_GENERATION_CREDIT: f64 = 0.95;

// -- Market adjustments --

/// Weight of the clearing price in the capacity-market cost blend.
pub const CAPACITY_PRICE_BLEND: f64 = 0.5;
/// Capacity cost share carried in energy-only markets.
pub const ENERGY_ONLY_CAPACITY_COST_SHARE: f64 = 0.50;
/// Embedded transmission share kept as interconnection facilities under 4CP.
pub const ENERGY_ONLY_INTERCONNECTION_SHARE: f64 = 0.30;
/// Residential allocation multiplier under 4CP transmission allocation.
pub const ENERGY_ONLY_ALLOCATION_MULTIPLIER: f64 = 0.70;
/// Clearing price above which capacity costs raise the residential share ($/MW-day).
pub const HIGH_CAPACITY_PRICE_THRESHOLD: f64 = 100.0;
/// Price span over which the allocation multiplier grows by 1.0 ($/MW-day).
pub const HIGH_CAPACITY_PRICE_SPAN: f64 = 1_000.0;
/// Upper bound of the high-price allocation multiplier.
pub const HIGH_CAPACITY_PRICE_MAX_MULTIPLIER: f64 = 1.15;
/// Default share of capacity costs passed through to retail rates.
pub const DEFAULT_CAPACITY_COST_PASS_THROUGH: f64 = 0.40;

// -- Residential allocation --

/// Weight of the volumetric (energy) share in the blended allocation.
pub const VOLUMETRIC_WEIGHT: f64 = 0.40;
/// Weight of the demand (peak) share in the blended allocation.
pub const DEMAND_WEIGHT: f64 = 0.40;
/// Weight of the customer-count share in the blended allocation.
pub const CUSTOMER_WEIGHT: f64 = 0.20;
/// Residential class share of the pre-load system peak.
pub const RESIDENTIAL_PEAK_SHARE: f64 = 0.45;
/// Years for the new load's energy and peak to fully enter the allocators.
pub const LOAD_PHASE_IN_YEARS: f64 = 3.0;
/// Years for rate cases to fully adopt the new allocation.
pub const REGULATORY_LAG_YEARS: f64 = 5.0;
/// Lower bound of the residential allocation.
pub const MIN_RESIDENTIAL_ALLOCATION: f64 = 0.15;
/// Upper bound of the residential allocation.
pub const MAX_RESIDENTIAL_ALLOCATION: f64 = 0.50;
/// Default residential allocation before the new load.
pub const DEFAULT_BASE_RESIDENTIAL_ALLOCATION: f64 = 0.40;

// -- Capacity price curve --

/// Reserve margin below which the system is short of capacity.
pub const SCARCITY_RESERVE_MARGIN: f64 = 0.15;
/// Reserve margin below which reliability is at risk.
pub const CRITICAL_RESERVE_MARGIN: f64 = 0.05;
/// Exponential steepness of the price curve below the scarcity margin.
pub const SCARCITY_CURVE_STEEPNESS: f64 = 10.0;
/// Ceiling on the scarcity price relative to the starting price.
pub const MAX_CAPACITY_PRICE_MULTIPLIER: f64 = 4.0;
/// Reserve margin assumed when a utility reports no generation data.
pub const DEFAULT_RESERVE_MARGIN: f64 = 0.15;
/// Reported margins further apart than this from generation/peak data are logged.
pub const RESERVE_MARGIN_TOLERANCE: f64 = 0.01;

// -- Benefit escalation damping --

/// Damping of inflation on benefits for the firm scenario.
pub const FIRM_BENEFIT_DAMPING: f64 = 0.80;
/// Damping of inflation on benefits for the flexible scenario.
pub const FLEXIBLE_BENEFIT_DAMPING: f64 = 0.90;
/// Damping of inflation on benefits for the dispatchable scenario.
pub const DISPATCHABLE_BENEFIT_DAMPING: f64 = 0.95;

// -- Revenue adequacy --

/// Ceiling reported for the revenue adequacy ratio.
pub const MAX_REVENUE_ADEQUACY_RATIO: f64 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_weights_sum_to_one() {
        let sum = VOLUMETRIC_WEIGHT + DEMAND_WEIGHT + CUSTOMER_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn baseline_escalation_is_four_and_a_half_percent() {
        let rate = GENERAL_INFLATION + INFRASTRUCTURE_AGING + GRID_MODERNIZATION;
        assert!((rate - 0.045).abs() < 1e-12);
    }

    #[test]
    fn thresholds_are_ordered() {
        assert!(CRITICAL_RESERVE_MARGIN < SCARCITY_RESERVE_MARGIN);
        assert!(MIN_RESIDENTIAL_ALLOCATION < MAX_RESIDENTIAL_ALLOCATION);
        assert!(FIRM_BENEFIT_DAMPING < FLEXIBLE_BENEFIT_DAMPING);
        assert!(FLEXIBLE_BENEFIT_DAMPING < DISPATCHABLE_BENEFIT_DAMPING);
    }
}
