//! Residential cost-allocation model.
//!
//! Blends volumetric, demand, and customer-count shares, then lags the shift
//! away from the utility's pre-load allocation over the rate-case cycle.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CUSTOMER_WEIGHT, DEMAND_WEIGHT, HOURS_PER_YEAR, LOAD_PHASE_IN_YEARS,
    MAX_RESIDENTIAL_ALLOCATION, MIN_RESIDENTIAL_ALLOCATION, REGULATORY_LAG_YEARS,
    RESIDENTIAL_PEAK_SHARE, VOLUMETRIC_WEIGHT,
};

use super::types::UtilityProfile;

/// Residential allocation for one projection year, with its component shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Clamped residential allocation (0.15–0.50).
    pub allocation: f64,
    /// Residential share of post-load system energy.
    pub volumetric_share: f64,
    /// Residential share of post-load system peak.
    pub demand_share: f64,
    /// Residential share of accounts.
    pub customer_share: f64,
    /// Fraction of the new load's energy and peak counted this year.
    pub phase_in_factor: f64,
    /// Fraction of the way from the base allocation to the blended one.
    pub regulatory_lag_factor: f64,
}

/// Computes the residential allocation after the new load has been online
/// for `years_online` years.
///
/// Inputs are assumed validated; the result is always clamped to
/// `[MIN_RESIDENTIAL_ALLOCATION, MAX_RESIDENTIAL_ALLOCATION]`.
pub fn residential_allocation(
    utility: &UtilityProfile,
    dc_capacity_mw: f64,
    dc_load_factor: f64,
    dc_peak_coincidence: f64,
    years_online: usize,
) -> AllocationResult {
    let years_online = years_online as f64;
    let phase_in_factor = (years_online / LOAD_PHASE_IN_YEARS).min(1.0);

    let pre_dc_energy_mwh = utility.pre_dc_system_energy_gwh * 1_000.0;
    let residential_energy_mwh = pre_dc_energy_mwh * utility.residential_energy_share;
    let dc_annual_energy_mwh = dc_capacity_mw * dc_load_factor * HOURS_PER_YEAR;
    let post_dc_energy_mwh = pre_dc_energy_mwh + dc_annual_energy_mwh * phase_in_factor;
    let volumetric_share = residential_energy_mwh / post_dc_energy_mwh;

    let pre_dc_peak_mw = utility.system_peak_mw;
    let residential_peak_mw = pre_dc_peak_mw * RESIDENTIAL_PEAK_SHARE;
    let post_dc_peak_mw = pre_dc_peak_mw + dc_capacity_mw * dc_peak_coincidence * phase_in_factor;
    let demand_share = residential_peak_mw / post_dc_peak_mw;

    // The data center itself is one more account.
    let total_customers = utility.total_customers() as f64 + 1.0;
    let customer_share = utility.residential_customers as f64 / total_customers;

    let weighted = volumetric_share * VOLUMETRIC_WEIGHT
        + demand_share * DEMAND_WEIGHT
        + customer_share * CUSTOMER_WEIGHT;

    let regulatory_lag_factor = (years_online / REGULATORY_LAG_YEARS).min(1.0);
    let base = utility.base_residential_allocation;
    let adjusted = base * (1.0 - regulatory_lag_factor) + weighted * regulatory_lag_factor;

    AllocationResult {
        allocation: clamp_allocation(adjusted),
        volumetric_share,
        demand_share,
        customer_share,
        phase_in_factor,
        regulatory_lag_factor,
    }
}

/// Clamps an allocation into the accepted residential range.
pub fn clamp_allocation(allocation: f64) -> f64 {
    allocation.clamp(MIN_RESIDENTIAL_ALLOCATION, MAX_RESIDENTIAL_ALLOCATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_year_returns_base_allocation() {
        let utility = UtilityProfile::default();
        let r = residential_allocation(&utility, 1_000.0, 0.8, 1.0, 0);
        assert_eq!(r.phase_in_factor, 0.0);
        assert_eq!(r.regulatory_lag_factor, 0.0);
        assert!((r.allocation - utility.base_residential_allocation).abs() < 1e-12);
    }

    #[test]
    fn saturated_customer_count_stays_finite() {
        let utility = UtilityProfile {
            residential_customers: u64::MAX,
            ..UtilityProfile::default()
        };
        let r = residential_allocation(&utility, 1_000.0, 0.8, 1.0, 5);
        assert!(r.customer_share.is_finite());
        assert!((0.15..=0.50).contains(&r.allocation));
    }

    #[test]
    fn component_shares_at_full_phase_in() {
        let utility = UtilityProfile::default();
        let r = residential_allocation(&utility, 1_000.0, 0.8, 1.0, 5);
        // 7,000,000 MWh residential of 20,000,000 + 7,008,000
        let expected_volumetric = 7_000_000.0 / 27_008_000.0;
        // 1,800 MW residential peak of 5,000 MW
        let expected_demand = 1_800.0 / 5_000.0;
        let expected_customer = 560_000.0 / 650_001.0;
        assert!((r.volumetric_share - expected_volumetric).abs() < 1e-12);
        assert!((r.demand_share - expected_demand).abs() < 1e-12);
        assert!((r.customer_share - expected_customer).abs() < 1e-12);
        let weighted =
            0.4 * expected_volumetric + 0.4 * expected_demand + 0.2 * expected_customer;
        assert!((r.allocation - weighted).abs() < 1e-12);
    }

    #[test]
    fn lag_blends_base_and_weighted() {
        let utility = UtilityProfile::default();
        let early = residential_allocation(&utility, 1_000.0, 0.8, 1.0, 1);
        assert!((early.regulatory_lag_factor - 0.2).abs() < 1e-12);
        assert!((early.phase_in_factor - 1.0 / 3.0).abs() < 1e-12);
        let weighted = 0.4 * early.volumetric_share
            + 0.4 * early.demand_share
            + 0.2 * early.customer_share;
        let expected = utility.base_residential_allocation * 0.8 + weighted * 0.2;
        assert!((early.allocation - expected).abs() < 1e-12);
    }

    #[test]
    fn allocation_is_clamped() {
        let utility = UtilityProfile {
            residential_energy_share: 0.0,
            residential_customers: 1,
            commercial_customers: 1_000_000,
            base_residential_allocation: 0.0,
            ..UtilityProfile::default()
        };
        let low = residential_allocation(&utility, 10_000.0, 1.0, 1.0, 10);
        assert_eq!(low.allocation, MIN_RESIDENTIAL_ALLOCATION);

        let high_utility = UtilityProfile {
            residential_energy_share: 1.0,
            commercial_customers: 0,
            industrial_customers: 0,
            base_residential_allocation: 1.0,
            ..UtilityProfile::default()
        };
        let high = residential_allocation(&high_utility, 1.0, 0.1, 0.1, 0);
        assert_eq!(high.allocation, MAX_RESIDENTIAL_ALLOCATION);
    }

    #[test]
    fn lower_coincidence_raises_residential_demand_share() {
        let utility = UtilityProfile::default();
        let firm = residential_allocation(&utility, 1_000.0, 0.8, 1.0, 4);
        let flex = residential_allocation(&utility, 1_000.0, 0.8, 0.75, 4);
        assert!(flex.demand_share > firm.demand_share);
    }
}
