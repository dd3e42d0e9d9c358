//! Revenue adequacy of a large load's own tariff payments.
//!
//! Diagnostic only: the result is never fed back into the bill impact, which
//! already credits the load's revenue through the flow-through offset.

use serde::{Deserialize, Serialize};

use crate::constants::{HOURS_PER_YEAR, MAX_REVENUE_ADEQUACY_RATIO, MONTHS_PER_YEAR};
use crate::error::{EngineError, EngineResult};

use super::capacity::dc_peak_contribution_mw;
use super::types::{
    ModelAssumptions, TariffStructure, UtilityProfile, check_fraction, check_non_negative,
    check_positive,
};

/// Whether the load pays its own way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueAdequacyResult {
    /// Annual tariff revenue net of wholesale energy cost ($/year).
    pub annual_revenue: f64,
    /// Annual cost to serve the load ($/year).
    pub annual_cost_to_serve: f64,
    /// `(revenue - cost) / effective peak` ($/MW-year, signed).
    pub surplus_or_deficit_per_mw: f64,
    /// `revenue / cost`, clamped to `[0, MAX_REVENUE_ADEQUACY_RATIO]`.
    pub revenue_adequacy_ratio: f64,
    /// `revenue_adequacy_ratio >= 1`.
    pub contributes_surplus: bool,
}

/// Computes revenue adequacy for a load operated at the given factors.
///
/// # Arguments
///
/// * `capacity_mw` - Nameplate capacity (MW, > 0)
/// * `load_factor` - Load factor (0.0–1.0)
/// * `peak_coincidence` - Share of nameplate at system peak (0.0–1.0)
/// * `tariff` - Retail tariff billed to the load
/// * `utility` - Host utility (wholesale cost and interconnection terms)
/// * `onsite_generation_mw` - On-site generation (0 ≤ x ≤ capacity)
/// * `assumptions` - Embedded cost figures and asset life
///
/// # Errors
///
/// Returns `InvalidParameter` or `InconsistentMarketConfig` when any input
/// fails validation.
pub fn compute_revenue_adequacy(
    capacity_mw: f64,
    load_factor: f64,
    peak_coincidence: f64,
    tariff: &TariffStructure,
    utility: &UtilityProfile,
    onsite_generation_mw: f64,
    assumptions: &ModelAssumptions,
) -> EngineResult<RevenueAdequacyResult> {
    let mut errors = Vec::new();
    check_positive(&mut errors, "capacity_mw", capacity_mw);
    check_fraction(&mut errors, "load_factor", load_factor);
    check_fraction(&mut errors, "peak_coincidence", peak_coincidence);
    check_non_negative(&mut errors, "onsite_generation_mw", onsite_generation_mw);
    if let Some(e) = errors.into_iter().next() {
        return Err(e);
    }
    if onsite_generation_mw > capacity_mw {
        return Err(EngineError::invalid(
            "onsite_generation_mw",
            "must be <= capacity_mw",
        ));
    }
    tariff.validate()?;
    utility.validate()?;
    assumptions.validate()?;

    let effective_peak_mw = dc_peak_contribution_mw(capacity_mw, peak_coincidence, onsite_generation_mw);

    let interconnection = &utility.interconnection;
    let unrecovered_upgrade = (1.0 - interconnection.ciac_recovery_fraction)
        * interconnection.network_upgrade_cost_per_mw
        * effective_peak_mw;
    let network_cost = (assumptions.transmission_cost_per_mw + assumptions.distribution_cost_per_mw)
        * effective_peak_mw;
    let annual_cost_to_serve = (unrecovered_upgrade + network_cost) / assumptions.asset_life_years
        + assumptions.capacity_cost_per_mw_year * effective_peak_mw;

    let mut demand_revenue = tariff.peak_demand_charge * effective_peak_mw * MONTHS_PER_YEAR;
    if let Some(max_charge) = tariff.max_demand_charge {
        demand_revenue += max_charge * capacity_mw * MONTHS_PER_YEAR;
    }
    let annual_mwh = capacity_mw * load_factor * HOURS_PER_YEAR;
    let energy_margin = (tariff.energy_charge * 1_000.0 - utility.marginal_energy_cost) * annual_mwh;
    let annual_revenue = demand_revenue + energy_margin;

    let revenue_adequacy_ratio = adequacy_ratio(annual_revenue, annual_cost_to_serve);
    let per_mw_basis = if effective_peak_mw > 0.0 {
        effective_peak_mw
    } else {
        capacity_mw
    };

    Ok(RevenueAdequacyResult {
        annual_revenue,
        annual_cost_to_serve,
        surplus_or_deficit_per_mw: (annual_revenue - annual_cost_to_serve) / per_mw_basis,
        revenue_adequacy_ratio,
        contributes_surplus: revenue_adequacy_ratio >= 1.0,
    })
}

fn adequacy_ratio(revenue: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        (revenue / cost).clamp(0.0, MAX_REVENUE_ADEQUACY_RATIO)
    } else if revenue > 0.0 {
        MAX_REVENUE_ADEQUACY_RATIO
    } else {
        // Nothing to serve and nothing paid.
        1.0
    }
}
