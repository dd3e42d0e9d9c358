//! Net residential bill impact of a large load.
//!
//! Combines amortized grid infrastructure, capacity cost (or credit for
//! curtailment and on-site generation), and the share of the load's own
//! revenue that flows back to other ratepayers into one signed
//! per-customer monthly delta.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CAPACITY_MARKET_DEMAND_RESPONSE_CREDIT, CAPACITY_PRICE_BLEND, COINCIDENT_PEAK_CHARGE_SHARE,
    DAYS_PER_YEAR, DEMAND_RESPONSE_CREDIT, ENERGY_ONLY_ALLOCATION_MULTIPLIER,
    ENERGY_ONLY_CAPACITY_COST_SHARE, ENERGY_ONLY_ENERGY_MARGIN_FLOW_THROUGH,
    ENERGY_ONLY_INTERCONNECTION_SHARE, FOUR_CP_TRANSMISSION_RATE_PER_KW_MONTH,
    HIGH_CAPACITY_PRICE_MAX_MULTIPLIER, HIGH_CAPACITY_PRICE_SPAN, HIGH_CAPACITY_PRICE_THRESHOLD,
    HOURS_PER_YEAR, MONTHS_PER_YEAR, ONSITE_GENERATION_CREDIT,
};

use super::allocation::clamp_allocation;
use super::capacity::{capacity_price, dc_peak_contribution_mw};
use super::types::{MarketType, ModelAssumptions, UtilityProfile};

/// How the load is operated in a given scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadOperation {
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Load factor (0.0–1.0).
    pub load_factor: f64,
    /// Share of nameplate drawn at system peak (0.0–1.0).
    pub peak_coincidence: f64,
    /// On-site generation dispatched at peak (MW).
    pub onsite_generation_mw: f64,
    /// Demand charge billed to the load ($/MW-month).
    pub demand_charge_rate: f64,
    /// Credit curtailment and on-site generation against capacity cost.
    pub capacity_credit: bool,
}

impl LoadOperation {
    /// Peak the load adds after curtailment and on-site generation (MW).
    pub fn effective_peak_mw(&self) -> f64 {
        dc_peak_contribution_mw(
            self.capacity_mw,
            self.peak_coincidence,
            self.onsite_generation_mw,
        )
    }
}

/// Annual tariff revenue collected from the load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcRevenue {
    /// Coincident-peak demand charge revenue ($/year).
    pub cp_demand_revenue: f64,
    /// Non-coincident-peak demand charge revenue ($/year).
    pub ncp_demand_revenue: f64,
    /// Total demand charge revenue ($/year).
    pub demand_revenue: f64,
    /// Utility energy margin ($/year).
    pub energy_margin: f64,
}

/// Cost components behind a per-customer impact, for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    /// Peak added after curtailment and on-site generation (MW).
    pub effective_peak_mw: f64,
    /// Amortized transmission cost ($/year).
    pub annualized_transmission_cost: f64,
    /// Amortized distribution cost ($/year).
    pub annualized_distribution_cost: f64,
    /// Transmission plus distribution ($/year).
    pub annualized_infra_cost: f64,
    /// Capacity cost after market adjustments ($/MW-year).
    pub capacity_cost_per_mw_year: f64,
    /// Capacity cost net of the coincident-peak demand charge ($/MW-year).
    pub net_capacity_cost_per_mw: f64,
    /// Credit for curtailable load and on-site generation ($/year).
    pub capacity_credit: f64,
    /// Net capacity cost, negative when the credit dominates ($/year).
    pub capacity_cost_or_credit: f64,
    /// Tariff revenue from the load.
    pub revenue: DcRevenue,
    /// Revenue flowing back to other ratepayers ($/year).
    pub revenue_offset: f64,
    /// Infrastructure plus capacity ($/year).
    pub gross_annual_cost: f64,
    /// Gross cost less revenue offset ($/year, negative is a benefit).
    pub net_annual_impact: f64,
    /// Market-adjusted residential allocation applied.
    pub residential_allocation: f64,
    /// Residential class share of the net impact ($/year).
    pub residential_impact: f64,
}

/// Signed per-customer monthly impact and its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Change in the average residential bill ($/month, negative is a benefit).
    pub per_customer_monthly: f64,
    /// Cost components.
    pub metrics: ImpactMetrics,
}

/// Computes demand-charge and energy-margin revenue from the load.
///
/// The demand charge splits into a coincident-peak part billed on
/// peak-coincident MW and a non-coincident part billed on nameplate.
pub fn dc_revenue(op: &LoadOperation, assumptions: &ModelAssumptions) -> DcRevenue {
    let cp_rate = op.demand_charge_rate * COINCIDENT_PEAK_CHARGE_SHARE;
    let ncp_rate = op.demand_charge_rate - cp_rate;

    let cp_demand_revenue = op.capacity_mw * op.peak_coincidence * cp_rate * MONTHS_PER_YEAR;
    let ncp_demand_revenue = op.capacity_mw * ncp_rate * MONTHS_PER_YEAR;
    let annual_mwh = op.capacity_mw * op.load_factor * HOURS_PER_YEAR;

    DcRevenue {
        cp_demand_revenue,
        ncp_demand_revenue,
        demand_revenue: cp_demand_revenue + ncp_demand_revenue,
        energy_margin: annual_mwh * assumptions.energy_margin_per_mwh,
    }
}

/// Computes the net residential impact of operating the load as `op`.
///
/// Inputs are assumed validated. `residential_allocation` comes from
/// [`super::allocation::residential_allocation`] and is further adjusted
/// for market structure.
pub fn net_residential_impact(
    utility: &UtilityProfile,
    op: &LoadOperation,
    residential_allocation: f64,
    assumptions: &ModelAssumptions,
) -> ImpactResult {
    let capacity_cost = capacity_cost_per_mw_year(utility, op.effective_peak_mw(), assumptions);
    net_residential_impact_at(utility, op, residential_allocation, capacity_cost, assumptions)
}

/// [`net_residential_impact`] with the capacity cost ($/MW-year) already
/// resolved, so a projection can price capacity once per scenario.
pub fn net_residential_impact_at(
    utility: &UtilityProfile,
    op: &LoadOperation,
    residential_allocation: f64,
    capacity_cost_per_mw_year: f64,
    assumptions: &ModelAssumptions,
) -> ImpactResult {
    let effective_peak_mw = op.effective_peak_mw();
    let life = assumptions.asset_life_years;

    let embedded_transmission = effective_peak_mw * assumptions.transmission_cost_per_mw;
    let annualized_transmission_cost = match utility.market_type {
        MarketType::EnergyOnly => {
            // 4CP allocation plus interconnection facilities
            let four_cp = effective_peak_mw
                * 1_000.0
                * FOUR_CP_TRANSMISSION_RATE_PER_KW_MONTH
                * MONTHS_PER_YEAR;
            four_cp + embedded_transmission * ENERGY_ONLY_INTERCONNECTION_SHARE / life
        }
        MarketType::Regulated | MarketType::IsoCapacityMarket => embedded_transmission / life,
    };
    let annualized_distribution_cost = effective_peak_mw * assumptions.distribution_cost_per_mw / life;
    let annualized_infra_cost = annualized_transmission_cost + annualized_distribution_cost;

    let cp_charge_annual = op.demand_charge_rate * COINCIDENT_PEAK_CHARGE_SHARE * MONTHS_PER_YEAR;
    let net_capacity_cost_per_mw = (capacity_cost_per_mw_year - cp_charge_annual).max(0.0);
    let mut capacity_cost_or_credit = effective_peak_mw * net_capacity_cost_per_mw;

    let mut capacity_credit = 0.0;
    if op.capacity_credit {
        let curtailable_mw = op.capacity_mw * (1.0 - op.peak_coincidence);
        let dr_multiplier = if utility.has_capacity_market {
            CAPACITY_MARKET_DEMAND_RESPONSE_CREDIT
        } else {
            DEMAND_RESPONSE_CREDIT
        };
        capacity_credit = curtailable_mw * capacity_cost_per_mw_year * dr_multiplier
            + op.onsite_generation_mw * capacity_cost_per_mw_year * ONSITE_GENERATION_CREDIT;
        capacity_cost_or_credit -= capacity_credit;
    }

    let gross_annual_cost = annualized_infra_cost + capacity_cost_or_credit;

    let revenue = dc_revenue(op, assumptions);
    let energy_flow_through = match utility.market_type {
        MarketType::EnergyOnly => ENERGY_ONLY_ENERGY_MARGIN_FLOW_THROUGH,
        MarketType::Regulated | MarketType::IsoCapacityMarket => {
            assumptions.energy_margin_flow_through
        }
    };
    let revenue_offset = revenue.energy_margin * energy_flow_through
        + revenue.demand_revenue * assumptions.demand_charge_flow_through;

    let net_annual_impact = gross_annual_cost - revenue_offset;
    let allocation = market_adjusted_allocation(utility, residential_allocation);
    let residential_impact = net_annual_impact * allocation;
    let per_customer_monthly =
        residential_impact / utility.residential_customers as f64 / MONTHS_PER_YEAR;

    ImpactResult {
        per_customer_monthly,
        metrics: ImpactMetrics {
            effective_peak_mw,
            annualized_transmission_cost,
            annualized_distribution_cost,
            annualized_infra_cost,
            capacity_cost_per_mw_year,
            net_capacity_cost_per_mw,
            capacity_credit,
            capacity_cost_or_credit,
            revenue,
            revenue_offset,
            gross_annual_cost,
            net_annual_impact,
            residential_allocation: allocation,
            residential_impact,
        },
    }
}

/// Capacity cost per MW-year after market-structure adjustments.
///
/// Capacity markets with a known clearing price blend the forward figure with
/// the scarcity-adjusted price at the load's effective peak.
pub fn capacity_cost_per_mw_year(
    utility: &UtilityProfile,
    effective_peak_mw: f64,
    assumptions: &ModelAssumptions,
) -> f64 {
    let forward = assumptions.capacity_cost_per_mw_year;
    match utility.market_type {
        MarketType::EnergyOnly => forward * ENERGY_ONLY_CAPACITY_COST_SHARE,
        _ if utility.has_capacity_market && utility.capacity_price_2024.is_some() => {
            let price = capacity_price(utility, effective_peak_mw, assumptions).new_price;
            let cleared = price * DAYS_PER_YEAR * utility.capacity_cost_pass_through;
            forward * (1.0 - CAPACITY_PRICE_BLEND) + cleared * CAPACITY_PRICE_BLEND
        }
        _ => forward,
    }
}

/// Scales the residential allocation for market structure, then re-clamps.
fn market_adjusted_allocation(utility: &UtilityProfile, allocation: f64) -> f64 {
    let adjusted = match (utility.market_type, utility.capacity_price_2024) {
        (MarketType::EnergyOnly, _) => allocation * ENERGY_ONLY_ALLOCATION_MULTIPLIER,
        (_, Some(price)) if utility.has_capacity_market && price > HIGH_CAPACITY_PRICE_THRESHOLD => {
            let multiplier = (1.0 + (price - HIGH_CAPACITY_PRICE_THRESHOLD) / HIGH_CAPACITY_PRICE_SPAN)
                .min(HIGH_CAPACITY_PRICE_MAX_MULTIPLIER);
            allocation * multiplier
        }
        _ => allocation,
    };
    clamp_allocation(adjusted)
}
