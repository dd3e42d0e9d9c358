//! Input records, tunable assumptions, and boundary validation.
//!
//! Every record deserializes with documented defaults for fields the caller
//! omits, so downstream computation never special-cases a missing value.
//! `violations()` lists every broken constraint; `validate()` fails on the
//! first one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{EngineError, EngineResult};

/// Operating scenario for a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// No new load.
    Baseline,
    /// Inflexible load drawing nameplate at system peak ("unoptimized").
    #[serde(alias = "unoptimized")]
    Firm,
    /// Load that curtails during system peaks.
    Flexible,
    /// Flexible load plus on-site dispatchable generation.
    Dispatchable,
}

impl Scenario {
    /// All scenarios in report order.
    pub const ALL: [Scenario; 4] = [
        Scenario::Baseline,
        Scenario::Firm,
        Scenario::Flexible,
        Scenario::Dispatchable,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::Firm => "firm",
            Scenario::Flexible => "flexible",
            Scenario::Dispatchable => "dispatchable",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wholesale market structure the utility operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketType {
    /// Vertically integrated, cost-of-service utility.
    #[default]
    Regulated,
    /// ISO/RTO with a mandatory capacity auction (PJM, MISO).
    IsoCapacityMarket,
    /// Energy-only market with 4CP transmission allocation (ERCOT).
    EnergyOnly,
}

/// Interconnection cost recovery terms for large loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Interconnection {
    /// Share of network upgrade cost the load pays up front as CIAC (0.0–1.0).
    pub ciac_recovery_fraction: f64,
    /// Network upgrade cost per MW of effective peak ($).
    pub network_upgrade_cost_per_mw: f64,
}

impl Default for Interconnection {
    fn default() -> Self {
        Self {
            ciac_recovery_fraction: 0.60,
            network_upgrade_cost_per_mw: 150_000.0,
        }
    }
}

/// Snapshot of the host utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UtilityProfile {
    /// Residential accounts (must be > 0).
    pub residential_customers: u64,
    /// Commercial accounts.
    pub commercial_customers: u64,
    /// Industrial accounts.
    pub industrial_customers: u64,
    /// Current average residential bill ($/month).
    pub average_monthly_bill: f64,
    /// System coincident peak before the new load (MW).
    pub system_peak_mw: f64,
    /// Installed generation capacity (MW). Required with a capacity market.
    pub total_generation_capacity_mw: Option<f64>,
    /// Reported reserve margin (fraction). Derived from generation when absent.
    pub current_reserve_margin: Option<f64>,
    /// Whether the utility buys capacity through an auction.
    pub has_capacity_market: bool,
    /// Most recent capacity clearing price ($/MW-day).
    pub capacity_price_2024: Option<f64>,
    /// Wholesale marginal energy cost ($/MWh).
    pub marginal_energy_cost: f64,
    /// Market structure.
    pub market_type: MarketType,
    /// Residential share of cost recovery before the new load (fraction).
    pub base_residential_allocation: f64,
    /// Share of capacity costs passed through to retail rates (fraction).
    pub capacity_cost_pass_through: f64,
    /// Annual system energy before the new load (GWh).
    pub pre_dc_system_energy_gwh: f64,
    /// Residential share of system energy (fraction).
    pub residential_energy_share: f64,
    /// Large-load interconnection terms.
    pub interconnection: Interconnection,
}

impl Default for UtilityProfile {
    fn default() -> Self {
        Self {
            residential_customers: 560_000,
            commercial_customers: 85_000,
            industrial_customers: 5_000,
            average_monthly_bill: 130.0,
            system_peak_mw: 4_000.0,
            total_generation_capacity_mw: None,
            current_reserve_margin: None,
            has_capacity_market: false,
            capacity_price_2024: None,
            marginal_energy_cost: 40.0,
            market_type: MarketType::Regulated,
            base_residential_allocation: DEFAULT_BASE_RESIDENTIAL_ALLOCATION,
            capacity_cost_pass_through: DEFAULT_CAPACITY_COST_PASS_THROUGH,
            pre_dc_system_energy_gwh: 20_000.0,
            residential_energy_share: 0.35,
            interconnection: Interconnection::default(),
        }
    }
}

impl UtilityProfile {
    /// Total accounts before the new load, or `None` if the sum overflows.
    pub fn checked_total_customers(&self) -> Option<u64> {
        self.residential_customers
            .checked_add(self.commercial_customers)?
            .checked_add(self.industrial_customers)
    }

    /// Total accounts before the new load (saturating).
    pub fn total_customers(&self) -> u64 {
        self.checked_total_customers().unwrap_or(u64::MAX)
    }

    /// Generation capacity, implied from the reported margin when not given.
    ///
    /// Falls back to [`DEFAULT_RESERVE_MARGIN`] when neither is known, which
    /// validation only allows outside capacity markets.
    pub fn generation_capacity_mw(&self) -> f64 {
        self.total_generation_capacity_mw.unwrap_or_else(|| {
            let margin = self.current_reserve_margin.unwrap_or(DEFAULT_RESERVE_MARGIN);
            self.system_peak_mw * (1.0 + margin)
        })
    }

    /// Lists every violated constraint.
    pub fn violations(&self) -> Vec<EngineError> {
        let mut errors = Vec::new();

        if self.residential_customers == 0 {
            errors.push(EngineError::invalid(
                "utility.residential_customers",
                "must be > 0",
            ));
        }
        if self.checked_total_customers().is_none() {
            errors.push(EngineError::invalid(
                "utility.total_customers",
                "residential + commercial + industrial customers must fit in u64",
            ));
        }
        check_positive(&mut errors, "utility.average_monthly_bill", self.average_monthly_bill);
        check_positive(&mut errors, "utility.system_peak_mw", self.system_peak_mw);
        if let Some(cap) = self.total_generation_capacity_mw {
            check_positive(&mut errors, "utility.total_generation_capacity_mw", cap);
        }
        if let Some(margin) = self.current_reserve_margin {
            if !margin.is_finite() || margin <= -1.0 {
                errors.push(EngineError::invalid(
                    "utility.current_reserve_margin",
                    "must be a finite fraction > -1.0",
                ));
            }
        }
        if let Some(price) = self.capacity_price_2024 {
            check_non_negative(&mut errors, "utility.capacity_price_2024", price);
        }
        check_non_negative(&mut errors, "utility.marginal_energy_cost", self.marginal_energy_cost);
        check_fraction(
            &mut errors,
            "utility.base_residential_allocation",
            self.base_residential_allocation,
        );
        check_fraction(
            &mut errors,
            "utility.capacity_cost_pass_through",
            self.capacity_cost_pass_through,
        );
        check_positive(
            &mut errors,
            "utility.pre_dc_system_energy_gwh",
            self.pre_dc_system_energy_gwh,
        );
        check_fraction(
            &mut errors,
            "utility.residential_energy_share",
            self.residential_energy_share,
        );
        check_fraction(
            &mut errors,
            "utility.interconnection.ciac_recovery_fraction",
            self.interconnection.ciac_recovery_fraction,
        );
        check_non_negative(
            &mut errors,
            "utility.interconnection.network_upgrade_cost_per_mw",
            self.interconnection.network_upgrade_cost_per_mw,
        );

        if self.has_capacity_market && self.total_generation_capacity_mw.is_none() {
            errors.push(EngineError::inconsistent(
                "utility.total_generation_capacity_mw",
                "required when has_capacity_market is true",
            ));
        }
        match self.market_type {
            MarketType::EnergyOnly if self.has_capacity_market => {
                errors.push(EngineError::inconsistent(
                    "utility.has_capacity_market",
                    "must be false for an energy-only market",
                ));
            }
            MarketType::IsoCapacityMarket if !self.has_capacity_market => {
                errors.push(EngineError::inconsistent(
                    "utility.has_capacity_market",
                    "must be true for an iso-capacity-market",
                ));
            }
            _ => {}
        }

        errors
    }

    /// Fails on the first violated constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] from [`Self::violations`].
    pub fn validate(&self) -> EngineResult<()> {
        first_violation(self.violations())
    }
}

/// Operating envelope of the new large load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataCenterLoadProfile {
    /// Nameplate interconnected capacity (MW, > 0).
    pub capacity_mw: f64,
    /// Load factor when operated firm (0.0–1.0).
    pub firm_load_factor: f64,
    /// Load factor when operated flexibly (0.0–1.0).
    pub flex_load_factor: f64,
    /// Share of nameplate drawn at system peak when firm (0.0–1.0).
    pub firm_peak_coincidence: f64,
    /// Share of nameplate drawn at system peak when flexible (0.0–1.0).
    pub flex_peak_coincidence: f64,
    /// On-site dispatchable generation (MW, 0 ≤ x ≤ capacity).
    pub onsite_generation_mw: f64,
    /// Demand charge billed to the load ($/MW-month).
    pub demand_charge_rate: f64,
}

impl Default for DataCenterLoadProfile {
    fn default() -> Self {
        Self {
            capacity_mw: 1_000.0,
            firm_load_factor: 0.80,
            flex_load_factor: 0.95,
            firm_peak_coincidence: 1.0,
            flex_peak_coincidence: 0.75,
            onsite_generation_mw: 200.0,
            demand_charge_rate: DEMAND_CHARGE_PER_MW_MONTH,
        }
    }
}

impl DataCenterLoadProfile {
    /// Lists every violated constraint.
    pub fn violations(&self) -> Vec<EngineError> {
        let mut errors = Vec::new();
        check_positive(&mut errors, "data_center.capacity_mw", self.capacity_mw);
        check_fraction(&mut errors, "data_center.firm_load_factor", self.firm_load_factor);
        check_fraction(&mut errors, "data_center.flex_load_factor", self.flex_load_factor);
        check_fraction(
            &mut errors,
            "data_center.firm_peak_coincidence",
            self.firm_peak_coincidence,
        );
        check_fraction(
            &mut errors,
            "data_center.flex_peak_coincidence",
            self.flex_peak_coincidence,
        );
        check_non_negative(
            &mut errors,
            "data_center.onsite_generation_mw",
            self.onsite_generation_mw,
        );
        if self.onsite_generation_mw > self.capacity_mw {
            errors.push(EngineError::invalid(
                "data_center.onsite_generation_mw",
                "must be <= data_center.capacity_mw",
            ));
        }
        check_non_negative(
            &mut errors,
            "data_center.demand_charge_rate",
            self.demand_charge_rate,
        );
        errors
    }

    /// Fails on the first violated constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] from [`Self::violations`].
    pub fn validate(&self) -> EngineResult<()> {
        first_violation(self.violations())
    }
}

/// Retail tariff the large load is billed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffStructure {
    /// Demand charge on peak-coincident demand ($/MW-month).
    pub peak_demand_charge: f64,
    /// Demand charge on the customer's own monthly maximum ($/MW-month).
    pub max_demand_charge: Option<f64>,
    /// Energy charge ($/kWh).
    pub energy_charge: f64,
}

impl Default for TariffStructure {
    fn default() -> Self {
        Self {
            peak_demand_charge: DEMAND_CHARGE_PER_MW_MONTH,
            max_demand_charge: None,
            energy_charge: 0.065,
        }
    }
}

impl TariffStructure {
    /// Lists every violated constraint.
    pub fn violations(&self) -> Vec<EngineError> {
        let mut errors = Vec::new();
        check_non_negative(&mut errors, "tariff.peak_demand_charge", self.peak_demand_charge);
        if let Some(charge) = self.max_demand_charge {
            check_non_negative(&mut errors, "tariff.max_demand_charge", charge);
        }
        check_non_negative(&mut errors, "tariff.energy_charge", self.energy_charge);
        errors
    }

    /// Fails on the first violated constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] from [`Self::violations`].
    pub fn validate(&self) -> EngineResult<()> {
        first_violation(self.violations())
    }
}

/// Tunable modeling assumptions.
///
/// Defaults come from [`crate::constants`]. The flow-through split, the
/// benefit damping factors, and the scarcity curve are deliberate modeling
/// choices rather than invariants, so studies may override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelAssumptions {
    /// General inflation rate.
    pub general_inflation: f64,
    /// Infrastructure aging escalation.
    pub infrastructure_aging: f64,
    /// Grid modernization escalation.
    pub grid_modernization: f64,
    /// Embedded transmission cost ($/MW).
    pub transmission_cost_per_mw: f64,
    /// Embedded distribution cost ($/MW).
    pub distribution_cost_per_mw: f64,
    /// Forward-looking capacity cost ($/MW-year).
    pub capacity_cost_per_mw_year: f64,
    /// Amortization life (years).
    pub asset_life_years: f64,
    /// Utility margin on energy sold to the load ($/MWh).
    pub energy_margin_per_mwh: f64,
    /// Share of energy margin credited to other ratepayers.
    pub energy_margin_flow_through: f64,
    /// Share of demand-charge revenue credited to other ratepayers.
    pub demand_charge_flow_through: f64,
    /// Benefit escalation damping, firm scenario.
    pub firm_benefit_damping: f64,
    /// Benefit escalation damping, flexible scenario.
    pub flexible_benefit_damping: f64,
    /// Benefit escalation damping, dispatchable scenario.
    pub dispatchable_benefit_damping: f64,
    /// Reserve margin below which capacity is scarce.
    pub scarcity_reserve_margin: f64,
    /// Reserve margin below which the system is critical.
    pub critical_reserve_margin: f64,
    /// Exponential steepness of the scarcity price curve.
    pub scarcity_curve_steepness: f64,
    /// Ceiling on the scarcity price relative to the starting price.
    pub max_capacity_price_multiplier: f64,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        Self {
            general_inflation: GENERAL_INFLATION,
            infrastructure_aging: INFRASTRUCTURE_AGING,
            grid_modernization: GRID_MODERNIZATION,
            transmission_cost_per_mw: TRANSMISSION_COST_PER_MW,
            distribution_cost_per_mw: DISTRIBUTION_COST_PER_MW,
            capacity_cost_per_mw_year: CAPACITY_COST_PER_MW_YEAR,
            asset_life_years: ASSET_LIFE_YEARS,
            energy_margin_per_mwh: ENERGY_MARGIN_PER_MWH,
            energy_margin_flow_through: ENERGY_MARGIN_FLOW_THROUGH,
            demand_charge_flow_through: DEMAND_CHARGE_FLOW_THROUGH,
            firm_benefit_damping: FIRM_BENEFIT_DAMPING,
            flexible_benefit_damping: FLEXIBLE_BENEFIT_DAMPING,
            dispatchable_benefit_damping: DISPATCHABLE_BENEFIT_DAMPING,
            scarcity_reserve_margin: SCARCITY_RESERVE_MARGIN,
            critical_reserve_margin: CRITICAL_RESERVE_MARGIN,
            scarcity_curve_steepness: SCARCITY_CURVE_STEEPNESS,
            max_capacity_price_multiplier: MAX_CAPACITY_PRICE_MULTIPLIER,
        }
    }
}

impl ModelAssumptions {
    /// Annual escalation of the no-new-load bill.
    pub fn baseline_escalation_rate(&self) -> f64 {
        self.general_inflation + self.infrastructure_aging + self.grid_modernization
    }

    /// Inflation damping applied when a scenario's impact is a benefit.
    pub fn benefit_damping(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Baseline => 1.0,
            Scenario::Firm => self.firm_benefit_damping,
            Scenario::Flexible => self.flexible_benefit_damping,
            Scenario::Dispatchable => self.dispatchable_benefit_damping,
        }
    }

    /// Lists every violated constraint.
    pub fn violations(&self) -> Vec<EngineError> {
        let mut errors = Vec::new();
        check_non_negative(&mut errors, "assumptions.general_inflation", self.general_inflation);
        check_non_negative(
            &mut errors,
            "assumptions.infrastructure_aging",
            self.infrastructure_aging,
        );
        check_non_negative(
            &mut errors,
            "assumptions.grid_modernization",
            self.grid_modernization,
        );
        if self.baseline_escalation_rate() <= 0.0 {
            errors.push(EngineError::invalid(
                "assumptions.general_inflation",
                "baseline escalation rate must be > 0",
            ));
        }
        check_non_negative(
            &mut errors,
            "assumptions.transmission_cost_per_mw",
            self.transmission_cost_per_mw,
        );
        check_non_negative(
            &mut errors,
            "assumptions.distribution_cost_per_mw",
            self.distribution_cost_per_mw,
        );
        check_non_negative(
            &mut errors,
            "assumptions.capacity_cost_per_mw_year",
            self.capacity_cost_per_mw_year,
        );
        check_positive(&mut errors, "assumptions.asset_life_years", self.asset_life_years);
        check_non_negative(
            &mut errors,
            "assumptions.energy_margin_per_mwh",
            self.energy_margin_per_mwh,
        );
        check_fraction(
            &mut errors,
            "assumptions.energy_margin_flow_through",
            self.energy_margin_flow_through,
        );
        check_fraction(
            &mut errors,
            "assumptions.demand_charge_flow_through",
            self.demand_charge_flow_through,
        );
        check_fraction(
            &mut errors,
            "assumptions.firm_benefit_damping",
            self.firm_benefit_damping,
        );
        check_fraction(
            &mut errors,
            "assumptions.flexible_benefit_damping",
            self.flexible_benefit_damping,
        );
        check_fraction(
            &mut errors,
            "assumptions.dispatchable_benefit_damping",
            self.dispatchable_benefit_damping,
        );
        if !(self.critical_reserve_margin < self.scarcity_reserve_margin) {
            errors.push(EngineError::invalid(
                "assumptions.critical_reserve_margin",
                "must be < assumptions.scarcity_reserve_margin",
            ));
        }
        check_positive(
            &mut errors,
            "assumptions.scarcity_curve_steepness",
            self.scarcity_curve_steepness,
        );
        if !self.max_capacity_price_multiplier.is_finite() || self.max_capacity_price_multiplier < 1.0
        {
            errors.push(EngineError::invalid(
                "assumptions.max_capacity_price_multiplier",
                "must be a finite number >= 1.0",
            ));
        }
        errors
    }

    /// Fails on the first violated constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError`] from [`Self::violations`].
    pub fn validate(&self) -> EngineResult<()> {
        first_violation(self.violations())
    }
}

/// Checks a projection horizon against the accepted range.
///
/// # Errors
///
/// Returns `InvalidParameter` outside `[MIN_PROJECTION_YEARS, MAX_PROJECTION_YEARS]`.
pub fn validate_projection_years(years: usize) -> EngineResult<()> {
    if (MIN_PROJECTION_YEARS..=MAX_PROJECTION_YEARS).contains(&years) {
        Ok(())
    } else {
        Err(EngineError::invalid(
            "projection.years",
            format!("must be in [{MIN_PROJECTION_YEARS}, {MAX_PROJECTION_YEARS}], got {years}"),
        ))
    }
}

fn first_violation(errors: Vec<EngineError>) -> EngineResult<()> {
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub(crate) fn check_positive(errors: &mut Vec<EngineError>, field: &str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(EngineError::invalid(field, "must be a finite number > 0"));
    }
}

pub(crate) fn check_non_negative(errors: &mut Vec<EngineError>, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(EngineError::invalid(field, "must be a finite number >= 0"));
    }
}

pub(crate) fn check_fraction(errors: &mut Vec<EngineError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(EngineError::invalid(field, "must be in [0.0, 1.0]"));
    }
}
