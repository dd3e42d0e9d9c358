//! Year-by-year bill trajectories and the engine entry point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{BASE_YEAR, FIRST_YEAR_PHASE_IN, MONTHS_PER_YEAR, ONLINE_YEAR_INDEX};
use crate::error::{EngineError, EngineResult};

use super::adequacy::{RevenueAdequacyResult, compute_revenue_adequacy};
use super::allocation::residential_allocation;
use super::capacity::{CapacityPriceResult, compute_capacity_price, warn_on_margin_mismatch};
use super::impact::{ImpactMetrics, LoadOperation, capacity_cost_per_mw_year, net_residential_impact_at};
use super::summary::SummaryStats;
use super::types::{
    DataCenterLoadProfile, ModelAssumptions, Scenario, TariffStructure, UtilityProfile,
    validate_projection_years,
};

/// How one year's bill is built up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillComponents {
    /// No-new-load bill for the same year ($/month).
    pub baseline_bill: f64,
    /// Escalated, phased-in impact of the load ($/month, signed).
    pub dc_impact: f64,
    /// Share of the load in service this year (0.0, 0.5 or 1.0).
    pub phase_in: f64,
}

/// Load operating parameters a scenario year was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Load factor.
    pub load_factor: f64,
    /// Peak coincidence used for cost of service.
    pub peak_coincidence: f64,
    /// Peak coincidence used for the residential demand share.
    pub allocation_peak_coincidence: f64,
    /// On-site generation at peak (MW).
    pub onsite_generation_mw: f64,
    /// Capacity credit accounting enabled.
    pub capacity_credit: bool,
    /// Years since the load came online, `None` before.
    pub years_online: Option<usize>,
    /// Residential allocation after regulatory lag, before market adjustment.
    pub residential_allocation: f64,
}

/// One projection year of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// Calendar year.
    pub year: u32,
    /// Offset from the first projection year.
    pub year_index: usize,
    /// Average residential bill ($/month).
    pub monthly_bill: f64,
    /// `monthly_bill * 12`.
    pub annual_bill: f64,
    /// Scenario tag.
    pub scenario: Scenario,
    /// Whether the load is in service.
    pub dc_online: bool,
    /// Bill build-up.
    pub components: BillComponents,
    /// Load parameters, absent for the baseline.
    pub parameters: Option<ScenarioParameters>,
    /// Cost breakdown, present only for online years.
    pub metrics: Option<ImpactMetrics>,
}

/// The four trajectories for one study, in report order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTrajectories {
    /// No new load.
    pub baseline: Vec<YearRecord>,
    /// Inflexible load.
    #[serde(alias = "unoptimized")]
    pub firm: Vec<YearRecord>,
    /// Curtailable load.
    pub flexible: Vec<YearRecord>,
    /// Curtailable load with on-site generation.
    pub dispatchable: Vec<YearRecord>,
}

impl AllTrajectories {
    /// Trajectory for `scenario`.
    pub fn get(&self, scenario: Scenario) -> &[YearRecord] {
        match scenario {
            Scenario::Baseline => &self.baseline,
            Scenario::Firm => &self.firm,
            Scenario::Flexible => &self.flexible,
            Scenario::Dispatchable => &self.dispatchable,
        }
    }

    /// Iterates `(scenario, trajectory)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &[YearRecord])> {
        Scenario::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Deterministic rate-impact engine.
///
/// Stateless apart from its assumptions: every call validates its inputs and
/// recomputes from scratch, so one engine can be shared freely across threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateImpactEngine {
    assumptions: ModelAssumptions,
}

impl RateImpactEngine {
    /// Creates an engine with the given assumptions.
    pub fn new(assumptions: ModelAssumptions) -> Self {
        Self { assumptions }
    }

    /// Assumptions the engine computes with.
    pub fn assumptions(&self) -> &ModelAssumptions {
        &self.assumptions
    }

    /// Projects the no-new-load bill for `years` years (`years + 1` records).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an out-of-range horizon or invalid utility.
    pub fn compute_baseline_trajectory(
        &self,
        utility: &UtilityProfile,
        years: usize,
    ) -> EngineResult<Vec<YearRecord>> {
        validate_projection_years(years)?;
        utility.validate()?;
        self.assumptions.validate()?;

        let records = baseline_records(utility, years, &self.assumptions);
        ensure_finite(&records)?;
        Ok(records)
    }

    /// Projects the bill for one scenario.
    ///
    /// Passing [`Scenario::Baseline`] returns the baseline trajectory.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or `NonFiniteResult` if the
    /// projection overflows.
    pub fn compute_scenario_trajectory(
        &self,
        scenario: Scenario,
        utility: &UtilityProfile,
        data_center: &DataCenterLoadProfile,
        years: usize,
    ) -> EngineResult<Vec<YearRecord>> {
        self.validate_study(utility, data_center, years)?;

        let baseline = baseline_records(utility, years, &self.assumptions);
        let records = match LoadMode::from_scenario(scenario) {
            None => baseline,
            Some(mode) => scenario_records(mode, utility, data_center, &baseline, &self.assumptions),
        };
        ensure_finite(&records)?;
        Ok(records)
    }

    /// Projects all four scenarios over the same horizon.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or `NonFiniteResult` if any
    /// projection overflows.
    pub fn compute_all_trajectories(
        &self,
        utility: &UtilityProfile,
        data_center: &DataCenterLoadProfile,
        years: usize,
    ) -> EngineResult<AllTrajectories> {
        self.validate_study(utility, data_center, years)?;

        let baseline = baseline_records(utility, years, &self.assumptions);
        ensure_finite(&baseline)?;
        let project = |mode| {
            let records = scenario_records(mode, utility, data_center, &baseline, &self.assumptions);
            ensure_finite(&records).map(|()| records)
        };
        let firm = project(LoadMode::Firm)?;
        let flexible = project(LoadMode::Flexible)?;
        let dispatchable = project(LoadMode::Dispatchable)?;

        Ok(AllTrajectories {
            baseline,
            firm,
            flexible,
            dispatchable,
        })
    }

    /// Reduces trajectories into summary statistics.
    ///
    /// # Errors
    ///
    /// See [`SummaryStats::from_trajectories`].
    pub fn compute_summary(
        &self,
        trajectories: &AllTrajectories,
        utility: &UtilityProfile,
    ) -> EngineResult<SummaryStats> {
        SummaryStats::from_trajectories(trajectories, utility)
    }

    /// Reserve margins and scarcity price for an incremental peak.
    ///
    /// # Errors
    ///
    /// See [`compute_capacity_price`].
    pub fn compute_capacity_price(
        &self,
        utility: &UtilityProfile,
        incremental_peak_mw: f64,
    ) -> EngineResult<CapacityPriceResult> {
        compute_capacity_price(utility, incremental_peak_mw, &self.assumptions)
    }

    /// Whether a load's tariff payments cover its cost to serve.
    ///
    /// # Errors
    ///
    /// See [`compute_revenue_adequacy`].
    pub fn compute_revenue_adequacy(
        &self,
        capacity_mw: f64,
        load_factor: f64,
        peak_coincidence: f64,
        tariff: &TariffStructure,
        utility: &UtilityProfile,
        onsite_generation_mw: f64,
    ) -> EngineResult<RevenueAdequacyResult> {
        compute_revenue_adequacy(
            capacity_mw,
            load_factor,
            peak_coincidence,
            tariff,
            utility,
            onsite_generation_mw,
            &self.assumptions,
        )
    }

    fn validate_study(
        &self,
        utility: &UtilityProfile,
        data_center: &DataCenterLoadProfile,
        years: usize,
    ) -> EngineResult<()> {
        validate_projection_years(years)?;
        utility.validate()?;
        data_center.validate()?;
        self.assumptions.validate()?;
        warn_on_margin_mismatch(utility);
        Ok(())
    }
}

/// Scenarios in which the new load is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Firm,
    Flexible,
    Dispatchable,
}

impl LoadMode {
    fn from_scenario(scenario: Scenario) -> Option<Self> {
        match scenario {
            Scenario::Baseline => None,
            Scenario::Firm => Some(Self::Firm),
            Scenario::Flexible => Some(Self::Flexible),
            Scenario::Dispatchable => Some(Self::Dispatchable),
        }
    }

    fn scenario(self) -> Scenario {
        match self {
            Self::Firm => Scenario::Firm,
            Self::Flexible => Scenario::Flexible,
            Self::Dispatchable => Scenario::Dispatchable,
        }
    }
}

/// Resolves how the load runs in `mode`.
///
/// Returns the operation and the peak coincidence seen by the allocation model.
fn scenario_operation(mode: LoadMode, dc: &DataCenterLoadProfile) -> (LoadOperation, f64) {
    let firm = LoadOperation {
        capacity_mw: dc.capacity_mw,
        load_factor: dc.firm_load_factor,
        peak_coincidence: dc.firm_peak_coincidence,
        onsite_generation_mw: 0.0,
        demand_charge_rate: dc.demand_charge_rate,
        capacity_credit: false,
    };
    let flexible = LoadOperation {
        load_factor: dc.flex_load_factor,
        peak_coincidence: dc.flex_peak_coincidence,
        capacity_credit: true,
        ..firm
    };

    match mode {
        LoadMode::Firm => (firm, firm.peak_coincidence),
        LoadMode::Flexible => (flexible, flexible.peak_coincidence),
        LoadMode::Dispatchable => {
            // Generation at peak lowers the load's apparent coincidence.
            let allocation_pc =
                (dc.flex_peak_coincidence - dc.onsite_generation_mw / dc.capacity_mw).max(0.0);
            (
                LoadOperation {
                    onsite_generation_mw: dc.onsite_generation_mw,
                    ..flexible
                },
                allocation_pc,
            )
        }
    }
}

fn baseline_records(
    utility: &UtilityProfile,
    years: usize,
    assumptions: &ModelAssumptions,
) -> Vec<YearRecord> {
    let growth = 1.0 + assumptions.baseline_escalation_rate();
    (0..=years)
        .map(|year_index| {
            let monthly_bill = utility.average_monthly_bill * growth.powi(year_index as i32);
            YearRecord {
                year: BASE_YEAR + year_index as u32,
                year_index,
                monthly_bill,
                annual_bill: monthly_bill * MONTHS_PER_YEAR,
                scenario: Scenario::Baseline,
                dc_online: false,
                components: BillComponents {
                    baseline_bill: monthly_bill,
                    dc_impact: 0.0,
                    phase_in: 0.0,
                },
                parameters: None,
                metrics: None,
            }
        })
        .collect()
}

fn scenario_records(
    mode: LoadMode,
    utility: &UtilityProfile,
    dc: &DataCenterLoadProfile,
    baseline: &[YearRecord],
    assumptions: &ModelAssumptions,
) -> Vec<YearRecord> {
    let scenario = mode.scenario();
    let (op, allocation_pc) = scenario_operation(mode, dc);
    let damping = assumptions.benefit_damping(scenario);
    // The effective peak is fixed for the scenario, so capacity is priced once.
    let capacity_cost = capacity_cost_per_mw_year(utility, op.effective_peak_mw(), assumptions);
    debug!(
        %scenario,
        load_factor = op.load_factor,
        peak_coincidence = op.peak_coincidence,
        effective_peak_mw = op.effective_peak_mw(),
        capacity_cost_per_mw_year = capacity_cost,
        "projecting scenario"
    );

    baseline
        .iter()
        .map(|base| {
            let mut parameters = ScenarioParameters {
                load_factor: op.load_factor,
                peak_coincidence: op.peak_coincidence,
                allocation_peak_coincidence: allocation_pc,
                onsite_generation_mw: op.onsite_generation_mw,
                capacity_credit: op.capacity_credit,
                years_online: None,
                residential_allocation: utility.base_residential_allocation,
            };

            if base.year_index < ONLINE_YEAR_INDEX {
                return YearRecord {
                    scenario,
                    parameters: Some(parameters),
                    ..base.clone()
                };
            }

            let years_online = base.year_index - ONLINE_YEAR_INDEX;
            let phase_in = if years_online == 0 {
                FIRST_YEAR_PHASE_IN
            } else {
                1.0
            };

            let allocation =
                residential_allocation(utility, op.capacity_mw, op.load_factor, allocation_pc, years_online);
            let impact =
                net_residential_impact_at(utility, &op, allocation.allocation, capacity_cost, assumptions);

            let mut dc_impact = impact.per_customer_monthly * phase_in;
            let growth = if dc_impact > 0.0 {
                1.0 + assumptions.general_inflation
            } else {
                1.0 + assumptions.general_inflation * damping
            };
            dc_impact *= growth.powi(years_online as i32);

            parameters.years_online = Some(years_online);
            parameters.residential_allocation = allocation.allocation;

            let monthly_bill = base.monthly_bill + dc_impact;
            YearRecord {
                year: base.year,
                year_index: base.year_index,
                monthly_bill,
                annual_bill: monthly_bill * MONTHS_PER_YEAR,
                scenario,
                dc_online: true,
                components: BillComponents {
                    baseline_bill: base.monthly_bill,
                    dc_impact,
                    phase_in,
                },
                parameters: Some(parameters),
                metrics: Some(impact.metrics),
            }
        })
        .collect()
}

fn ensure_finite(records: &[YearRecord]) -> EngineResult<()> {
    match records
        .iter()
        .find(|r| !r.monthly_bill.is_finite() || !r.components.dc_impact.is_finite())
    {
        Some(r) => Err(EngineError::NonFiniteResult {
            scenario: r.scenario,
            year_index: r.year_index,
        }),
        None => Ok(()),
    }
}
