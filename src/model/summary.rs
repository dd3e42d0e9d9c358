//! Summary statistics over a study's four trajectories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::trajectory::{AllTrajectories, YearRecord};
use super::types::{Scenario, UtilityProfile};

/// One value per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValues {
    /// No new load.
    pub baseline: f64,
    /// Inflexible load.
    #[serde(alias = "unoptimized")]
    pub firm: f64,
    /// Curtailable load.
    pub flexible: f64,
    /// Curtailable load with on-site generation.
    pub dispatchable: f64,
}

impl ScenarioValues {
    fn from_fn(mut f: impl FnMut(Scenario) -> f64) -> Self {
        Self {
            baseline: f(Scenario::Baseline),
            firm: f(Scenario::Firm),
            flexible: f(Scenario::Flexible),
            dispatchable: f(Scenario::Dispatchable),
        }
    }

    /// Value for `scenario`.
    pub fn get(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Baseline => self.baseline,
            Scenario::Firm => self.firm,
            Scenario::Flexible => self.flexible,
            Scenario::Dispatchable => self.dispatchable,
        }
    }
}

/// One value per load scenario, relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadScenarioValues {
    /// Inflexible load.
    #[serde(alias = "unoptimized")]
    pub firm: f64,
    /// Curtailable load.
    pub flexible: f64,
    /// Curtailable load with on-site generation.
    pub dispatchable: f64,
}

/// Savings of the optimized scenarios against firm operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizedSavings {
    /// Firm final bill minus flexible final bill ($/month).
    pub flexible: f64,
    /// Firm final bill minus dispatchable final bill ($/month).
    pub dispatchable: f64,
}

/// Final-year deltas, cumulative costs and cross-scenario savings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Average residential bill today ($/month).
    pub current_monthly_bill: f64,
    /// Last projected monthly bill per scenario ($/month).
    pub final_year_bills: ScenarioValues,
    /// Final bill minus baseline final bill ($/month, negative is a benefit).
    pub final_year_difference: LoadScenarioValues,
    /// Sum of annual bills over the horizon per household ($).
    pub cumulative_household_costs: ScenarioValues,
    /// Final-bill savings of flexible operation against firm ($/month).
    pub savings_vs_unoptimized: OptimizedSavings,
    /// Baseline cumulative cost minus scenario cumulative cost, all households ($).
    pub cumulative_community_savings: LoadScenarioValues,
    /// `(final - current) / current` per scenario (fraction).
    pub percent_change: ScenarioValues,
}

impl SummaryStats {
    /// Reduces trajectories into summary statistics.
    ///
    /// Pure: the same trajectories always produce the same statistics.
    ///
    /// # Arguments
    ///
    /// * `trajectories` - Output of [`super::RateImpactEngine::compute_all_trajectories`]
    /// * `utility` - Utility the trajectories were computed for
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an invalid utility, an empty trajectory,
    /// or trajectories of different lengths.
    pub fn from_trajectories(
        trajectories: &AllTrajectories,
        utility: &UtilityProfile,
    ) -> EngineResult<Self> {
        utility.validate()?;

        let horizon = trajectories.baseline.len();
        for (scenario, records) in trajectories.iter() {
            if records.is_empty() {
                return Err(EngineError::invalid(
                    format!("trajectories.{scenario}"),
                    "must not be empty",
                ));
            }
            if records.len() != horizon {
                return Err(EngineError::invalid(
                    format!("trajectories.{scenario}"),
                    "all scenarios must cover the same years",
                ));
            }
        }

        let current = utility.average_monthly_bill;
        let households = utility.residential_customers as f64;

        let final_year_bills =
            ScenarioValues::from_fn(|s| final_bill(trajectories.get(s)));
        let cumulative_household_costs =
            ScenarioValues::from_fn(|s| trajectories.get(s).iter().map(|r| r.annual_bill).sum());
        let percent_change =
            ScenarioValues::from_fn(|s| (final_year_bills.get(s) - current) / current);

        let f = final_year_bills;
        let c = cumulative_household_costs;
        Ok(Self {
            current_monthly_bill: current,
            final_year_bills: f,
            final_year_difference: LoadScenarioValues {
                firm: f.firm - f.baseline,
                flexible: f.flexible - f.baseline,
                dispatchable: f.dispatchable - f.baseline,
            },
            cumulative_household_costs: c,
            savings_vs_unoptimized: OptimizedSavings {
                flexible: f.firm - f.flexible,
                dispatchable: f.firm - f.dispatchable,
            },
            cumulative_community_savings: LoadScenarioValues {
                firm: (c.baseline - c.firm) * households,
                flexible: (c.baseline - c.flexible) * households,
                dispatchable: (c.baseline - c.dispatchable) * households,
            },
            percent_change,
        })
    }
}

fn final_bill(records: &[YearRecord]) -> f64 {
    records.last().map_or(0.0, |r| r.monthly_bill)
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bills = &self.final_year_bills;
        let diff = &self.final_year_difference;
        let pct = &self.percent_change;

        writeln!(f, "--- Residential Bill Summary ---")?;
        writeln!(f, "Current monthly bill:  ${:.2}", self.current_monthly_bill)?;
        writeln!(
            f,
            "Baseline final bill:   ${:.2} ({:+.1}%)",
            bills.baseline,
            pct.baseline * 100.0
        )?;
        writeln!(
            f,
            "Firm final bill:       ${:.2} ({:+.2} vs baseline)",
            bills.firm, diff.firm
        )?;
        writeln!(
            f,
            "Flexible final bill:   ${:.2} ({:+.2} vs baseline)",
            bills.flexible, diff.flexible
        )?;
        writeln!(
            f,
            "Dispatchable final:    ${:.2} ({:+.2} vs baseline)",
            bills.dispatchable, diff.dispatchable
        )?;
        writeln!(
            f,
            "Savings vs firm:       ${:.2} flexible, ${:.2} dispatchable",
            self.savings_vs_unoptimized.flexible, self.savings_vs_unoptimized.dispatchable
        )?;
        write!(
            f,
            "Community savings:     ${:.0} flexible, ${:.0} dispatchable",
            self.cumulative_community_savings.flexible,
            self.cumulative_community_savings.dispatchable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::trajectory::BillComponents;

    fn record(scenario: Scenario, year_index: usize, monthly_bill: f64) -> YearRecord {
        YearRecord {
            year: 2025 + year_index as u32,
            year_index,
            monthly_bill,
            annual_bill: monthly_bill * 12.0,
            scenario,
            dc_online: false,
            components: BillComponents {
                baseline_bill: monthly_bill,
                dc_impact: 0.0,
                phase_in: 0.0,
            },
            parameters: None,
            metrics: None,
        }
    }

    fn trajectories() -> AllTrajectories {
        let series = |s: Scenario, bills: [f64; 2]| {
            bills
                .iter()
                .enumerate()
                .map(|(i, b)| record(s, i, *b))
                .collect::<Vec<_>>()
        };
        AllTrajectories {
            baseline: series(Scenario::Baseline, [100.0, 110.0]),
            firm: series(Scenario::Firm, [100.0, 115.0]),
            flexible: series(Scenario::Flexible, [100.0, 111.0]),
            dispatchable: series(Scenario::Dispatchable, [100.0, 108.0]),
        }
    }

    fn utility() -> UtilityProfile {
        UtilityProfile {
            residential_customers: 1_000,
            average_monthly_bill: 100.0,
            ..UtilityProfile::default()
        }
    }

    #[test]
    fn hand_computed_summary() {
        let s = SummaryStats::from_trajectories(&trajectories(), &utility()).unwrap();
        assert_eq!(s.current_monthly_bill, 100.0);
        assert_eq!(s.final_year_bills.firm, 115.0);
        assert!((s.final_year_difference.firm - 5.0).abs() < 1e-12);
        assert!((s.final_year_difference.dispatchable + 2.0).abs() < 1e-12);
        assert!((s.savings_vs_unoptimized.flexible - 4.0).abs() < 1e-12);
        assert!((s.savings_vs_unoptimized.dispatchable - 7.0).abs() < 1e-12);
        assert!((s.cumulative_household_costs.baseline - 2_520.0).abs() < 1e-9);
        // (2520 - 2580) * 1000
        assert!((s.cumulative_community_savings.firm + 60_000.0).abs() < 1e-6);
        assert!((s.cumulative_community_savings.dispatchable - 24_000.0).abs() < 1e-6);
        assert!((s.percent_change.baseline - 0.10).abs() < 1e-12);
    }

    #[test]
    fn summary_is_idempotent() {
        let t = trajectories();
        let a = SummaryStats::from_trajectories(&t, &utility()).unwrap();
        let b = SummaryStats::from_trajectories(&t, &utility()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_trajectory_rejected() {
        let mut t = trajectories();
        t.flexible.clear();
        let err = SummaryStats::from_trajectories(&t, &utility()).unwrap_err();
        assert_eq!(err.field(), Some("trajectories.flexible"));
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let mut t = trajectories();
        t.firm.pop();
        assert!(SummaryStats::from_trajectories(&t, &utility()).is_err());
    }

    #[test]
    fn display_contains_header() {
        let s = SummaryStats::from_trajectories(&trajectories(), &utility()).unwrap();
        let text = s.to_string();
        assert!(text.contains("--- Residential Bill Summary ---"));
        assert!(text.contains("$115.00"));
    }
}
