//! Catalog of named utility profiles compiled from public 2024 filings.
//!
//! Each entry carries its market structure and a typical data-center size,
//! and converts into a ready-to-run [`StudyConfig`]. Lookups go by id, by
//! region, or by market.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{ConfigError, StudyConfig};
use crate::model::{DataCenterLoadProfile, MarketType, UtilityProfile};

/// Reserve margin assumed for catalog utilities inside a capacity market.
pub const CATALOG_RESERVE_MARGIN: f64 = 0.18;

/// Share of the data center's nameplate assumed as on-site generation.
pub const CATALOG_ONSITE_FRACTION: f64 = 0.20;

/// Residential share of system energy used to back out total system energy.
const CATALOG_RESIDENTIAL_ENERGY_SHARE: f64 = 0.35;

/// Wholesale market a catalog utility sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    /// Vertically integrated, state-regulated.
    Regulated,
    /// PJM Interconnection capacity market.
    Pjm,
    /// ERCOT energy-only market.
    Ercot,
    /// MISO capacity market.
    Miso,
    /// Southwest Power Pool, no mandatory capacity market.
    Spp,
}

impl MarketKind {
    /// Engine market structure for this market.
    pub fn market_type(self) -> MarketType {
        match self {
            MarketKind::Regulated | MarketKind::Spp => MarketType::Regulated,
            MarketKind::Pjm | MarketKind::Miso => MarketType::IsoCapacityMarket,
            MarketKind::Ercot => MarketType::EnergyOnly,
        }
    }
}

/// Cost-allocation terms of a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketProfile {
    pub kind: MarketKind,
    pub has_capacity_market: bool,
    pub base_residential_allocation: f64,
    pub capacity_cost_pass_through: f64,
    pub transmission_allocation: f64,
    pub utility_owns_generation: bool,
    /// 2024 clearing price ($/MW-day), capacity markets only.
    pub capacity_price_2024: Option<f64>,
    pub notes: &'static str,
}

pub const REGULATED_MARKET: MarketProfile = MarketProfile {
    kind: MarketKind::Regulated,
    has_capacity_market: false,
    base_residential_allocation: 0.40,
    capacity_cost_pass_through: 0.40,
    transmission_allocation: 0.35,
    utility_owns_generation: true,
    capacity_price_2024: None,
    notes: "Vertically integrated utility. Infrastructure costs allocated through traditional rate base.",
};

pub const PJM_MARKET: MarketProfile = MarketProfile {
    kind: MarketKind::Pjm,
    has_capacity_market: true,
    base_residential_allocation: 0.35,
    capacity_cost_pass_through: 0.50,
    transmission_allocation: 0.35,
    utility_owns_generation: false,
    capacity_price_2024: Some(269.92),
    notes: "PJM capacity market. 2024 auction cleared at $269.92/MW-day.",
};

pub const ERCOT_MARKET: MarketProfile = MarketProfile {
    kind: MarketKind::Ercot,
    has_capacity_market: false,
    base_residential_allocation: 0.30,
    capacity_cost_pass_through: 0.25,
    transmission_allocation: 0.35,
    utility_owns_generation: false,
    capacity_price_2024: None,
    notes: "Energy-only market with no capacity payments.",
};

pub const MISO_MARKET: MarketProfile = MarketProfile {
    kind: MarketKind::Miso,
    has_capacity_market: true,
    base_residential_allocation: 0.38,
    capacity_cost_pass_through: 0.35,
    transmission_allocation: 0.35,
    utility_owns_generation: true,
    capacity_price_2024: Some(30.0),
    notes: "MISO capacity market with lower clearing prices than PJM.",
};

pub const SPP_MARKET: MarketProfile = MarketProfile {
    kind: MarketKind::Spp,
    has_capacity_market: false,
    base_residential_allocation: 0.40,
    capacity_cost_pass_through: 0.40,
    transmission_allocation: 0.35,
    utility_owns_generation: true,
    capacity_price_2024: None,
    notes: "Southwest Power Pool. Energy market but no mandatory capacity market.",
};

/// One named utility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtilityEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    /// Empty for the custom entry.
    pub state: &'static str,
    /// Empty for the custom entry.
    pub region: &'static str,
    pub residential_customers: u64,
    pub total_customers: u64,
    pub system_peak_mw: f64,
    pub avg_monthly_bill: f64,
    pub avg_monthly_usage_kwh: f64,
    pub market: MarketProfile,
    pub has_dc_activity: bool,
    pub dc_notes: &'static str,
    /// Typical data-center size proposed in the territory (MW).
    pub default_dc_mw: f64,
}

impl UtilityEntry {
    /// Dropdown label: `"Short Name (State)"`, or the short name alone.
    pub fn display_name(&self) -> String {
        if self.state.is_empty() {
            self.short_name.to_string()
        } else {
            format!("{} ({})", self.short_name, self.state)
        }
    }

    /// Engine utility snapshot for this entry.
    ///
    /// Non-residential accounts are folded into `commercial_customers`.
    /// System energy is backed out of residential usage, and capacity-market
    /// entries get generation at [`CATALOG_RESERVE_MARGIN`] above peak.
    pub fn utility_profile(&self) -> UtilityProfile {
        let market = &self.market;
        let residential_energy_gwh =
            self.residential_customers as f64 * self.avg_monthly_usage_kwh * 12.0 / 1.0e6;
        UtilityProfile {
            residential_customers: self.residential_customers,
            commercial_customers: self
                .total_customers
                .saturating_sub(self.residential_customers),
            industrial_customers: 0,
            average_monthly_bill: self.avg_monthly_bill,
            system_peak_mw: self.system_peak_mw,
            total_generation_capacity_mw: market
                .has_capacity_market
                .then(|| self.system_peak_mw * (1.0 + CATALOG_RESERVE_MARGIN)),
            has_capacity_market: market.has_capacity_market,
            capacity_price_2024: market.capacity_price_2024,
            market_type: market.kind.market_type(),
            base_residential_allocation: market.base_residential_allocation,
            capacity_cost_pass_through: market.capacity_cost_pass_through,
            pre_dc_system_energy_gwh: residential_energy_gwh / CATALOG_RESIDENTIAL_ENERGY_SHARE,
            residential_energy_share: CATALOG_RESIDENTIAL_ENERGY_SHARE,
            ..UtilityProfile::default()
        }
    }

    /// Study with this utility and its typical data center.
    pub fn study(&self) -> StudyConfig {
        StudyConfig {
            utility: self.utility_profile(),
            data_center: DataCenterLoadProfile {
                capacity_mw: self.default_dc_mw,
                onsite_generation_mw: self.default_dc_mw * CATALOG_ONSITE_FRACTION,
                ..DataCenterLoadProfile::default()
            },
            ..StudyConfig::default()
        }
    }
}

/// Every catalog entry, custom last.
pub const UTILITY_PROFILES: &[UtilityEntry] = &[
    UtilityEntry {
        id: "pso-oklahoma",
        name: "Public Service Company of Oklahoma (PSO)",
        short_name: "PSO Oklahoma",
        state: "Oklahoma",
        region: "Southwest",
        residential_customers: 460_000,
        total_customers: 575_000,
        system_peak_mw: 4_400.0,
        avg_monthly_bill: 130.0,
        avg_monthly_usage_kwh: 1_100.0,
        market: SPP_MARKET,
        has_dc_activity: true,
        dc_notes: "Multiple large data center proposals; 779 MW of new large load requests",
        default_dc_mw: 1_000.0,
    },
    UtilityEntry {
        id: "duke-carolinas",
        name: "Duke Energy Carolinas",
        short_name: "Duke Carolinas",
        state: "North Carolina / South Carolina",
        region: "Southeast",
        residential_customers: 2_507_000,
        total_customers: 2_926_000,
        system_peak_mw: 20_700.0,
        avg_monthly_bill: 135.0,
        avg_monthly_usage_kwh: 1_000.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Growing data center presence in Charlotte metro area",
        default_dc_mw: 1_000.0,
    },
    UtilityEntry {
        id: "duke-progress",
        name: "Duke Energy Progress",
        short_name: "Duke Progress",
        state: "North Carolina / South Carolina",
        region: "Southeast",
        residential_customers: 1_400_000,
        total_customers: 1_700_000,
        system_peak_mw: 13_800.0,
        avg_monthly_bill: 132.0,
        avg_monthly_usage_kwh: 1_000.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Serves Raleigh area with growing tech sector",
        default_dc_mw: 800.0,
    },
    UtilityEntry {
        id: "georgia-power",
        name: "Georgia Power",
        short_name: "Georgia Power",
        state: "Georgia",
        region: "Southeast",
        residential_customers: 2_400_000,
        total_customers: 2_804_000,
        system_peak_mw: 17_100.0,
        avg_monthly_bill: 153.0,
        avg_monthly_usage_kwh: 1_150.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Projecting 8,200 MW load growth by 2030 including data centers",
        default_dc_mw: 1_200.0,
    },
    UtilityEntry {
        id: "aps-arizona",
        name: "Arizona Public Service (APS)",
        short_name: "APS Arizona",
        state: "Arizona",
        region: "Southwest",
        residential_customers: 1_200_000,
        total_customers: 1_400_000,
        system_peak_mw: 8_212.0,
        avg_monthly_bill: 140.0,
        avg_monthly_usage_kwh: 1_050.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Phoenix metro data center growth; 40% peak growth by 2031",
        default_dc_mw: 800.0,
    },
    UtilityEntry {
        id: "nv-energy",
        name: "NV Energy",
        short_name: "NV Energy Nevada",
        state: "Nevada",
        region: "West",
        residential_customers: 610_000,
        total_customers: 2_400_000,
        system_peak_mw: 9_000.0,
        avg_monthly_bill: 125.0,
        avg_monthly_usage_kwh: 900.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Data centers requesting to triple peak demand",
        default_dc_mw: 1_500.0,
    },
    UtilityEntry {
        id: "xcel-colorado",
        name: "Xcel Energy Colorado",
        short_name: "Xcel Colorado",
        state: "Colorado",
        region: "Mountain West",
        residential_customers: 1_400_000,
        total_customers: 1_600_000,
        system_peak_mw: 7_200.0,
        avg_monthly_bill: 105.0,
        avg_monthly_usage_kwh: 700.0,
        market: REGULATED_MARKET,
        has_dc_activity: true,
        dc_notes: "Data centers to drive 2/3 of new demand",
        default_dc_mw: 600.0,
    },
    UtilityEntry {
        id: "aep-ohio",
        name: "AEP Ohio",
        short_name: "AEP Ohio",
        state: "Ohio",
        region: "Midwest",
        residential_customers: 1_200_000,
        total_customers: 1_500_000,
        system_peak_mw: 12_000.0,
        avg_monthly_bill: 135.0,
        avg_monthly_usage_kwh: 900.0,
        market: MarketProfile {
            notes: "AEP Ohio operates in PJM. Ohio is deregulated but AEP owns transmission.",
            ..PJM_MARKET
        },
        has_dc_activity: true,
        dc_notes: "Ohio seeing significant data center growth; AEP proposed new rate class",
        default_dc_mw: 1_000.0,
    },
    UtilityEntry {
        id: "aep-indiana-michigan",
        name: "Indiana Michigan Power (I&M)",
        short_name: "AEP I&M",
        state: "Indiana / Michigan",
        region: "Midwest",
        residential_customers: 480_000,
        total_customers: 600_000,
        system_peak_mw: 5_500.0,
        avg_monthly_bill: 130.0,
        avg_monthly_usage_kwh: 950.0,
        market: MarketProfile {
            utility_owns_generation: true,
            base_residential_allocation: 0.38,
            notes: "I&M operates in PJM but owns generation including Cook Nuclear.",
            ..PJM_MARKET
        },
        has_dc_activity: true,
        dc_notes: "Northeast Indiana seeing industrial and data center growth",
        default_dc_mw: 500.0,
    },
    UtilityEntry {
        id: "aep-appalachian",
        name: "Appalachian Power (APCo)",
        short_name: "AEP Appalachian",
        state: "Virginia / West Virginia",
        region: "Appalachian",
        residential_customers: 800_000,
        total_customers: 1_000_000,
        system_peak_mw: 7_000.0,
        avg_monthly_bill: 125.0,
        avg_monthly_usage_kwh: 1_000.0,
        market: MarketProfile {
            utility_owns_generation: true,
            base_residential_allocation: 0.40,
            notes: "Appalachian Power operates in PJM but WV remains traditionally regulated.",
            ..PJM_MARKET
        },
        has_dc_activity: true,
        dc_notes: "Virginia portion seeing data center interest as NoVA constrained",
        default_dc_mw: 600.0,
    },
    UtilityEntry {
        id: "aep-swepco",
        name: "Southwestern Electric Power (SWEPCO)",
        short_name: "AEP SWEPCO",
        state: "Arkansas / Louisiana / Texas",
        region: "Southwest",
        residential_customers: 400_000,
        total_customers: 540_000,
        system_peak_mw: 4_800.0,
        avg_monthly_bill: 120.0,
        avg_monthly_usage_kwh: 1_100.0,
        market: MarketProfile {
            notes: "SWEPCO operates in SPP. Vertically integrated with state PUC regulation.",
            ..SPP_MARKET
        },
        has_dc_activity: false,
        dc_notes: "Less data center activity than other AEP territories",
        default_dc_mw: 400.0,
    },
    UtilityEntry {
        id: "dominion-virginia",
        name: "Dominion Energy Virginia",
        short_name: "Dominion Virginia",
        state: "Virginia",
        region: "Mid-Atlantic",
        residential_customers: 2_500_000,
        total_customers: 2_800_000,
        system_peak_mw: 18_000.0,
        avg_monthly_bill: 145.0,
        avg_monthly_usage_kwh: 1_050.0,
        market: MarketProfile {
            utility_owns_generation: true,
            base_residential_allocation: 0.35,
            notes: "Dominion operates in PJM. Data center capital of the world.",
            ..PJM_MARKET
        },
        has_dc_activity: true,
        dc_notes: "Forecasting 9 GW data center peak in 10 years",
        default_dc_mw: 1_500.0,
    },
    UtilityEntry {
        id: "ercot-texas",
        name: "ERCOT (Texas Grid)",
        short_name: "ERCOT Texas",
        state: "Texas",
        region: "Texas",
        residential_customers: 12_000_000,
        total_customers: 26_000_000,
        system_peak_mw: 85_508.0,
        avg_monthly_bill: 140.0,
        avg_monthly_usage_kwh: 1_100.0,
        market: MarketProfile {
            notes: "Energy-only market. 46% of projected load growth from data centers.",
            ..ERCOT_MARKET
        },
        has_dc_activity: true,
        dc_notes: "Data centers account for 46% of projected load growth",
        default_dc_mw: 3_000.0,
    },
    UtilityEntry {
        id: "custom",
        name: "Custom / Enter Your Own",
        short_name: "Custom",
        state: "",
        region: "",
        residential_customers: 500_000,
        total_customers: 600_000,
        system_peak_mw: 4_000.0,
        avg_monthly_bill: 144.0,
        avg_monthly_usage_kwh: 865.0,
        market: REGULATED_MARKET,
        has_dc_activity: false,
        dc_notes: "Enter your own utility parameters",
        default_dc_mw: 1_000.0,
    },
];

/// Looks up an entry by id.
pub fn by_id(id: &str) -> Option<&'static UtilityEntry> {
    UTILITY_PROFILES.iter().find(|p| p.id == id)
}

/// Study for a catalog id.
///
/// # Errors
///
/// Returns a `ConfigError` on field `utility_id` if the id is unknown.
pub fn study_for(id: &str) -> Result<StudyConfig, ConfigError> {
    by_id(id).map(UtilityEntry::study).ok_or_else(|| ConfigError {
        field: "utility_id".to_string(),
        message: format!("unknown utility \"{id}\", see --list-utilities"),
    })
}

/// `(display name, id)` pairs in catalog order.
pub fn options() -> Vec<(String, &'static str)> {
    UTILITY_PROFILES
        .iter()
        .map(|p| (p.display_name(), p.id))
        .collect()
}

/// Entries grouped by region; an empty region groups under `"Other"`.
pub fn by_region() -> BTreeMap<&'static str, Vec<&'static UtilityEntry>> {
    let mut groups: BTreeMap<&'static str, Vec<&'static UtilityEntry>> = BTreeMap::new();
    for p in UTILITY_PROFILES {
        let region = if p.region.is_empty() { "Other" } else { p.region };
        groups.entry(region).or_default().push(p);
    }
    groups
}

/// Entries grouped by market.
pub fn by_market() -> BTreeMap<MarketKind, Vec<&'static UtilityEntry>> {
    let mut groups: BTreeMap<MarketKind, Vec<&'static UtilityEntry>> = BTreeMap::new();
    for p in UTILITY_PROFILES {
        groups.entry(p.market.kind).or_default().push(p);
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::RateImpactEngine;

    #[test]
    fn catalog_ids_are_unique() {
        assert_eq!(UTILITY_PROFILES.len(), 14);
        let ids: HashSet<&str> = UTILITY_PROFILES.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), UTILITY_PROFILES.len());
        assert_eq!(UTILITY_PROFILES.last().map(|p| p.id), Some("custom"));
    }

    #[test]
    fn every_entry_validates_and_projects() {
        let engine = RateImpactEngine::default();
        for p in UTILITY_PROFILES {
            let study = p.study();
            assert!(study.validate().is_empty(), "{}: {:?}", p.id, study.validate());
            let t = engine
                .compute_all_trajectories(&study.utility, &study.data_center, 20)
                .unwrap_or_else(|e| panic!("{}: {e}", p.id));
            assert_eq!(t.firm.len(), 21, "{}", p.id);
            assert!(
                t.dispatchable[20].monthly_bill <= t.firm[20].monthly_bill,
                "{}",
                p.id
            );
        }
    }

    #[test]
    fn by_id_finds_entries() {
        let dominion = by_id("dominion-virginia").unwrap();
        assert_eq!(dominion.market.kind, MarketKind::Pjm);
        assert_eq!(dominion.market.base_residential_allocation, 0.35);
        assert!(dominion.market.utility_owns_generation);
        assert!(by_id("nope").is_none());
    }

    #[test]
    fn overrides_keep_base_market_terms() {
        let im = by_id("aep-indiana-michigan").unwrap();
        assert_eq!(im.market.base_residential_allocation, 0.38);
        assert_eq!(im.market.capacity_price_2024, Some(269.92));
        assert_eq!(im.market.capacity_cost_pass_through, 0.50);
    }

    #[test]
    fn options_label_with_state() {
        let opts = options();
        assert_eq!(opts[0], ("PSO Oklahoma (Oklahoma)".to_string(), "pso-oklahoma"));
        assert_eq!(opts.last().map(|(l, _)| l.as_str()), Some("Custom"));
    }

    #[test]
    fn groups_by_region_and_market() {
        let regions = by_region();
        assert_eq!(regions["Southwest"].len(), 3);
        assert_eq!(regions["Other"][0].id, "custom");

        let markets = by_market();
        assert_eq!(markets[&MarketKind::Pjm].len(), 4);
        assert_eq!(markets[&MarketKind::Regulated].len(), 7);
        assert_eq!(markets[&MarketKind::Spp].len(), 2);
        assert_eq!(markets[&MarketKind::Ercot].len(), 1);
        assert!(!markets.contains_key(&MarketKind::Miso));
    }

    #[test]
    fn pjm_entry_maps_to_capacity_market() {
        let u = by_id("aep-ohio").unwrap().utility_profile();
        assert_eq!(u.market_type, MarketType::IsoCapacityMarket);
        assert!(u.has_capacity_market);
        assert!((u.total_generation_capacity_mw.unwrap() - 14_160.0).abs() < 1e-6);
        assert_eq!(u.commercial_customers, 300_000);
        assert_eq!(u.total_customers(), 1_500_000);
    }

    #[test]
    fn system_energy_from_residential_usage() {
        let u = by_id("dominion-virginia").unwrap().utility_profile();
        // 2.5M homes at 1,050 kWh/month is 31,500 GWh residential
        assert!((u.pre_dc_system_energy_gwh - 31_500.0 / 0.35).abs() < 1e-6);
    }

    #[test]
    fn study_sizes_data_center() {
        let s = by_id("ercot-texas").unwrap().study();
        assert_eq!(s.utility.market_type, MarketType::EnergyOnly);
        assert_eq!(s.data_center.capacity_mw, 3_000.0);
        assert!((s.data_center.onsite_generation_mw - 600.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_id_is_config_error() {
        assert_eq!(study_for("nope").unwrap_err().field, "utility_id");
        assert!(study_for("custom").is_ok());
    }
}
