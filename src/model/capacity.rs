//! Reserve-margin and scarcity capacity-price model.
//!
//! The clearing price follows a hockey-stick in reserve margin: flat while the
//! margin stays at or above the scarcity threshold, then rising exponentially
//! with the shortfall below it. The rise is capped at a multiple of the
//! starting price so the curve stays bounded as the margin goes negative.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::RESERVE_MARGIN_TOLERANCE;
use crate::error::{EngineError, EngineResult};

use super::types::{ModelAssumptions, UtilityProfile};

/// Reserve margins and capacity prices before and after the new load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPriceResult {
    /// Reserve margin before the new load (fraction).
    pub old_reserve_margin: f64,
    /// Reserve margin with the new load (fraction, may be negative).
    pub new_reserve_margin: f64,
    /// New margin is below the scarcity threshold.
    pub is_scarcity: bool,
    /// New margin is below the critical threshold.
    pub is_critical: bool,
    /// Starting clearing price ($/MW-day).
    pub old_price: f64,
    /// Scarcity-adjusted clearing price ($/MW-day).
    pub new_price: f64,
    /// `new_price - old_price`.
    pub price_increase: f64,
}

/// Peak the load adds to the system after curtailment and on-site generation (MW, >= 0).
pub fn dc_peak_contribution_mw(capacity_mw: f64, peak_coincidence: f64, onsite_offset_mw: f64) -> f64 {
    (capacity_mw * peak_coincidence - onsite_offset_mw).max(0.0)
}

/// Computes reserve margins and the scarcity-adjusted capacity price.
///
/// Both margins are measured against the same generation basis, so a
/// positive increment always lowers the margin.
///
/// # Arguments
///
/// * `utility` - Host utility snapshot
/// * `incremental_peak_mw` - Peak contribution of the new load (negative values clamp to 0)
/// * `assumptions` - Thresholds and curve shape
///
/// # Errors
///
/// Returns `InvalidParameter` for an invalid utility or a non-finite increment,
/// and `InconsistentMarketConfig` for a capacity market without generation data.
pub fn compute_capacity_price(
    utility: &UtilityProfile,
    incremental_peak_mw: f64,
    assumptions: &ModelAssumptions,
) -> EngineResult<CapacityPriceResult> {
    utility.validate()?;
    assumptions.validate()?;
    if !incremental_peak_mw.is_finite() {
        return Err(EngineError::invalid(
            "incremental_peak_mw",
            "must be a finite number",
        ));
    }
    warn_on_margin_mismatch(utility);
    Ok(capacity_price(utility, incremental_peak_mw, assumptions))
}

/// Generation the reserve margins are measured against (MW).
///
/// A reported margin takes precedence: generation is then `peak × (1 + margin)`.
/// Otherwise the stated or default-implied capacity is used.
pub fn margin_basis_generation_mw(utility: &UtilityProfile) -> f64 {
    match utility.current_reserve_margin {
        Some(reported) => utility.system_peak_mw * (1.0 + reported),
        None => utility.generation_capacity_mw(),
    }
}

/// Logs once when a reported margin disagrees with stated generation and peak.
pub(crate) fn warn_on_margin_mismatch(utility: &UtilityProfile) {
    if let (Some(reported), Some(generation)) = (
        utility.current_reserve_margin,
        utility.total_generation_capacity_mw,
    ) {
        let implied = (generation - utility.system_peak_mw) / utility.system_peak_mw;
        if (reported - implied).abs() > RESERVE_MARGIN_TOLERANCE {
            warn!(
                reported,
                implied,
                "reported reserve margin disagrees with generation and peak data; using reported"
            );
        }
    }
}

/// Unchecked core of [`compute_capacity_price`] for already-validated inputs.
pub(crate) fn capacity_price(
    utility: &UtilityProfile,
    incremental_peak_mw: f64,
    assumptions: &ModelAssumptions,
) -> CapacityPriceResult {
    let peak = utility.system_peak_mw;
    let generation = margin_basis_generation_mw(utility);
    let old_reserve_margin = (generation - peak) / peak;

    let new_peak = peak + incremental_peak_mw.max(0.0);
    let new_reserve_margin = (generation - new_peak) / new_peak;

    let old_price = utility.capacity_price_2024.unwrap_or(0.0);
    let new_price = if utility.has_capacity_market {
        old_price * price_multiplier(old_reserve_margin, new_reserve_margin, assumptions)
    } else {
        old_price
    };

    CapacityPriceResult {
        old_reserve_margin,
        new_reserve_margin,
        is_scarcity: new_reserve_margin < assumptions.scarcity_reserve_margin,
        is_critical: new_reserve_margin < assumptions.critical_reserve_margin,
        old_price,
        new_price,
        price_increase: new_price - old_price,
    }
}

/// Ratio of the price at `new_margin` to the price at `old_margin`, capped.
///
/// Evaluated in log space so extreme margins cannot overflow.
fn price_multiplier(old_margin: f64, new_margin: f64, assumptions: &ModelAssumptions) -> f64 {
    let shortfall = |m: f64| (assumptions.scarcity_reserve_margin - m).max(0.0);
    let log_ratio =
        assumptions.scarcity_curve_steepness * (shortfall(new_margin) - shortfall(old_margin));
    log_ratio
        .min(assumptions.max_capacity_price_multiplier.ln())
        .exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::MarketType;

    fn capacity_market_utility(generation_mw: f64) -> UtilityProfile {
        UtilityProfile {
            has_capacity_market: true,
            market_type: MarketType::IsoCapacityMarket,
            total_generation_capacity_mw: Some(generation_mw),
            capacity_price_2024: Some(100.0),
            system_peak_mw: 4_000.0,
            ..UtilityProfile::default()
        }
    }

    #[test]
    fn peak_contribution_clamps_at_zero() {
        assert_eq!(dc_peak_contribution_mw(100.0, 0.5, 80.0), 0.0);
        assert!((dc_peak_contribution_mw(1_000.0, 0.75, 200.0) - 550.0).abs() < 1e-9);
    }

    #[test]
    fn zero_margin_is_scarce_and_critical() {
        let utility = capacity_market_utility(4_500.0);
        let r = compute_capacity_price(&utility, 500.0, &ModelAssumptions::default()).unwrap();
        assert!((r.old_reserve_margin - 0.125).abs() < 1e-12);
        assert!(r.new_reserve_margin.abs() < 1e-12);
        assert!(r.is_scarcity);
        assert!(r.is_critical);
        assert!(r.price_increase > 0.0);
    }

    #[test]
    fn flat_above_scarcity_threshold() {
        let utility = capacity_market_utility(6_000.0);
        let r = compute_capacity_price(&utility, 100.0, &ModelAssumptions::default()).unwrap();
        assert!(r.new_reserve_margin > 0.15);
        assert!(!r.is_scarcity);
        assert_eq!(r.new_price, r.old_price);
    }

    #[test]
    fn price_curve_is_convex_below_threshold() {
        let utility = capacity_market_utility(4_600.0);
        let a = ModelAssumptions::default();
        let p = |mw: f64| capacity_price(&utility, mw, &a).new_price;
        let step1 = p(200.0) - p(100.0);
        let step2 = p(300.0) - p(200.0);
        assert!(step2 > step1, "slope should accelerate: {step1} then {step2}");
    }

    #[test]
    fn price_is_capped() {
        let utility = capacity_market_utility(4_500.0);
        let a = ModelAssumptions::default();
        let r = capacity_price(&utility, 50_000.0, &a);
        assert!(r.new_reserve_margin < -0.5);
        assert!((r.new_price - 100.0 * a.max_capacity_price_multiplier).abs() < 1e-9);
    }

    #[test]
    fn no_capacity_market_is_price_neutral() {
        let utility = UtilityProfile {
            total_generation_capacity_mw: Some(4_500.0),
            ..UtilityProfile::default()
        };
        let r = compute_capacity_price(&utility, 500.0, &ModelAssumptions::default()).unwrap();
        assert_eq!(r.price_increase, 0.0);
        assert!(r.new_reserve_margin < r.old_reserve_margin);
    }

    #[test]
    fn reported_margin_takes_precedence() {
        let utility = UtilityProfile {
            current_reserve_margin: Some(0.20),
            ..UtilityProfile::default()
        };
        let r = compute_capacity_price(&utility, 0.0, &ModelAssumptions::default()).unwrap();
        assert!((r.old_reserve_margin - 0.20).abs() < 1e-12);
        assert!((r.new_reserve_margin - 0.20).abs() < 1e-12);
    }

    #[test]
    fn reported_margin_sets_generation_basis() {
        // Stated generation implies 12.5%, reported says 0%.
        let utility = UtilityProfile {
            current_reserve_margin: Some(0.0),
            ..capacity_market_utility(4_500.0)
        };
        let r = compute_capacity_price(&utility, 100.0, &ModelAssumptions::default()).unwrap();
        assert_eq!(r.old_reserve_margin, 0.0);
        assert!((r.new_reserve_margin - (4_000.0 / 4_100.0 - 1.0)).abs() < 1e-12);
        assert!(r.new_reserve_margin < r.old_reserve_margin);
        assert!(r.price_increase >= 0.0);
        assert!((margin_basis_generation_mw(&utility) - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_increment_clamps() {
        let utility = capacity_market_utility(4_500.0);
        let r = compute_capacity_price(&utility, -300.0, &ModelAssumptions::default()).unwrap();
        assert!((r.new_reserve_margin - r.old_reserve_margin).abs() < 1e-12);
        assert_eq!(r.price_increase, 0.0);
    }

    #[test]
    fn missing_generation_with_capacity_market_fails() {
        let mut utility = capacity_market_utility(4_500.0);
        utility.total_generation_capacity_mw = None;
        let err = compute_capacity_price(&utility, 100.0, &ModelAssumptions::default());
        assert!(matches!(
            err,
            Err(EngineError::InconsistentMarketConfig { .. })
        ));
    }

    #[test]
    fn nan_increment_fails() {
        let utility = capacity_market_utility(4_500.0);
        assert!(compute_capacity_price(&utility, f64::NAN, &ModelAssumptions::default()).is_err());
    }
}
