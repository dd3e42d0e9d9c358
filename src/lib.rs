//! Residential rate-impact simulator for large flexible loads.
//!
//! Projects average residential bills under four operating scenarios for a
//! new large load (no load, firm, flexible, flexible with on-site generation)
//! from a small set of utility and load parameters.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
/// Capacity pricing, allocation, impact, adequacy, trajectory and summary models.
pub mod model;
pub mod profiles;

pub use error::{EngineError, EngineResult};
pub use model::RateImpactEngine;
