//! Error taxonomy for the rate-impact engine.

use thiserror::Error;

use crate::model::types::Scenario;

/// Errors returned by the public engine entry points.
///
/// All errors are deterministic: the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A numeric field is missing, non-finite, or outside its accepted range.
    #[error("invalid parameter `{field}`: {constraint}")]
    InvalidParameter {
        /// Dotted field path (e.g., `"utility.system_peak_mw"`).
        field: String,
        /// Human-readable constraint description.
        constraint: String,
    },
    /// Market fields contradict each other.
    #[error("inconsistent market config `{field}`: {constraint}")]
    InconsistentMarketConfig {
        /// Dotted field path.
        field: String,
        /// Human-readable constraint description.
        constraint: String,
    },
    /// A projection produced NaN or infinity.
    #[error("non-finite result in {scenario} trajectory at year index {year_index}")]
    NonFiniteResult {
        /// Scenario being projected.
        scenario: Scenario,
        /// Offending projection index.
        year_index: usize,
    },
}

impl EngineError {
    pub(crate) fn invalid(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    pub(crate) fn inconsistent(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::InconsistentMarketConfig {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Field path the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { field, .. } | Self::InconsistentMarketConfig { field, .. } => {
                Some(field)
            }
            Self::NonFiniteResult { .. } => None,
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
