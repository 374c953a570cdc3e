//! Calibration error types.
//!
//! Every failure of a calibration run surfaces as one [`OptimiserError`]:
//! configuration errors are raised eagerly before any optimiser work, solver
//! errors carry the numerical root cause.

use curve_core::market_data::MarketDataError;
use curve_core::types::{ParameterError, PricingError, SolverError};
use thiserror::Error;

/// Errors raised by calibration.
///
/// # Variants
///
/// - `Configuration`: Inconsistent input detected before solving
/// - `Solver`: The optimiser failed (non-convergence, singular system,
///   non-finite residuals, cancellation)
/// - `CloneUnsupported`: An object refused to clone itself for a parameter
/// - `Parameter`: Any other parameter-object failure
/// - `MarketData`: Model assembly failed
/// - `Pricing`: A valuation outside the objective failed
///
/// # Examples
///
/// ```
/// use curve_optimiser::OptimiserError;
///
/// let err = OptimiserError::spec(2, "SWAP-5Y", "calibration_curve", "curve not found");
/// let display = format!("{}", err);
/// assert!(display.contains("spec 2 (SWAP-5Y)"));
/// assert!(display.contains("calibration_curve"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// Inconsistent calibration input.
    #[error("Configuration error in {}: {field}: {reason}", location(.spec_index, .symbol))]
    Configuration {
        /// Index of the offending spec, if the error belongs to one
        spec_index: Option<usize>,
        /// Symbol of the offending spec, if the error belongs to one
        symbol: Option<String>,
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: String,
    },

    /// The optimiser failed; carries the root cause.
    #[error("Solver error: {0}")]
    Solver(SolverError),

    /// An object cannot clone itself for a parameter.
    #[error("Clone unsupported: {0}")]
    CloneUnsupported(ParameterError),

    /// Parameter-object failure.
    #[error("Parameter error: {0}")]
    Parameter(ParameterError),

    /// Model assembly failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Valuation failed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

fn location(spec_index: &Option<usize>, symbol: &Option<String>) -> String {
    match (spec_index, symbol) {
        (Some(i), Some(s)) => format!("spec {} ({})", i, s),
        (Some(i), None) => format!("spec {}", i),
        (None, Some(s)) => s.clone(),
        (None, None) => "calibration".to_string(),
    }
}

impl OptimiserError {
    /// Create a configuration error attributed to a calibration spec.
    pub fn spec(
        spec_index: usize,
        symbol: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            spec_index: Some(spec_index),
            symbol: Some(symbol.into()),
            field,
            reason: reason.into(),
        }
    }

    /// Create a configuration error not tied to a single spec.
    pub fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            spec_index: None,
            symbol: None,
            field,
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Solver root cause, if this is a solver error.
    pub fn solver_error(&self) -> Option<&SolverError> {
        match self {
            Self::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParameterError> for OptimiserError {
    fn from(err: ParameterError) -> Self {
        if err.is_clone_unsupported() {
            Self::CloneUnsupported(err)
        } else {
            Self::Parameter(err)
        }
    }
}

impl From<SolverError> for OptimiserError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Parameter(p) if p.is_clone_unsupported() => Self::CloneUnsupported(p),
            other => Self::Solver(other),
        }
    }
}
