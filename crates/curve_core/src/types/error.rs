//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from product valuation
//! - `ParameterError`: Errors from parameter-object cloning and slicing
//! - `SolverError`: Errors from least-squares optimisation

use crate::market_data::MarketDataError;
use thiserror::Error;

/// Categorised pricing errors.
///
/// Raised by [`AnalyticProduct`](crate::traits::priceable::AnalyticProduct)
/// implementations when a product cannot be valued against a model.
///
/// # Examples
/// ```
/// use curve_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("negative period length".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: negative period length");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid product data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Numerical instability during valuation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Curve lookup or interpolation failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Errors raised by parameter objects.
///
/// # Variants
/// - `CloneUnsupported`: The object cannot produce a clone for a new parameter
/// - `DimensionMismatch`: A parameter vector has the wrong length
///
/// # Examples
/// ```
/// use curve_core::types::ParameterError;
///
/// let err = ParameterError::dimension_mismatch(3, 2);
/// assert!(format!("{}", err).contains("expected 3"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// The object is structurally unable to clone itself for a parameter.
    #[error("Clone for parameter is not supported by {object}")]
    CloneUnsupported {
        /// Description of the object that refused the clone
        object: String,
    },

    /// Parameter vector length does not match the object's parameter count.
    #[error("Parameter dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Number of parameters the object carries
        expected: usize,
        /// Number of parameters supplied
        got: usize,
    },
}

impl ParameterError {
    /// Create a clone-unsupported error.
    pub fn clone_unsupported(object: impl Into<String>) -> Self {
        Self::CloneUnsupported {
            object: object.into(),
        }
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, got: usize) -> Self {
        Self::DimensionMismatch { expected, got }
    }

    /// Check if this is a clone-unsupported error.
    pub fn is_clone_unsupported(&self) -> bool {
        matches!(self, Self::CloneUnsupported { .. })
    }
}

/// Least-squares optimiser errors.
///
/// Every numerical failure of a calibration run surfaces as one of these
/// variants. Failures raised inside the objective function (pricing, curve
/// cloning, curve lookup) are wrapped so the root cause is preserved.
///
/// # Examples
/// ```
/// use curve_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 1000, rms: 1e-3 };
/// assert!(format!("{}", err).contains("1000 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Accuracy was not reached within the iteration budget.
    #[error("Failed to converge after {iterations} iterations (rms = {rms:e})")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
        /// Root mean square residual at the best point found
        rms: f64,
    },

    /// Parameter steps became negligible before accuracy was reached.
    #[error("Stalled at iteration {iteration} (rms = {rms:e})")]
    Stalled {
        /// Iteration at which the parameter change fell below tolerance
        iteration: usize,
        /// Root mean square residual at the stall point
        rms: f64,
    },

    /// Normal equations could not be solved even at maximal damping.
    #[error("Singular system at iteration {iteration}")]
    SingularSystem {
        /// Iteration at which the system was found singular
        iteration: usize,
    },

    /// The objective produced NaN or infinity.
    #[error("Non-finite residual at index {index}")]
    NonFiniteResidual {
        /// Position of the offending residual
        index: usize,
    },

    /// The run was cancelled through its cancellation token.
    #[error("Optimisation cancelled after {iterations} iterations")]
    Cancelled {
        /// Number of iterations completed before cancellation
        iterations: usize,
    },

    /// Worker pool for Jacobian evaluation could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Problem definition is inconsistent (empty, mismatched lengths, ...).
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// A product could not be valued inside the objective.
    #[error("Pricing failed in objective: {0}")]
    Pricing(#[from] PricingError),

    /// A parameter object failed to clone inside the objective.
    #[error("Parameter error in objective: {0}")]
    Parameter(#[from] ParameterError),

    /// Model assembly failed inside the objective.
    #[error("Market data error in objective: {0}")]
    MarketData(#[from] MarketDataError),
}

impl SolverError {
    /// Create an invalid problem error.
    pub fn invalid_problem(message: impl Into<String>) -> Self {
        Self::InvalidProblem(message.into())
    }

    /// Check if this error reports a run that ended above accuracy.
    pub fn is_not_converged(&self) -> bool {
        matches!(
            self,
            Self::MaxIterationsExceeded { .. } | Self::Stalled { .. }
        )
    }

    /// Check if this error reports cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::NumericalInstability("zero discount factor".to_string());
        assert_eq!(
            format!("{}", err),
            "Numerical instability: zero discount factor"
        );
    }

    #[test]
    fn test_pricing_error_from_market_data() {
        let err: PricingError = MarketDataError::InvalidMaturity { t: -1.0 }.into();
        assert!(matches!(err, PricingError::MarketData(_)));
    }

    #[test]
    fn test_clone_unsupported_display() {
        let err = ParameterError::clone_unsupported("ParameterAggregation");
        assert!(err.is_clone_unsupported());
        assert!(format!("{}", err).contains("ParameterAggregation"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = ParameterError::dimension_mismatch(4, 1);
        let display = format!("{}", err);
        assert!(display.contains("expected 4"));
        assert!(display.contains("got 1"));
        assert!(!err.is_clone_unsupported());
    }

    #[test]
    fn test_solver_error_wraps_root_cause() {
        let cause = ParameterError::dimension_mismatch(2, 3);
        let err: SolverError = cause.clone().into();
        assert_eq!(err, SolverError::Parameter(cause));
        assert!(format!("{}", err).contains("expected 2"));
    }

    #[test]
    fn test_solver_error_predicates() {
        assert!(SolverError::MaxIterationsExceeded {
            iterations: 5,
            rms: 0.1
        }
        .is_not_converged());
        assert!(SolverError::Stalled {
            iteration: 3,
            rms: 0.02
        }
        .is_not_converged());
        assert!(SolverError::Cancelled { iterations: 2 }.is_cancelled());
        assert!(!SolverError::invalid_problem("empty").is_cancelled());
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = SolverError::SingularSystem { iteration: 3 };
        let _: &dyn std::error::Error = &err;
    }
}
