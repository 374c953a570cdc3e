//! Calibration of curve parameters to product values.
//!
//! ## Components
//!
//! - [`ParameterAggregation`]: One parameter vector over several keyed
//!   parameter objects
//! - [`Solver`]: Least-squares calibration of the curves of a model so that
//!   products reprice to their targets
//! - [`SolverOutcome`] / [`CalibrationDiagnostics`]: Calibrated model and
//!   run diagnostics

mod aggregation;
mod solver;

pub use aggregation::ParameterAggregation;
pub use solver::{CalibrationDiagnostics, CurveAggregation, Solver, SolverOutcome};
