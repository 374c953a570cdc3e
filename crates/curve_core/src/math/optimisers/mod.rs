//! Least-squares optimisers for model calibration.
//!
//! ## Contracts
//!
//! - [`LeastSquaresProblem`]: Objective, initial parameters, targets, weights,
//!   bounds and an optional iteration budget
//! - [`LeastSquaresOptimiser`]: Minimises a problem
//! - [`OptimiserFactory`]: Creates an optimiser sized for a parameter count
//!
//! ## Default Implementation
//!
//! - [`LevenbergMarquardt`] with [`LMConfig`], finite-difference Jacobian on a
//!   rayon pool
//! - [`LevenbergMarquardtFactory`]: thread budget
//!   `min(2 × available cores, parameter count)`
//!
//! Runs can be stopped between iterations through a [`CancellationToken`].

mod cancellation;
mod config;
mod levenberg_marquardt;
mod problem;

pub use cancellation::CancellationToken;
pub use config::LMConfig;
pub use levenberg_marquardt::{LevenbergMarquardt, LevenbergMarquardtFactory};
pub use problem::{
    LeastSquaresOptimiser, LeastSquaresProblem, Objective, OptimiserFactory, OptimiserResult,
};
