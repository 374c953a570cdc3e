//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for pricing, parameter objects and optimisation
//!
//! # Re-exports
//!
//! [`PricingError`], [`ParameterError`] and [`SolverError`] are re-exported at
//! this module level.

pub mod error;

pub use error::{ParameterError, PricingError, SolverError};
