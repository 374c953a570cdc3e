//! Numerical methods for calibration.
//!
//! - [`optimisers`]: Pluggable bounded least-squares optimisers

pub mod optimisers;
