//! Curve calibration from declarative calibration specs.
//!
//! ## Components
//!
//! - [`CalibrationSpec`] / [`LegSpec`]: Market instruments by curve name
//! - [`CalibrationConfig`]: Solver settings and curve creation policy
//! - [`CalibratedCurves`]: Joint calibration of all specs and shifted
//!   recalibration
//! - [`QuoteSensitivities`]: Bump-and-revalue sensitivities to quotes
//!
//! ## Processing
//!
//! Specs are processed in order. Each spec creates the curves it references
//! if needed, becomes one product and adds one free point to its calibration
//! curve, so the joint system is always square.

mod calibrated_curves;
mod calibration_spec;
mod config;
mod sensitivity;

pub use calibrated_curves::CalibratedCurves;
pub use calibration_spec::{CalibrationSpec, LegSpec, ProductType};
pub use config::{CalibrationConfig, CalibrationConfigBuilder, ForwardCurveMode};
pub use sensitivity::{QuoteSensitivities, DEFAULT_SHIFT};
