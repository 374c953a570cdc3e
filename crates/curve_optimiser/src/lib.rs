//! # curve_optimiser
//!
//! Joint multi-curve calibration for the curve workspace.
//!
//! This crate sits above curves (L1) and products (L2), solving the inverse
//! problem of finding curve parameters that reprice a set of market
//! instruments.
//!
//! ## Architecture Position
//!
//! Layer 2.5. Depends on `curve_core` (L1) and `curve_products` (L2).
//!
//! ## Modules
//!
//! - `calibration`: Parameter aggregation over several curves and the
//!   least-squares calibration solver
//! - `bootstrapping`: Declarative calibration specs, the calibrated-curves
//!   orchestrator and bump-and-revalue quote sensitivities
//!
//! ## Example
//!
//! ```rust
//! use curve_core::market_data::Model;
//! use curve_optimiser::bootstrapping::{
//!     CalibratedCurves, CalibrationConfig, CalibrationSpec, LegSpec,
//! };
//! use curve_products::schedules::Schedule;
//!
//! let spec = CalibrationSpec::new(
//!     "DEPO-1Y",
//!     "deposit",
//!     LegSpec::fixed(Schedule::single(0.0, 1.0)?, 0.02, "discount"),
//!     "discount",
//!     1.0,
//! );
//! let curves = CalibratedCurves::new(vec![spec], &Model::new(), CalibrationConfig::default())?;
//!
//! let discount = curves.model().handle("discount").unwrap();
//! let df = curves.model().discount_factor(discount, 1.0)?;
//! assert!((df - 1.0 / 1.02).abs() < 1e-8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): Recalibrate shifted curves on rayon
//! - `serde`: Serialisation of specs and configuration

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod bootstrapping;
pub mod calibration;

mod error;

pub use error::OptimiserError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bootstrapping::*;
    pub use crate::calibration::*;
    pub use crate::OptimiserError;
}
