//! # curve_core: Foundation for Multi-Curve Calibration
//!
//! ## Layer 1 (Foundation) Role
//!
//! curve_core is the bottom layer of the calibration workspace, providing:
//! - The parameter-object contract (`traits::parameter`)
//! - Solver-space/model-space transformations (`traits::transformation`)
//! - The priceable product contract (`traits::priceable`)
//! - Immutable curves and the curve model (`market_data`)
//! - Pluggable least-squares optimisers (`math::optimisers`)
//! - Error types: `PricingError`, `SolverError`, `ParameterError` (`types::error`)
//!
//! ## Immutability
//!
//! Curves and models never change after construction. Every state change,
//! including every trial point visited by an optimiser, is a new value built
//! through `clone_for_parameter`. Curves are shared between model versions
//! through `Arc`, so cloning a model only copies the curves that change.
//!
//! ## Usage Examples
//!
//! ```rust
//! use curve_core::market_data::{Curve, DiscountCurve, Model};
//! use curve_core::traits::parameter::ParameterObject;
//!
//! let curve = DiscountCurve::builder("discount-EUR")
//!     .add_point(0.0, 1.0, false)
//!     .add_point(1.0, 0.98, true)
//!     .build()
//!     .unwrap();
//!
//! let model = Model::new().with_curve(Curve::Discount(curve));
//! let handle = model.handle("discount-EUR").unwrap();
//!
//! let df = model.discount_factor(handle, 1.0).unwrap();
//! assert!((df - 0.98).abs() < 1e-12);
//!
//! let curve = model.curve_by_handle(handle).unwrap();
//! assert_eq!(curve.parameter(), Some(vec![0.98]));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for configuration and tenor types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod traits;
pub mod types;
