//! Core traits for parameter objects, transformations and products.
//!
//! This module defines the fundamental abstractions of the calibration engine:
//! - Flat parameter vectors and clone-for-parameter (`ParameterObject`)
//! - Solver-space/model-space bijections (`ParameterTransformation`)
//! - Product valuation against a model (`AnalyticProduct`)

pub mod parameter;
pub mod priceable;
pub mod transformation;

pub use parameter::ParameterObject;
pub use priceable::AnalyticProduct;
pub use transformation::{
    BoundedTransformation, IdentityTransformation, ParameterTransformation,
    PositiveTransformation,
};
