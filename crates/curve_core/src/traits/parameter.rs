//! The parameter-object contract.
//!
//! A parameter object exposes a flat vector of free `f64` parameters and can
//! produce a new instance of itself for a different vector. Calibration never
//! writes parameters back into an existing object: the only way to move to a
//! new parameter vector is [`ParameterObject::clone_for_parameter`].
//!
//! # Example
//!
//! ```
//! use curve_core::traits::parameter::ParameterObject;
//! use curve_core::types::ParameterError;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Level(f64);
//!
//! impl ParameterObject for Level {
//!     fn parameter(&self) -> Option<Vec<f64>> {
//!         Some(vec![self.0])
//!     }
//!
//!     fn clone_for_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
//!         match parameter {
//!             [value] => Ok(Level(*value)),
//!             _ => Err(ParameterError::dimension_mismatch(1, parameter.len())),
//!         }
//!     }
//! }
//!
//! let level = Level(1.0);
//! let shifted = level.clone_for_parameter(&[2.0]).unwrap();
//! assert_eq!(level, Level(1.0));
//! assert_eq!(shifted.parameter(), Some(vec![2.0]));
//! assert_eq!(shifted.parameter_len(), 1);
//! ```

use crate::types::ParameterError;
use std::sync::Arc;

/// An object driven by a flat parameter vector.
///
/// # Contract
///
/// - `parameter()` returns the current free parameters, or `None` when the
///   object has none.
/// - `clone_for_parameter(p)` returns a new object carrying `p`; `self` is
///   left unchanged. Objects that cannot be cloned for a parameter report
///   [`ParameterError::CloneUnsupported`].
/// - `clone_for_parameter(&self.parameter().unwrap_or_default())` yields an
///   object parameter-identical to `self`.
pub trait ParameterObject: Sized {
    /// Return the free parameters, or `None` if there are none.
    fn parameter(&self) -> Option<Vec<f64>>;

    /// Number of free parameters (zero when `parameter()` is `None`).
    fn parameter_len(&self) -> usize {
        self.parameter().map_or(0, |p| p.len())
    }

    /// Return a new object whose free parameters are `parameter`.
    ///
    /// # Errors
    ///
    /// - [`ParameterError::DimensionMismatch`] if the length is wrong
    /// - [`ParameterError::CloneUnsupported`] if the object cannot be cloned
    fn clone_for_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError>;
}

impl<P: ParameterObject> ParameterObject for Arc<P> {
    fn parameter(&self) -> Option<Vec<f64>> {
        self.as_ref().parameter()
    }

    fn parameter_len(&self) -> usize {
        self.as_ref().parameter_len()
    }

    fn clone_for_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
        self.as_ref().clone_for_parameter(parameter).map(Arc::new)
    }
}
