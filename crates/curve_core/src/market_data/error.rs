//! Market data error types.
//!
//! This module provides structured error handling for curve construction,
//! interpolation and model lookups.

use crate::types::ParameterError;
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `InvalidMaturity`: Negative or non-finite time
/// - `DuplicatePoint`: Two interpolation points at the same time
/// - `InsufficientData`: Curve without interpolation points
/// - `InvalidValue`: Non-finite or non-positive point value
/// - `CurveNotFound`: No curve with the given name in the model
/// - `UnknownHandle`: Handle does not address a curve of the model
/// - `WrongCurveKind`: Curve exists but has the wrong kind for the lookup
/// - `Parameter`: A curve could not be rebuilt for a new parameter vector
///
/// # Examples
///
/// ```
/// use curve_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidMaturity { t: -1.0 };
/// assert!(format!("{}", err).contains("-1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Invalid maturity (negative or non-finite time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// An interpolation point already exists at this time.
    #[error("Curve {curve} already has a point at t = {t}")]
    DuplicatePoint {
        /// Curve name
        curve: String,
        /// Time of the duplicated point
        t: f64,
    },

    /// Insufficient data for construction.
    #[error("Insufficient data for curve {curve}: got {got}, need {need}")]
    InsufficientData {
        /// Curve name
        curve: String,
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// A point value is not usable by the curve's interpolation.
    #[error("Invalid value {value} at t = {t} on curve {curve}")]
    InvalidValue {
        /// Curve name
        curve: String,
        /// Time of the offending point
        t: f64,
        /// The offending value
        value: f64,
    },

    /// No curve of this name in the model.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// The requested curve name
        name: String,
    },

    /// Handle does not address a curve of this model.
    #[error("Unknown curve handle: {index}")]
    UnknownHandle {
        /// Arena index carried by the handle
        index: usize,
    },

    /// Curve has the wrong kind for the requested lookup.
    #[error("Curve {name} is a {actual} curve, expected {expected}")]
    WrongCurveKind {
        /// Curve name
        name: String,
        /// Kind required by the lookup
        expected: &'static str,
        /// Kind of the stored curve
        actual: &'static str,
    },

    /// A curve could not be rebuilt for a new parameter vector.
    #[error("Curve {name} rejected its parameter: {source}")]
    Parameter {
        /// Curve name
        name: String,
        /// Root cause
        source: ParameterError,
    },
}

impl MarketDataError {
    /// Create a curve-not-found error.
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// Check if this error reports a missing curve.
    pub fn is_curve_not_found(&self) -> bool {
        matches!(self, Self::CurveNotFound { .. })
    }
}
