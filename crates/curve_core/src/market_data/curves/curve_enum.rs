//! Curve enumeration for the multi-curve model.
//!
//! This module provides:
//! - [`Curve`]: Static dispatch enum over the concrete curve types
//! - [`CurveKind`]: Discriminant used in error messages and lookups
//! - [`CurveBuilder`]: Builder over the point-based curve types

use super::{DiscountCurve, DiscountCurveBuilder, ForwardCurve, ForwardCurveBuilder};
use super::{CurvePoint, ForwardCurveFromDiscountCurve};
use crate::market_data::error::MarketDataError;
use crate::traits::parameter::ParameterObject;
use crate::types::ParameterError;

/// Kind of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// Discount factors at interpolation points
    Discount,
    /// Forward rates at interpolation points
    Forward,
    /// Forward rates implied by a discount curve
    ForwardFromDiscount,
}

impl CurveKind {
    /// Return the string representation of the kind.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Discount => "discount",
            CurveKind::Forward => "forward",
            CurveKind::ForwardFromDiscount => "forward-from-discount",
        }
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static dispatch enum wrapping the concrete curve implementations.
///
/// Every curve is immutable. [`ParameterObject::clone_for_parameter`] returns
/// a new curve with the same name, points layout and interpolation.
///
/// # Example
///
/// ```
/// use curve_core::market_data::{Curve, DiscountCurve};
/// use curve_core::traits::parameter::ParameterObject;
///
/// let curve = Curve::Discount(DiscountCurve::unit("discount"));
/// assert_eq!(curve.parameter(), None);
///
/// let extended = curve.clone_builder().unwrap().add_point(1.0, 1.0, true).build().unwrap();
/// assert_eq!(extended.parameter(), Some(vec![1.0]));
/// assert_eq!(extended.name(), "discount");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Point-based discount curve
    Discount(DiscountCurve),
    /// Point-based forward curve
    Forward(ForwardCurve),
    /// Forward curve implied by a discount curve
    ForwardFromDiscount(ForwardCurveFromDiscountCurve),
}

impl Curve {
    /// Curve name.
    pub fn name(&self) -> &str {
        match self {
            Curve::Discount(c) => c.name(),
            Curve::Forward(c) => c.name(),
            Curve::ForwardFromDiscount(c) => c.name(),
        }
    }

    /// Curve kind.
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Discount(_) => CurveKind::Discount,
            Curve::Forward(_) => CurveKind::Forward,
            Curve::ForwardFromDiscount(_) => CurveKind::ForwardFromDiscount,
        }
    }

    /// Interpolation points, empty for derived curves.
    pub fn points(&self) -> &[CurvePoint] {
        match self {
            Curve::Discount(c) => c.points(),
            Curve::Forward(c) => c.points(),
            Curve::ForwardFromDiscount(_) => &[],
        }
    }

    /// Whether new interpolation points can be added to the curve.
    pub fn is_point_curve(&self) -> bool {
        !matches!(self, Curve::ForwardFromDiscount(_))
    }

    /// Return the discount curve, if this is one.
    pub fn as_discount(&self) -> Option<&DiscountCurve> {
        match self {
            Curve::Discount(c) => Some(c),
            _ => None,
        }
    }

    /// Return the point-based forward curve, if this is one.
    pub fn as_forward(&self) -> Option<&ForwardCurve> {
        match self {
            Curve::Forward(c) => Some(c),
            _ => None,
        }
    }

    /// Builder pre-filled with this curve's points.
    ///
    /// # Errors
    ///
    /// [`ParameterError::CloneUnsupported`] for derived curves, which have no
    /// points of their own.
    pub fn clone_builder(&self) -> Result<CurveBuilder, ParameterError> {
        match self {
            Curve::Discount(c) => Ok(CurveBuilder::Discount(c.clone_builder())),
            Curve::Forward(c) => Ok(CurveBuilder::Forward(c.clone_builder())),
            Curve::ForwardFromDiscount(c) => Err(ParameterError::clone_unsupported(format!(
                "curve {} ({})",
                c.name(),
                CurveKind::ForwardFromDiscount
            ))),
        }
    }
}

impl ParameterObject for Curve {
    fn parameter(&self) -> Option<Vec<f64>> {
        match self {
            Curve::Discount(c) => c.parameter(),
            Curve::Forward(c) => c.parameter(),
            Curve::ForwardFromDiscount(_) => None,
        }
    }

    fn parameter_len(&self) -> usize {
        match self {
            Curve::Discount(c) => c.parameter_len(),
            Curve::Forward(c) => c.parameter_len(),
            Curve::ForwardFromDiscount(_) => 0,
        }
    }

    fn clone_for_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
        match self {
            Curve::Discount(c) => c.with_parameter(parameter).map(Curve::Discount),
            Curve::Forward(c) => c.with_parameter(parameter).map(Curve::Forward),
            Curve::ForwardFromDiscount(c) => {
                if parameter.is_empty() {
                    Ok(Curve::ForwardFromDiscount(c.clone()))
                } else {
                    Err(ParameterError::dimension_mismatch(0, parameter.len()))
                }
            }
        }
    }
}

impl From<DiscountCurve> for Curve {
    fn from(curve: DiscountCurve) -> Self {
        Curve::Discount(curve)
    }
}

impl From<ForwardCurve> for Curve {
    fn from(curve: ForwardCurve) -> Self {
        Curve::Forward(curve)
    }
}

impl From<ForwardCurveFromDiscountCurve> for Curve {
    fn from(curve: ForwardCurveFromDiscountCurve) -> Self {
        Curve::ForwardFromDiscount(curve)
    }
}

/// Builder over the point-based curve types.
#[derive(Debug, Clone)]
pub enum CurveBuilder {
    /// Builds a [`DiscountCurve`]
    Discount(DiscountCurveBuilder),
    /// Builds a [`ForwardCurve`]
    Forward(ForwardCurveBuilder),
}

impl CurveBuilder {
    /// Add an interpolation point.
    pub fn add_point(self, time: f64, value: f64, is_parameter: bool) -> Self {
        match self {
            CurveBuilder::Discount(b) => {
                CurveBuilder::Discount(b.add_point(time, value, is_parameter))
            }
            CurveBuilder::Forward(b) => {
                CurveBuilder::Forward(b.add_point(time, value, is_parameter))
            }
        }
    }

    /// Build the curve.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of the concrete builder.
    pub fn build(self) -> Result<Curve, MarketDataError> {
        match self {
            CurveBuilder::Discount(b) => b.build().map(Curve::Discount),
            CurveBuilder::Forward(b) => b.build().map(Curve::Forward),
        }
    }
}
