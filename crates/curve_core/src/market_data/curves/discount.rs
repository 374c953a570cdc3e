//! Point-based discount curve.

use super::points::{CurvePoint, InterpolationMethod, PointSet};
use crate::market_data::error::MarketDataError;
use crate::types::ParameterError;

/// A discount curve defined by discount factors at interpolation points.
///
/// Discount factors are interpolated log-linearly by default. Outside the
/// point range the curve extrapolates with a flat zero rate taken from the
/// nearest point with positive time.
///
/// # Examples
///
/// ```
/// use curve_core::market_data::DiscountCurve;
///
/// let curve = DiscountCurve::builder("discount-EUR")
///     .add_point(0.0, 1.0, false)
///     .add_point(1.0, 0.97, true)
///     .add_point(2.0, 0.94, true)
///     .build()
///     .unwrap();
///
/// let df = curve.discount_factor(1.5).unwrap();
/// assert!(df > 0.94 && df < 0.97);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountCurve {
    name: String,
    points: PointSet,
    interpolation: InterpolationMethod,
}

impl DiscountCurve {
    /// Create a builder for a curve called `name`.
    pub fn builder(name: impl Into<String>) -> DiscountCurveBuilder {
        DiscountCurveBuilder::new(name)
    }

    /// A curve with the single fixed point `(0.0, 1.0)`.
    ///
    /// This is the seed curve from which calibration grows a discount curve.
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: PointSet::single(CurvePoint::new(0.0, 1.0, false)),
            interpolation: InterpolationMethod::LogLinear,
        }
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interpolation points in time order.
    pub fn points(&self) -> &[CurvePoint] {
        self.points.points()
    }

    /// Interpolation method.
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Discount factor for time `t`.
    ///
    /// # Errors
    ///
    /// [`MarketDataError::InvalidMaturity`] if `t` is negative or not finite.
    pub fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if !t.is_finite() || t < 0.0 {
            return Err(MarketDataError::InvalidMaturity { t });
        }

        let first = self.points.first();
        let last = self.points.last();
        if t < first.time && first.time > 0.0 {
            return Ok((first.value.ln() * t / first.time).exp());
        }
        if t > last.time && last.time > 0.0 {
            return Ok((last.value.ln() * t / last.time).exp());
        }
        Ok(self.points.value(t, self.interpolation))
    }

    /// Builder pre-filled with this curve's points.
    pub fn clone_builder(&self) -> DiscountCurveBuilder {
        DiscountCurveBuilder {
            name: self.name.clone(),
            points: self.points.points().to_vec(),
            interpolation: self.interpolation,
        }
    }

    pub(crate) fn parameter(&self) -> Option<Vec<f64>> {
        self.points.parameter()
    }

    pub(crate) fn parameter_len(&self) -> usize {
        self.points.parameter_len()
    }

    pub(crate) fn with_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
        Ok(Self {
            name: self.name.clone(),
            points: self.points.with_parameter(parameter)?,
            interpolation: self.interpolation,
        })
    }
}

/// Builder for [`DiscountCurve`].
#[derive(Debug, Clone)]
pub struct DiscountCurveBuilder {
    name: String,
    points: Vec<CurvePoint>,
    interpolation: InterpolationMethod,
}

impl DiscountCurveBuilder {
    /// Create an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            interpolation: InterpolationMethod::LogLinear,
        }
    }

    /// Add an interpolation point.
    pub fn add_point(mut self, time: f64, discount_factor: f64, is_parameter: bool) -> Self {
        self.points
            .push(CurvePoint::new(time, discount_factor, is_parameter));
        self
    }

    /// Set the interpolation method.
    pub fn interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Build the curve.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::InsufficientData`] without points
    /// - [`MarketDataError::DuplicatePoint`] for two points at the same time
    /// - [`MarketDataError::InvalidValue`] for a non-positive discount factor
    pub fn build(self) -> Result<DiscountCurve, MarketDataError> {
        if let Some(bad) = self.points.iter().find(|p| p.value <= 0.0) {
            return Err(MarketDataError::InvalidValue {
                curve: self.name.clone(),
                t: bad.time,
                value: bad.value,
            });
        }
        let points = PointSet::new(&self.name, self.points)?;
        Ok(DiscountCurve {
            name: self.name,
            points,
            interpolation: self.interpolation,
        })
    }
}
