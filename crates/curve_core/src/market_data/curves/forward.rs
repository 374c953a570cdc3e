//! Point-based forward curve.

use super::points::{CurvePoint, InterpolationMethod, PointSet};
use super::tenor::Tenor;
use crate::market_data::error::MarketDataError;
use crate::types::ParameterError;

/// A forward curve defined by forward rates at fixing-time points.
///
/// Rates are interpolated linearly by default and held constant outside the
/// point range. The optional tenor records the index the curve projects.
///
/// # Examples
///
/// ```
/// use curve_core::market_data::{ForwardCurve, Tenor};
///
/// let curve = ForwardCurve::builder("forward-EUR-6M")
///     .tenor(Tenor::SixMonth)
///     .add_point(0.0, 0.01, false)
///     .add_point(2.0, 0.03, true)
///     .build()
///     .unwrap();
///
/// assert!((curve.forward(1.0).unwrap() - 0.02).abs() < 1e-14);
/// assert_eq!(curve.tenor(), Some(Tenor::SixMonth));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardCurve {
    name: String,
    points: PointSet,
    interpolation: InterpolationMethod,
    tenor: Option<Tenor>,
}

impl ForwardCurve {
    /// Create a builder for a curve called `name`.
    pub fn builder(name: impl Into<String>) -> ForwardCurveBuilder {
        ForwardCurveBuilder::new(name)
    }

    /// Create a curve without points.
    ///
    /// The curve cannot be evaluated until a point is added through
    /// [`clone_builder`](Self::clone_builder). Its first point then fixes the
    /// rate over the whole fixing range.
    pub fn empty(name: impl Into<String>, tenor: Option<Tenor>) -> Self {
        Self {
            name: name.into(),
            points: PointSet::empty(),
            interpolation: InterpolationMethod::Linear,
            tenor,
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

    /// Index tenor, if known.
    pub fn tenor(&self) -> Option<Tenor> {
        self.tenor
    }

    /// Forward rate fixing at `fixing_time`.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::InvalidMaturity`] if `fixing_time` is negative or not finite
    /// - [`MarketDataError::InsufficientData`] for a curve without points
    pub fn forward(&self, fixing_time: f64) -> Result<f64, MarketDataError> {
        if !fixing_time.is_finite() || fixing_time < 0.0 {
            return Err(MarketDataError::InvalidMaturity { t: fixing_time });
        }
        if self.points.is_empty() {
            return Err(MarketDataError::InsufficientData {
                curve: self.name.clone(),
                got: 0,
                need: 1,
            });
        }
        Ok(self.points.value(fixing_time, self.interpolation))
    }

    /// Builder pre-filled with this curve's points.
    pub fn clone_builder(&self) -> ForwardCurveBuilder {
        ForwardCurveBuilder {
            name: self.name.clone(),
            points: self.points.points().to_vec(),
            interpolation: self.interpolation,
            tenor: self.tenor,
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
            tenor: self.tenor,
        })
    }
}

/// Builder for [`ForwardCurve`].
#[derive(Debug, Clone)]
pub struct ForwardCurveBuilder {
    name: String,
    points: Vec<CurvePoint>,
    interpolation: InterpolationMethod,
    tenor: Option<Tenor>,
}

impl ForwardCurveBuilder {
    /// Create an empty builder with linear interpolation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            interpolation: InterpolationMethod::Linear,
            tenor: None,
        }
    }

    /// Add an interpolation point.
    pub fn add_point(mut self, fixing_time: f64, rate: f64, is_parameter: bool) -> Self {
        self.points
            .push(CurvePoint::new(fixing_time, rate, is_parameter));
        self
    }

    /// Set the interpolation method.
    ///
    /// Log-linear interpolation requires strictly positive rates.
    pub fn interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the index tenor.
    pub fn tenor(mut self, tenor: Tenor) -> Self {
        self.tenor = Some(tenor);
        self
    }

    /// Build the curve.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::InsufficientData`] without points
    /// - [`MarketDataError::DuplicatePoint`] for two points at the same time
    /// - [`MarketDataError::InvalidValue`] for a non-finite rate, or a
    ///   non-positive rate under log-linear interpolation
    pub fn build(self) -> Result<ForwardCurve, MarketDataError> {
        if self.interpolation == InterpolationMethod::LogLinear {
            if let Some(bad) = self.points.iter().find(|p| p.value <= 0.0) {
                return Err(MarketDataError::InvalidValue {
                    curve: self.name.clone(),
                    t: bad.time,
                    value: bad.value,
                });
            }
        }
        let points = PointSet::new(&self.name, self.points)?;
        Ok(ForwardCurve {
            name: self.name,
            points,
            interpolation: self.interpolation,
            tenor: self.tenor,
        })
    }
}
