//! Interpolation points shared by the point-based curves.
//!
//! A [`PointSet`] holds the ordered `(time, value, is_parameter)` triples of a
//! curve. The free parameters of the curve are the values of the points
//! flagged `is_parameter`, in time order.

use crate::market_data::error::MarketDataError;
use crate::types::ParameterError;

/// A single interpolation point of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Time in years from the reference date
    pub time: f64,
    /// Point value (discount factor or forward rate)
    pub value: f64,
    /// Whether the value is a free calibration parameter
    pub is_parameter: bool,
}

impl CurvePoint {
    /// Create a new point.
    pub fn new(time: f64, value: f64, is_parameter: bool) -> Self {
        Self {
            time,
            value,
            is_parameter,
        }
    }
}

/// Interpolation scheme between curve points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMethod {
    /// Linear interpolation on point values.
    Linear,
    /// Linear interpolation on the logarithm of point values.
    ///
    /// For discount factors this is piecewise constant forward rates.
    #[default]
    LogLinear,
}

/// Ordered, validated set of curve points.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointSet {
    points: Vec<CurvePoint>,
}

impl PointSet {
    /// Sort and validate `points` for the curve called `curve`.
    pub(crate) fn new(curve: &str, mut points: Vec<CurvePoint>) -> Result<Self, MarketDataError> {
        if points.is_empty() {
            return Err(MarketDataError::InsufficientData {
                curve: curve.to_string(),
                got: 0,
                need: 1,
            });
        }
        for point in &points {
            if !point.time.is_finite() || point.time < 0.0 {
                return Err(MarketDataError::InvalidMaturity { t: point.time });
            }
            if !point.value.is_finite() {
                return Err(MarketDataError::InvalidValue {
                    curve: curve.to_string(),
                    t: point.time,
                    value: point.value,
                });
            }
        }
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        if let Some(pair) = points.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(MarketDataError::DuplicatePoint {
                curve: curve.to_string(),
                t: pair[1].time,
            });
        }
        Ok(Self { points })
    }

    /// Set without points, for a curve whose first point is still to come.
    pub(crate) fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Set with one point; a single point can never be out of order.
    pub(crate) fn single(point: CurvePoint) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub(crate) fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn first(&self) -> &CurvePoint {
        &self.points[0]
    }

    pub(crate) fn last(&self) -> &CurvePoint {
        &self.points[self.points.len() - 1]
    }

    pub(crate) fn parameter(&self) -> Option<Vec<f64>> {
        let parameter: Vec<f64> = self
            .points
            .iter()
            .filter(|p| p.is_parameter)
            .map(|p| p.value)
            .collect();
        if parameter.is_empty() {
            None
        } else {
            Some(parameter)
        }
    }

    pub(crate) fn parameter_len(&self) -> usize {
        self.points.iter().filter(|p| p.is_parameter).count()
    }

    /// Copy of this set with the free values replaced by `parameter`.
    pub(crate) fn with_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
        let expected = self.parameter_len();
        if parameter.len() != expected {
            return Err(ParameterError::dimension_mismatch(expected, parameter.len()));
        }
        let mut values = parameter.iter();
        let points = self
            .points
            .iter()
            .map(|p| {
                if p.is_parameter {
                    CurvePoint {
                        value: *values.next().unwrap_or(&p.value),
                        ..*p
                    }
                } else {
                    *p
                }
            })
            .collect();
        Ok(Self { points })
    }

    /// Interpolated value at `t`, flat outside the point range.
    ///
    /// The set must not be empty.
    pub(crate) fn value(&self, t: f64, method: InterpolationMethod) -> f64 {
        let first = self.first();
        let last = self.last();
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First point strictly after t; the bracket is [idx - 1, idx]
        let idx = self.points.partition_point(|p| p.time <= t);
        let left = &self.points[idx - 1];
        let right = &self.points[idx];
        let w = (t - left.time) / (right.time - left.time);

        match method {
            InterpolationMethod::Linear => left.value * (1.0 - w) + right.value * w,
            InterpolationMethod::LogLinear => {
                (left.value.ln() * (1.0 - w) + right.value.ln() * w).exp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> PointSet {
        PointSet::new(
            "test",
            vec![
                CurvePoint::new(2.0, 0.90, true),
                CurvePoint::new(0.0, 1.00, false),
                CurvePoint::new(1.0, 0.95, true),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_points_are_sorted() {
        let set = sample();
        let times: Vec<f64> = set.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_parameter_in_time_order() {
        assert_eq!(sample().parameter(), Some(vec![0.95, 0.90]));
        assert_eq!(sample().parameter_len(), 2);
    }

    #[test]
    fn test_no_free_points_gives_none() {
        let set = PointSet::new("fixed", vec![CurvePoint::new(0.0, 1.0, false)]).unwrap();
        assert_eq!(set.parameter(), None);
        assert_eq!(set.parameter_len(), 0);
    }

    #[test]
    fn test_with_parameter_replaces_free_values_only() {
        let set = sample().with_parameter(&[0.5, 0.4]).unwrap();
        let values: Vec<f64> = set.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 0.5, 0.4]);
    }

    #[test]
    fn test_with_parameter_dimension_mismatch() {
        let err = sample().with_parameter(&[0.5]).unwrap_err();
        assert_eq!(err, ParameterError::dimension_mismatch(2, 1));
    }

    #[test]
    fn test_duplicate_time_rejected() {
        let err = PointSet::new(
            "dup",
            vec![CurvePoint::new(1.0, 1.0, false), CurvePoint::new(1.0, 0.9, true)],
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::DuplicatePoint { .. }));
    }

    #[test]
    fn test_negative_time_rejected() {
        let err = PointSet::new("neg", vec![CurvePoint::new(-0.5, 1.0, false)]).unwrap_err();
        assert_eq!(err, MarketDataError::InvalidMaturity { t: -0.5 });
    }

    #[test]
    fn test_empty_rejected() {
        assert!(PointSet::new("empty", vec![]).is_err());
    }

    #[test]
    fn test_linear_interpolation() {
        let v = sample().value(1.5, InterpolationMethod::Linear);
        assert_relative_eq!(v, 0.925, epsilon = 1e-14);
    }

    #[test]
    fn test_log_linear_interpolation() {
        let v = sample().value(0.5, InterpolationMethod::LogLinear);
        assert_relative_eq!(v, 0.95_f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_exact_point_and_flat_extrapolation() {
        let set = sample();
        assert_relative_eq!(set.value(1.0, InterpolationMethod::LogLinear), 0.95);
        assert_relative_eq!(set.value(5.0, InterpolationMethod::Linear), 0.90);
    }
}
