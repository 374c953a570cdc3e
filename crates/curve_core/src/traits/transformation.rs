//! Parameter transformations between solver space and model space.
//!
//! An optimiser works best on an unconstrained parameter space, while models
//! often need constrained parameters (positive discount factors, bounded
//! correlations). A [`ParameterTransformation`] is a bijection between the two:
//! the optimiser only ever sees solver-space vectors, the model only ever sees
//! model-space vectors.
//!
//! # Example
//!
//! ```
//! use curve_core::traits::transformation::{ParameterTransformation, PositiveTransformation};
//!
//! let transformation = PositiveTransformation;
//! let model = vec![0.98, 0.95];
//! let solver = transformation.to_solver_space(&model);
//! let back = transformation.to_model_space(&solver);
//! assert!((back[0] - 0.98).abs() < 1e-14);
//! assert!((back[1] - 0.95).abs() < 1e-14);
//! ```

use std::fmt::Debug;

/// Bijection between unconstrained solver space and constrained model space.
///
/// Implementations must be pure: the optimiser calls them concurrently from
/// several worker threads.
pub trait ParameterTransformation: Debug + Send + Sync {
    /// Map a solver-space vector to model space.
    fn to_model_space(&self, solver_parameter: &[f64]) -> Vec<f64>;

    /// Map a model-space vector to solver space.
    fn to_solver_space(&self, model_parameter: &[f64]) -> Vec<f64>;
}

/// The identity transformation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTransformation;

impl ParameterTransformation for IdentityTransformation {
    fn to_model_space(&self, solver_parameter: &[f64]) -> Vec<f64> {
        solver_parameter.to_vec()
    }

    fn to_solver_space(&self, model_parameter: &[f64]) -> Vec<f64> {
        model_parameter.to_vec()
    }
}

/// Keeps every model parameter strictly positive via `exp`/`ln`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositiveTransformation;

impl ParameterTransformation for PositiveTransformation {
    fn to_model_space(&self, solver_parameter: &[f64]) -> Vec<f64> {
        solver_parameter.iter().map(|x| x.exp()).collect()
    }

    fn to_solver_space(&self, model_parameter: &[f64]) -> Vec<f64> {
        model_parameter
            .iter()
            .map(|x| x.max(f64::MIN_POSITIVE).ln())
            .collect()
    }
}

/// Keeps every model parameter inside `(lower, upper)` via a scaled `tanh`.
///
/// # Example
///
/// ```
/// use curve_core::traits::transformation::{BoundedTransformation, ParameterTransformation};
///
/// let transformation = BoundedTransformation::new(-0.05, 0.25);
/// let model = transformation.to_model_space(&[1e6, -1e6, 0.0]);
/// assert!(model[0] <= 0.25 && model[1] >= -0.05);
/// assert!((model[2] - 0.10).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedTransformation {
    lower: f64,
    upper: f64,
}

impl BoundedTransformation {
    /// Create a transformation onto `(lower, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `lower >= upper`.
    pub fn new(lower: f64, upper: f64) -> Self {
        assert!(lower < upper, "lower bound must be below upper bound");
        Self { lower, upper }
    }

    /// Lower bound of model space.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound of model space.
    pub fn upper(&self) -> f64 {
        self.upper
    }
}

impl ParameterTransformation for BoundedTransformation {
    fn to_model_space(&self, solver_parameter: &[f64]) -> Vec<f64> {
        let half_width = 0.5 * (self.upper - self.lower);
        solver_parameter
            .iter()
            .map(|x| self.lower + half_width * (x.tanh() + 1.0))
            .collect()
    }

    fn to_solver_space(&self, model_parameter: &[f64]) -> Vec<f64> {
        let half_width = 0.5 * (self.upper - self.lower);
        // atanh diverges at the bounds
        let limit = 1.0 - 1e-15;
        model_parameter
            .iter()
            .map(|m| ((m - self.lower) / half_width - 1.0).clamp(-limit, limit).atanh())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_round_trip() {
        let v = vec![-1.0, 0.0, 2.5];
        let t = IdentityTransformation;
        assert_eq!(t.to_model_space(&t.to_solver_space(&v)), v);
    }

    #[test]
    fn test_positive_maps_to_positive() {
        let t = PositiveTransformation;
        for x in t.to_model_space(&[-50.0, 0.0, 3.0]) {
            assert!(x > 0.0);
        }
    }

    #[test]
    fn test_positive_round_trip() {
        let t = PositiveTransformation;
        let v = [0.5, 1.0, 0.01];
        let back = t.to_model_space(&t.to_solver_space(&v));
        for (a, b) in v.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_bounded_round_trip() {
        let t = BoundedTransformation::new(0.0, 2.0);
        let v = [0.1, 1.0, 1.9];
        let back = t.to_model_space(&t.to_solver_space(&v));
        for (a, b) in v.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bounded_stays_inside() {
        let t = BoundedTransformation::new(-1.0, 1.0);
        for x in t.to_model_space(&[-1e3, -1.0, 0.0, 1.0, 1e3]) {
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    #[should_panic(expected = "lower bound must be below upper bound")]
    fn test_bounded_rejects_empty_interval() {
        let _ = BoundedTransformation::new(1.0, 1.0);
    }
}
