//! Least-squares problem definition and the optimiser contracts.

use crate::types::SolverError;
use std::fmt::Debug;

/// Objective of a least-squares problem: parameters to model values.
///
/// Called concurrently from the Jacobian worker threads.
pub type Objective<'a> = dyn Fn(&[f64]) -> Result<Vec<f64>, SolverError> + Sync + 'a;

/// A bounded, weighted nonlinear least-squares problem.
///
/// Minimises `Σ w_i (f_i(p) - y_i)²` over `lower ≤ p ≤ upper`, where `f` is
/// the objective, `y` the target values and `w` the weights.
///
/// # Example
///
/// ```
/// use curve_core::math::optimisers::LeastSquaresProblem;
/// use curve_core::types::SolverError;
///
/// let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> { Ok(vec![p[0] * p[0]]) };
/// let problem = LeastSquaresProblem::new(&objective, vec![1.0], vec![4.0])
///     .with_bounds(vec![0.0], vec![f64::INFINITY]);
/// assert!(problem.validate().is_ok());
/// ```
pub struct LeastSquaresProblem<'a> {
    objective: &'a Objective<'a>,
    initial_parameters: Vec<f64>,
    target_values: Vec<f64>,
    weights: Vec<f64>,
    lower_bound: Vec<f64>,
    upper_bound: Vec<f64>,
    max_iterations: Option<usize>,
}

impl<'a> LeastSquaresProblem<'a> {
    /// Create an unweighted, unbounded problem.
    pub fn new(
        objective: &'a Objective<'a>,
        initial_parameters: Vec<f64>,
        target_values: Vec<f64>,
    ) -> Self {
        let n_params = initial_parameters.len();
        let n_values = target_values.len();
        Self {
            objective,
            initial_parameters,
            target_values,
            weights: vec![1.0; n_values],
            lower_bound: vec![f64::NEG_INFINITY; n_params],
            upper_bound: vec![f64::INFINITY; n_params],
            max_iterations: None,
        }
    }

    /// Set per-value weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    /// Set per-parameter bounds.
    pub fn with_bounds(mut self, lower_bound: Vec<f64>, upper_bound: Vec<f64>) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    /// Override the optimiser's iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Initial parameter vector.
    pub fn initial_parameters(&self) -> &[f64] {
        &self.initial_parameters
    }

    /// Target values.
    pub fn target_values(&self) -> &[f64] {
        &self.target_values
    }

    /// Weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Lower parameter bounds.
    pub fn lower_bound(&self) -> &[f64] {
        &self.lower_bound
    }

    /// Upper parameter bounds.
    pub fn upper_bound(&self) -> &[f64] {
        &self.upper_bound
    }

    /// Iteration budget, if the problem sets one.
    pub fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    /// Check dimensions, weights and bounds.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidProblem`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n_params = self.initial_parameters.len();
        if n_params == 0 {
            return Err(SolverError::invalid_problem("empty parameter vector"));
        }
        if self.target_values.is_empty() {
            return Err(SolverError::invalid_problem("empty target vector"));
        }
        if self.weights.len() != self.target_values.len() {
            return Err(SolverError::invalid_problem(format!(
                "{} weights for {} target values",
                self.weights.len(),
                self.target_values.len()
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SolverError::invalid_problem("weights must be finite and non-negative"));
        }
        if self.lower_bound.len() != n_params || self.upper_bound.len() != n_params {
            return Err(SolverError::invalid_problem(format!(
                "bounds must have {} entries",
                n_params
            )));
        }
        if self
            .lower_bound
            .iter()
            .zip(&self.upper_bound)
            .any(|(lo, hi)| lo.is_nan() || hi.is_nan() || lo > hi)
        {
            return Err(SolverError::invalid_problem("lower bound above upper bound"));
        }
        Ok(())
    }

    /// Evaluate the objective and return the weighted residuals
    /// `sqrt(w_i) (f_i(p) - y_i)`.
    pub(crate) fn residuals(&self, parameters: &[f64]) -> Result<Vec<f64>, SolverError> {
        let values = (self.objective)(parameters)?;
        if values.len() != self.target_values.len() {
            return Err(SolverError::invalid_problem(format!(
                "objective returned {} values for {} targets",
                values.len(),
                self.target_values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(&self.target_values)
            .zip(&self.weights)
            .map(|((v, y), w)| w.sqrt() * (v - y))
            .collect())
    }

    /// Clamp `parameters` into the bounds.
    pub(crate) fn project(&self, parameters: &mut [f64]) {
        for ((p, lo), hi) in parameters
            .iter_mut()
            .zip(&self.lower_bound)
            .zip(&self.upper_bound)
        {
            *p = p.clamp(*lo, *hi);
        }
    }
}

impl Debug for LeastSquaresProblem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeastSquaresProblem")
            .field("initial_parameters", &self.initial_parameters)
            .field("target_values", &self.target_values)
            .field("weights", &self.weights)
            .field("lower_bound", &self.lower_bound)
            .field("upper_bound", &self.upper_bound)
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

/// Result of a successful optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimiserResult {
    /// Best-fit parameters.
    pub best_fit_parameters: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Root mean square of the residuals at the best fit.
    pub root_mean_square_error: f64,
    /// Whether the accuracy was reached.
    pub converged: bool,
}

/// A bounded nonlinear least-squares optimiser.
pub trait LeastSquaresOptimiser: Send + Sync {
    /// Minimise the problem.
    ///
    /// # Errors
    ///
    /// Any [`SolverError`]; ending above the accuracy is
    /// [`SolverError::MaxIterationsExceeded`] or [`SolverError::Stalled`].
    fn minimise(&self, problem: &LeastSquaresProblem<'_>) -> Result<OptimiserResult, SolverError>;
}

/// Creates optimisers sized for a parameter count.
pub trait OptimiserFactory: Debug + Send + Sync {
    /// Create an optimiser for a problem with `parameter_count` parameters.
    fn create(&self, parameter_count: usize) -> Box<dyn LeastSquaresOptimiser>;
}

/// Root mean square of `residuals`.
#[inline]
pub(crate) fn root_mean_square(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(p: &[f64]) -> Result<Vec<f64>, SolverError> {
        Ok(vec![p[0] * p[0], p[0]])
    }

    #[test]
    fn test_default_bounds_and_weights() {
        let problem = LeastSquaresProblem::new(&square, vec![1.0], vec![4.0, 2.0]);
        assert_eq!(problem.weights(), &[1.0, 1.0]);
        assert_eq!(problem.lower_bound(), &[f64::NEG_INFINITY]);
        assert_eq!(problem.upper_bound(), &[f64::INFINITY]);
        assert!(problem.max_iterations().is_none());
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_weighted_residuals() {
        let problem =
            LeastSquaresProblem::new(&square, vec![3.0], vec![4.0, 2.0]).with_weights(vec![4.0, 0.0]);
        let r = problem.residuals(&[3.0]).unwrap();
        assert_relative_eq!(r[0], 10.0);
        assert_relative_eq!(r[1], 0.0);
    }

    #[test]
    fn test_validate_rejects_mismatched_weights() {
        let problem =
            LeastSquaresProblem::new(&square, vec![1.0], vec![4.0, 2.0]).with_weights(vec![1.0]);
        assert!(matches!(problem.validate(), Err(SolverError::InvalidProblem(_))));
    }

    #[test]
    fn test_validate_rejects_crossed_bounds() {
        let problem = LeastSquaresProblem::new(&square, vec![1.0], vec![4.0, 2.0])
            .with_bounds(vec![2.0], vec![1.0]);
        assert!(problem.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let problem = LeastSquaresProblem::new(&square, vec![], vec![4.0]);
        assert!(problem.validate().is_err());
    }

    #[test]
    fn test_projection() {
        let problem = LeastSquaresProblem::new(&square, vec![1.0, 1.0], vec![4.0, 2.0])
            .with_bounds(vec![0.0, f64::NEG_INFINITY], vec![1.0, 0.5]);
        let mut p = vec![-1.0, 2.0];
        problem.project(&mut p);
        assert_eq!(p, vec![0.0, 0.5]);
    }

    #[test]
    fn test_root_mean_square() {
        assert_relative_eq!(root_mean_square(&[3.0, 4.0]), (12.5_f64).sqrt());
        assert_eq!(root_mean_square(&[]), 0.0);
    }
}
