//! Levenberg-Marquardt nonlinear least-squares optimiser.
//!
//! # Algorithm
//!
//! The Levenberg-Marquardt algorithm combines Gauss-Newton and gradient descent:
//!
//! ```text
//! (J^T J + λI) δ = -J^T r
//! p_{n+1} = P(p_n + δ)
//! ```
//!
//! where:
//! - `J` is the finite-difference Jacobian of the weighted residuals
//! - `r` is the weighted residual vector
//! - `λ` is the damping factor (adjusted during iteration)
//! - `P` projects onto the parameter bounds
//!
//! Jacobian columns are independent objective evaluations and run on a
//! dedicated rayon pool when more than one thread is configured, or on the
//! caller's pool when the run itself starts on a rayon worker.
//!
//! A run only succeeds once the residual RMS is within the configured
//! accuracy. Running out of iterations or stalling above it is an error.
//!
//! # Example
//!
//! ```
//! use curve_core::math::optimisers::{
//!     LeastSquaresOptimiser, LeastSquaresProblem, LevenbergMarquardt, LMConfig,
//! };
//! use curve_core::types::SolverError;
//!
//! // Fit (p0, p1) so that p0 + p1 = 3 and p0 - p1 = 1
//! let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> {
//!     Ok(vec![p[0] + p[1], p[0] - p[1]])
//! };
//! let problem = LeastSquaresProblem::new(&objective, vec![0.0, 0.0], vec![3.0, 1.0]);
//!
//! let result = LevenbergMarquardt::new(LMConfig::default()).minimise(&problem).unwrap();
//! assert!(result.converged);
//! assert!((result.best_fit_parameters[0] - 2.0).abs() < 1e-8);
//! assert!((result.best_fit_parameters[1] - 1.0).abs() < 1e-8);
//! ```

use super::config::LMConfig;
use super::problem::{
    root_mean_square, LeastSquaresOptimiser, LeastSquaresProblem, OptimiserFactory,
    OptimiserResult,
};
use crate::types::SolverError;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Levenberg-Marquardt optimiser.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    config: LMConfig,
}

impl LevenbergMarquardt {
    /// Create an optimiser with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create an optimiser with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Get the optimiser configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Pick where Jacobian columns run.
    ///
    /// A run started from a rayon worker (for example one of several shifted
    /// recalibrations evaluated in parallel) reuses the enclosing pool, so
    /// nested runs never hold more threads than that pool.
    fn jacobian_pool(&self) -> Result<JacobianPool, SolverError> {
        if self.config.thread_count <= 1 {
            return Ok(JacobianPool::Serial);
        }
        if rayon::current_thread_index().is_some() {
            return Ok(JacobianPool::Current);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.thread_count)
            .thread_name(|i| format!("lm-jacobian-{}", i))
            .build()
            .map(JacobianPool::Dedicated)
            .map_err(|e| SolverError::ThreadPool(e.to_string()))
    }

    /// Forward-difference Jacobian, column-major: `columns[j][i] = ∂r_i/∂p_j`.
    fn jacobian(
        &self,
        problem: &LeastSquaresProblem<'_>,
        params: &[f64],
        r0: &[f64],
        pool: &JacobianPool,
    ) -> Result<Vec<Vec<f64>>, SolverError> {
        let column = |j: usize| -> Result<Vec<f64>, SolverError> {
            let mut h = self.config.finite_difference_step * params[j].abs().max(1.0);
            // Step backwards when the forward bump would leave the box
            if params[j] + h > problem.upper_bound()[j] {
                h = -h;
            }
            let mut bumped = params.to_vec();
            bumped[j] += h;
            let r = problem.residuals(&bumped)?;
            Ok(r.iter().zip(r0).map(|(a, b)| (a - b) / h).collect())
        };

        let parallel = || {
            (0..params.len())
                .into_par_iter()
                .map(&column)
                .collect::<Result<Vec<_>, _>>()
        };
        let columns: Vec<Vec<f64>> = match pool {
            JacobianPool::Serial => (0..params.len()).map(&column).collect::<Result<_, _>>()?,
            JacobianPool::Current => parallel()?,
            JacobianPool::Dedicated(pool) => pool.install(parallel)?,
        };

        for col in &columns {
            if let Some(index) = col.iter().position(|x| !x.is_finite()) {
                return Err(SolverError::NonFiniteResidual { index });
            }
        }
        Ok(columns)
    }
}

impl LeastSquaresOptimiser for LevenbergMarquardt {
    fn minimise(&self, problem: &LeastSquaresProblem<'_>) -> Result<OptimiserResult, SolverError> {
        problem.validate()?;
        let max_iterations = problem.max_iterations().unwrap_or(self.config.max_iterations);
        let pool = self.jacobian_pool()?;

        let mut params = problem.initial_parameters().to_vec();
        problem.project(&mut params);
        let mut lambda = self.config.initial_lambda;

        let mut r = problem.residuals(&params)?;
        if let Some(index) = r.iter().position(|x| !x.is_finite()) {
            return Err(SolverError::NonFiniteResidual { index });
        }
        let mut rms = root_mean_square(&r);

        for iteration in 0..max_iterations {
            if self.config.is_cancelled() {
                tracing::warn!(iteration, rms, "Optimisation cancelled");
                return Err(SolverError::Cancelled {
                    iterations: iteration,
                });
            }

            if rms <= self.config.accuracy {
                return Ok(OptimiserResult {
                    best_fit_parameters: params,
                    iterations: iteration,
                    root_mean_square_error: rms,
                    converged: true,
                });
            }

            let jacobian = self.jacobian(problem, &params, &r, &pool)?;

            let delta = match solve_normal_equations(&jacobian, &r, lambda) {
                Some(d) => d,
                None => {
                    if lambda >= self.config.max_lambda {
                        tracing::warn!(iteration, lambda, "Normal equations singular");
                        return Err(SolverError::SingularSystem { iteration });
                    }
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    continue;
                }
            };

            let mut trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            problem.project(&mut trial);

            let step = trial
                .iter()
                .zip(&params)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
            if step / param_norm < self.config.param_tolerance {
                // rms is above accuracy here, so no further step can help
                tracing::warn!(iteration, rms, "Parameter change below tolerance");
                return Err(SolverError::Stalled { iteration, rms });
            }

            // Trial points that cannot be evaluated or give non-finite
            // residuals reject the step
            let trial_r = match problem.residuals(&trial) {
                Ok(trial_r) if trial_r.iter().all(|x| x.is_finite()) => Some(trial_r),
                Ok(_) => None,
                Err(err) => {
                    tracing::debug!(iteration, %err, "Trial point rejected");
                    None
                }
            };
            let trial_rms = trial_r.as_deref().map_or(f64::INFINITY, root_mean_square);

            tracing::trace!(iteration, rms, trial_rms, lambda, "Levenberg-Marquardt step");

            match trial_r {
                Some(trial_r) if trial_rms < rms => {
                    params = trial;
                    r = trial_r;
                    rms = trial_rms;
                    lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
                }
                _ => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                }
            }
        }

        if rms <= self.config.accuracy {
            return Ok(OptimiserResult {
                best_fit_parameters: params,
                iterations: max_iterations,
                root_mean_square_error: rms,
                converged: true,
            });
        }

        tracing::warn!(iterations = max_iterations, rms, "Levenberg-Marquardt did not converge");
        Err(SolverError::MaxIterationsExceeded {
            iterations: max_iterations,
            rms,
        })
    }
}

/// Where the Jacobian columns of one run are evaluated.
#[derive(Debug)]
enum JacobianPool {
    Serial,
    /// The rayon pool of the calling worker thread.
    Current,
    Dedicated(ThreadPool),
}

/// Factory for [`LevenbergMarquardt`] optimisers.
///
/// Each optimiser gets `min(max_threads, parameter_count)` Jacobian threads,
/// where `max_threads` defaults to twice the number of available cores.
///
/// # Example
///
/// ```
/// use curve_core::math::optimisers::LevenbergMarquardtFactory;
///
/// let factory = LevenbergMarquardtFactory::default().with_max_threads(8);
/// assert_eq!(factory.thread_count(1), 1);
/// assert_eq!(factory.thread_count(3), 3);
/// assert_eq!(factory.thread_count(100), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardtFactory {
    config: LMConfig,
    max_threads: Option<usize>,
}

impl LevenbergMarquardtFactory {
    /// Create a factory whose optimisers use `config`.
    pub fn new(config: LMConfig) -> Self {
        Self {
            config,
            max_threads: None,
        }
    }

    /// Cap the number of Jacobian threads.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads.max(1));
        self
    }

    /// Configuration handed to created optimisers.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Thread budget for a problem with `parameter_count` parameters.
    pub fn thread_count(&self, parameter_count: usize) -> usize {
        let max_threads = self
            .max_threads
            .unwrap_or_else(|| 2 * num_cpus::get());
        max_threads.min(parameter_count).max(1)
    }
}

impl OptimiserFactory for LevenbergMarquardtFactory {
    fn create(&self, parameter_count: usize) -> Box<dyn LeastSquaresOptimiser> {
        let config = self
            .config
            .clone()
            .with_thread_count(self.thread_count(parameter_count));
        Box::new(LevenbergMarquardt::new(config))
    }
}

/// Solve the normal equations `(J^T J + λ diag) δ = -J^T r`.
///
/// The damping term is `λ (1 + diag(J^T J))` so that badly scaled columns are
/// damped proportionally.
fn solve_normal_equations(columns: &[Vec<f64>], residuals: &[f64], lambda: f64) -> Option<Vec<f64>> {
    let n = columns.len();
    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();

    let mut jtj = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let v = dot(&columns[i], &columns[j]);
            jtj[i][j] = v;
            jtj[j][i] = v;
        }
    }
    for (i, row) in jtj.iter_mut().enumerate() {
        row[i] += lambda * (1.0 + row[i]);
    }

    let jtr: Vec<f64> = columns.iter().map(|c| -dot(c, residuals)).collect();
    solve_cholesky(&jtj, &jtr)
}

/// Solve Ax = b using Cholesky decomposition.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L^T
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if !sum.is_finite() || sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    // L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::optimisers::{CancellationToken, Objective};
    use approx::assert_relative_eq;

    fn linear(p: &[f64]) -> Result<Vec<f64>, SolverError> {
        Ok(vec![p[0] + p[1], p[0] - p[1]])
    }

    fn rosenbrock(p: &[f64]) -> Result<Vec<f64>, SolverError> {
        Ok(vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]])
    }

    fn rosenbrock_problem<'a>(objective: &'a Objective<'static>) -> LeastSquaresProblem<'a> {
        LeastSquaresProblem::new(objective, vec![-1.2, 1.0], vec![0.0, 0.0])
    }

    // ========================================
    // Convergence Tests
    // ========================================

    #[test]
    fn test_rosenbrock() {
        let result = LevenbergMarquardt::with_defaults()
            .minimise(&rosenbrock_problem(&rosenbrock))
            .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.best_fit_parameters[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.best_fit_parameters[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_system() {
        let problem = LeastSquaresProblem::new(&linear, vec![0.0, 0.0], vec![3.0, 1.0]);
        let result = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.best_fit_parameters[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(result.best_fit_parameters[1], 1.0, epsilon = 1e-8);
        assert!(result.root_mean_square_error <= 1e-10);
    }

    #[test]
    fn test_exponential_decay_fit() {
        let x_data = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y_data: Vec<f64> = x_data.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
        let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> {
            Ok(x_data.iter().map(|x| p[0] * (-p[1] * x).exp()).collect())
        };
        let problem = LeastSquaresProblem::new(&objective, vec![1.0, 1.0], y_data);
        let result = LevenbergMarquardt::new(LMConfig::default().with_thread_count(2))
            .minimise(&problem)
            .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.best_fit_parameters[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.best_fit_parameters[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_already_converged_takes_no_iteration() {
        let problem = LeastSquaresProblem::new(&linear, vec![2.0, 1.0], vec![3.0, 1.0]);
        let result = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.converged);
    }

    #[test]
    fn test_bounds_are_respected() {
        // Unconstrained optimum p = 2 lies outside [0, 1]
        let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> { Ok(vec![p[0]]) };
        let problem = LeastSquaresProblem::new(&objective, vec![0.5], vec![2.0])
            .with_bounds(vec![0.0], vec![1.0])
            .with_max_iterations(50);
        let err = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap_err();
        assert!(err.is_not_converged());
        match err {
            SolverError::Stalled { rms, .. } | SolverError::MaxIterationsExceeded { rms, .. } => {
                assert_relative_eq!(rms, 1.0, epsilon = 1e-6)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ========================================
    // Failure Tests
    // ========================================

    #[test]
    fn test_iteration_exhaustion_is_error() {
        let err = LevenbergMarquardt::with_defaults()
            .minimise(&rosenbrock_problem(&rosenbrock).with_max_iterations(2))
            .unwrap_err();
        assert!(err.is_not_converged());
        assert!(matches!(
            err,
            SolverError::MaxIterationsExceeded { iterations: 2, .. }
        ));
    }

    #[test]
    fn test_insensitive_objective_stalls() {
        // Residuals that ignore the parameters can never reach the target
        let objective = |_: &[f64]| -> Result<Vec<f64>, SolverError> { Ok(vec![0.02]) };
        let problem = LeastSquaresProblem::new(&objective, vec![1.0], vec![0.0]);
        let err = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap_err();
        match err {
            SolverError::Stalled { iteration, rms } => {
                assert_eq!(iteration, 0);
                assert_relative_eq!(rms, 0.02, epsilon = 1e-15);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_initial_residual() {
        let objective = |_: &[f64]| -> Result<Vec<f64>, SolverError> { Ok(vec![1.0, f64::NAN]) };
        let problem = LeastSquaresProblem::new(&objective, vec![1.0], vec![0.0, 0.0]);
        let err = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap_err();
        assert_eq!(err, SolverError::NonFiniteResidual { index: 1 });
    }

    #[test]
    fn test_objective_error_propagates() {
        let objective = |_: &[f64]| -> Result<Vec<f64>, SolverError> {
            Err(SolverError::invalid_problem("boom"))
        };
        let problem = LeastSquaresProblem::new(&objective, vec![1.0], vec![0.0]);
        let err = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap_err();
        assert_eq!(err, SolverError::invalid_problem("boom"));
    }

    #[test]
    fn test_failing_trial_point_is_rejected() {
        let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> {
            if p[0] <= 0.0 {
                return Err(SolverError::invalid_problem("non-positive parameter"));
            }
            Ok(vec![p[0].ln()])
        };
        // The undamped first step overshoots below zero
        let problem = LeastSquaresProblem::new(&objective, vec![1.0], vec![0.01_f64.ln()]);
        let result = LevenbergMarquardt::with_defaults().minimise(&problem).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.best_fit_parameters[0], 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_cancelled_before_first_iteration() {
        let token = CancellationToken::new();
        token.cancel();
        let problem = LeastSquaresProblem::new(&linear, vec![0.0, 0.0], vec![3.0, 1.0]);
        let err = LevenbergMarquardt::new(LMConfig::default().with_cancellation(token))
            .minimise(&problem)
            .unwrap_err();
        assert_eq!(err, SolverError::Cancelled { iterations: 0 });
    }

    #[test]
    fn test_invalid_problem_rejected() {
        let problem = LeastSquaresProblem::new(&linear, vec![], vec![3.0, 1.0]);
        assert!(matches!(
            LevenbergMarquardt::with_defaults().minimise(&problem),
            Err(SolverError::InvalidProblem(_))
        ));
    }

    // ========================================
    // Factory Tests
    // ========================================

    #[test]
    fn test_thread_count_bound_by_parameters() {
        let factory = LevenbergMarquardtFactory::default();
        assert_eq!(factory.thread_count(1), 1);
        assert_eq!(factory.thread_count(0), 1);
        assert!(factory.thread_count(10_000) <= 2 * num_cpus::get());
    }

    #[test]
    fn test_factory_creates_working_optimiser() {
        let factory = LevenbergMarquardtFactory::new(LMConfig::default()).with_max_threads(4);
        let optimiser = factory.create(2);
        let problem = LeastSquaresProblem::new(&linear, vec![0.0, 0.0], vec![3.0, 1.0]);
        let result = optimiser.minimise(&problem).unwrap();
        assert_relative_eq!(result.best_fit_parameters[0], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_run_on_rayon_worker_reuses_pool() {
        let outer = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let lm = LevenbergMarquardt::new(LMConfig::default().with_thread_count(4));
        assert!(matches!(lm.jacobian_pool().unwrap(), JacobianPool::Dedicated(_)));

        let (pool, result) = outer.install(|| {
            let problem = LeastSquaresProblem::new(&linear, vec![0.0, 0.0], vec![3.0, 1.0]);
            (lm.jacobian_pool().unwrap(), lm.minimise(&problem).unwrap())
        });
        assert!(matches!(pool, JacobianPool::Current));
        assert!(result.converged);
        assert_relative_eq!(result.best_fit_parameters[1], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_single_thread_runs_serially() {
        let lm = LevenbergMarquardt::new(LMConfig::default().with_thread_count(1));
        assert!(matches!(lm.jacobian_pool().unwrap(), JacobianPool::Serial));
    }

    // ========================================
    // Linear Algebra Tests
    // ========================================

    #[test]
    fn test_cholesky_solve() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let x = solve_cholesky(&a, &[8.0, 7.0]).unwrap();
        assert_relative_eq!(x[0], 1.25, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_non_positive_definite() {
        let a = vec![vec![-1.0, 0.0], vec![0.0, 1.0]];
        assert!(solve_cholesky(&a, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_jacobian_linear() {
        let problem = LeastSquaresProblem::new(&linear, vec![1.0, 1.0], vec![0.0, 0.0]);
        let lm = LevenbergMarquardt::with_defaults();
        let r0 = problem.residuals(&[1.0, 1.0]).unwrap();
        let columns = lm
            .jacobian(&problem, &[1.0, 1.0], &r0, &JacobianPool::Serial)
            .unwrap();
        assert_relative_eq!(columns[0][0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(columns[1][1], -1.0, epsilon = 1e-5);
    }
}
