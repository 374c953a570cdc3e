//! Levenberg-Marquardt configuration.

use super::cancellation::CancellationToken;

/// Configuration for the Levenberg-Marquardt optimiser.
///
/// # Fields
///
/// * `accuracy` - Target root mean square residual
/// * `max_iterations` - Iteration budget when the problem sets none
/// * `initial_lambda` - Initial damping factor
/// * `lambda_up` / `lambda_down` - Damping factors on rejected/accepted steps
/// * `min_lambda` / `max_lambda` - Damping range
/// * `param_tolerance` - Relative step size below which the run stops
/// * `finite_difference_step` - Relative bump for the Jacobian
/// * `thread_count` - Worker threads for Jacobian columns
/// * `cancellation` - Optional cancellation token
#[derive(Debug, Clone, PartialEq)]
pub struct LMConfig {
    /// Target root mean square residual.
    pub accuracy: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Relative parameter change below which the run stops.
    pub param_tolerance: f64,
    /// Relative finite-difference bump, scaled by `max(|p|, 1)`.
    pub finite_difference_step: f64,
    /// Number of worker threads for the Jacobian (1 = serial).
    pub thread_count: usize,
    /// Token checked once per iteration.
    pub cancellation: Option<CancellationToken>,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            accuracy: 1e-10,
            max_iterations: 1000,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            param_tolerance: 1e-14,
            finite_difference_step: 1e-8,
            thread_count: 1,
            cancellation: None,
        }
    }
}

impl LMConfig {
    /// Create a configuration with the given accuracy and iteration budget.
    pub fn new(accuracy: f64, max_iterations: usize) -> Self {
        Self {
            accuracy,
            max_iterations,
            ..Default::default()
        }
    }

    /// Create a fast configuration with relaxed accuracy.
    pub fn fast() -> Self {
        Self {
            accuracy: 1e-6,
            max_iterations: 100,
            ..Default::default()
        }
    }

    /// Create a high precision configuration.
    pub fn high_precision() -> Self {
        Self {
            accuracy: 1e-14,
            max_iterations: 5000,
            param_tolerance: 1e-16,
            ..Default::default()
        }
    }

    /// Set the number of Jacobian worker threads (at least one).
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Whether the attached token, if any, was cancelled.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LMConfig::default();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.thread_count, 1);
        assert!(config.initial_lambda > 0.0);
        assert!(config.cancellation.is_none());
    }

    #[test]
    fn test_presets() {
        assert!(LMConfig::fast().accuracy > LMConfig::default().accuracy);
        assert!(LMConfig::high_precision().accuracy < LMConfig::default().accuracy);
        let config = LMConfig::new(1e-8, 50);
        assert_eq!(config.max_iterations, 50);
        assert!((config.accuracy - 1e-8).abs() < 1e-20);
    }

    #[test]
    fn test_thread_count_at_least_one() {
        assert_eq!(LMConfig::default().with_thread_count(0).thread_count, 1);
        assert_eq!(LMConfig::default().with_thread_count(6).thread_count, 6);
    }

    #[test]
    fn test_cancellation_flag() {
        let token = CancellationToken::new();
        let config = LMConfig::default().with_cancellation(token.clone());
        assert!(!config.is_cancelled());
        token.cancel();
        assert!(config.is_cancelled());
    }
}
