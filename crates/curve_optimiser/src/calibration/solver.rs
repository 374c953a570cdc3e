//! Least-squares calibration of curves to product values.
//!
//! The [`Solver`] searches for the parameters of a set of curves such that a
//! list of products reprices to its targets. Every trial parameter vector is
//! turned into a fresh model through `clone_for_parameter`; the input model
//! is never modified.

use super::aggregation::ParameterAggregation;
use crate::error::OptimiserError;
use curve_core::market_data::{Curve, CurveHandle, MarketDataError, Model};
use curve_core::math::optimisers::{
    CancellationToken, LMConfig, LeastSquaresProblem, LevenbergMarquardtFactory, OptimiserFactory,
};
use curve_core::traits::{AnalyticProduct, ParameterObject, ParameterTransformation};
use curve_core::types::SolverError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Aggregation of the curves a solver calibrates.
pub type CurveAggregation = ParameterAggregation<CurveHandle, Arc<Curve>>;

/// Diagnostics of a calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationDiagnostics {
    /// Optimiser iterations.
    pub iterations: usize,
    /// Root mean square of the residuals at the best fit.
    pub accuracy: f64,
    /// Product value minus target at the best fit, per product.
    pub residuals: Vec<f64>,
    /// Whether the optimiser reported convergence.
    pub converged: bool,
    /// Number of calibrated parameters.
    pub parameter_count: usize,
}

/// Calibrated model and diagnostics.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// Model carrying the calibrated curves.
    pub model: Model,
    /// Diagnostics of the run.
    pub diagnostics: CalibrationDiagnostics,
}

/// Calibrates curves of a model so that products reprice to their targets.
///
/// # Defaults
///
/// - targets: zero for every product
/// - evaluation time: 0
/// - accuracy: 1e-10 root mean square residual
/// - max iterations: 1000
/// - optimiser: [`LevenbergMarquardtFactory`] with
///   `min(2 × available cores, parameter count)` Jacobian threads
/// - bounds: none
///
/// # Example
///
/// ```
/// use curve_core::market_data::{DiscountCurve, Model};
/// use curve_optimiser::calibration::Solver;
/// use curve_products::instruments::Deposit;
/// use curve_products::schedules::Period;
///
/// let curve = DiscountCurve::builder("discount")
///     .add_point(0.0, 1.0, false)
///     .add_point(1.0, 1.0, true)
///     .build()
///     .unwrap();
/// let model = Model::new().with_curve(curve);
/// let discount = model.handle("discount").unwrap();
///
/// let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.02, discount);
/// let outcome = Solver::new(model, vec![deposit]).solve(&[discount]).unwrap();
///
/// let df = outcome.model.discount_factor(discount, 1.0).unwrap();
/// assert!((df - 1.0 / 1.02).abs() < 1e-8);
/// assert!(outcome.diagnostics.converged);
/// ```
#[derive(Debug)]
pub struct Solver<P> {
    model: Model,
    products: Vec<P>,
    targets: Option<Vec<f64>>,
    transformation: Option<Arc<dyn ParameterTransformation>>,
    evaluation_time: f64,
    accuracy: f64,
    max_iterations: usize,
    max_threads: Option<usize>,
    optimiser_factory: Option<Arc<dyn OptimiserFactory>>,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
    weights: Option<Vec<f64>>,
    cancellation: Option<CancellationToken>,
}

impl<P: AnalyticProduct> Solver<P> {
    /// Create a solver repricing `products` against `model`.
    pub fn new(model: Model, products: Vec<P>) -> Self {
        Self {
            model,
            products,
            targets: None,
            transformation: None,
            evaluation_time: 0.0,
            accuracy: 1e-10,
            max_iterations: 1000,
            max_threads: None,
            optimiser_factory: None,
            bounds: None,
            weights: None,
            cancellation: None,
        }
    }

    /// Target value per product.
    pub fn with_targets(mut self, targets: Vec<f64>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Optimise in the solver space of `transformation`.
    pub fn with_transformation(mut self, transformation: Arc<dyn ParameterTransformation>) -> Self {
        self.transformation = Some(transformation);
        self
    }

    /// Time at which products are valued.
    pub fn with_evaluation_time(mut self, evaluation_time: f64) -> Self {
        self.evaluation_time = evaluation_time;
        self
    }

    /// Target root mean square residual of the default optimiser.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Cap the Jacobian threads of the default optimiser.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = Some(max_threads);
        self
    }

    /// Use optimisers from `factory` instead of the default.
    ///
    /// Accuracy, thread cap and cancellation then belong to the factory's
    /// configuration.
    pub fn with_optimiser_factory(mut self, factory: Arc<dyn OptimiserFactory>) -> Self {
        self.optimiser_factory = Some(factory);
        self
    }

    /// Parameter bounds, in solver space.
    pub fn with_bounds(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        self.bounds = Some((lower, upper));
        self
    }

    /// Weight per product.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Stop the default optimiser when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Input model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Products, in target order.
    pub fn products(&self) -> &[P] {
        &self.products
    }

    /// Calibrate the curves at `curves_to_calibrate`.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::MarketData`] for a handle outside the model
    /// - see [`solve_aggregation`](Self::solve_aggregation)
    pub fn solve(&self, curves_to_calibrate: &[CurveHandle]) -> Result<SolverOutcome, OptimiserError> {
        let mut aggregation = CurveAggregation::new();
        for &handle in curves_to_calibrate {
            let curve = self
                .model
                .curve_by_handle(handle)
                .ok_or(MarketDataError::UnknownHandle {
                    index: handle.index(),
                })?;
            aggregation.add(handle, Arc::clone(curve));
        }
        self.solve_aggregation(&aggregation)
    }

    /// Calibrate the curves of `aggregation`, keyed by their handles in the
    /// model.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::Configuration`] for no free parameters, no
    ///   products, or targets and weights not matching the products
    /// - [`OptimiserError::Solver`] when the optimiser fails
    pub fn solve_aggregation(
        &self,
        aggregation: &CurveAggregation,
    ) -> Result<SolverOutcome, OptimiserError> {
        let initial = aggregation
            .parameter()
            .ok_or_else(|| OptimiserError::configuration("curves", "no free parameters"))?;
        if self.products.is_empty() {
            return Err(OptimiserError::configuration("products", "no products"));
        }
        let targets = self.targets()?;
        let parameter_count = initial.len();

        let objective = |solver_parameter: &[f64]| -> Result<Vec<f64>, SolverError> {
            let model = self.model_for(aggregation, solver_parameter)?;
            self.products
                .iter()
                .map(|p| p.value(self.evaluation_time, &model).map_err(SolverError::from))
                .collect()
        };

        let initial_solver = match &self.transformation {
            Some(t) => t.to_solver_space(&initial),
            None => initial,
        };
        let mut problem = LeastSquaresProblem::new(&objective, initial_solver, targets.clone())
            .with_max_iterations(self.max_iterations);
        if let Some((lower, upper)) = &self.bounds {
            problem = problem.with_bounds(lower.clone(), upper.clone());
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.products.len() {
                return Err(OptimiserError::configuration(
                    "weights",
                    format!("{} weights for {} products", weights.len(), self.products.len()),
                ));
            }
            problem = problem.with_weights(weights.clone());
        }

        let factory = self.factory();
        info!(
            parameters = parameter_count,
            products = self.products.len(),
            evaluation_time = self.evaluation_time,
            "Starting calibration"
        );

        let result = factory.create(parameter_count).minimise(&problem).map_err(|err| {
            warn!(%err, "Calibration failed");
            err
        })?;
        if !result.converged {
            warn!(rms = result.root_mean_square_error, "Optimiser returned without converging");
            return Err(SolverError::MaxIterationsExceeded {
                iterations: result.iterations,
                rms: result.root_mean_square_error,
            }
            .into());
        }

        let model = self.model_for(aggregation, &result.best_fit_parameters)?;
        let residuals = self
            .products
            .iter()
            .zip(&targets)
            .map(|(p, target)| -> Result<f64, OptimiserError> {
                Ok(p.value(self.evaluation_time, &model)? - target)
            })
            .collect::<Result<Vec<f64>, OptimiserError>>()?;
        let accuracy = (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt();

        info!(
            iterations = result.iterations,
            accuracy,
            converged = result.converged,
            "Calibration finished"
        );

        Ok(SolverOutcome {
            model,
            diagnostics: CalibrationDiagnostics {
                iterations: result.iterations,
                accuracy,
                residuals,
                converged: result.converged,
                parameter_count,
            },
        })
    }

    fn targets(&self) -> Result<Vec<f64>, OptimiserError> {
        match &self.targets {
            None => Ok(vec![0.0; self.products.len()]),
            Some(t) if t.len() == self.products.len() => Ok(t.clone()),
            Some(t) => Err(OptimiserError::configuration(
                "targets",
                format!("{} targets for {} products", t.len(), self.products.len()),
            )),
        }
    }

    fn factory(&self) -> Arc<dyn OptimiserFactory> {
        if let Some(factory) = &self.optimiser_factory {
            return Arc::clone(factory);
        }
        let mut config = LMConfig::new(self.accuracy, self.max_iterations);
        if let Some(token) = &self.cancellation {
            config = config.with_cancellation(token.clone());
        }
        let mut factory = LevenbergMarquardtFactory::new(config);
        if let Some(max_threads) = self.max_threads {
            factory = factory.with_max_threads(max_threads);
        }
        debug!(max_threads = ?self.max_threads, "Using default Levenberg-Marquardt factory");
        Arc::new(factory)
    }

    /// Model carrying the curves of `aggregation` cloned for a solver-space
    /// parameter.
    fn model_for(
        &self,
        aggregation: &CurveAggregation,
        solver_parameter: &[f64],
    ) -> Result<Model, SolverError> {
        let changes = match &self.transformation {
            Some(t) => aggregation.objects_to_modify_for_parameter(&t.to_model_space(solver_parameter))?,
            None => aggregation.objects_to_modify_for_parameter(solver_parameter)?,
        };
        Ok(self.model.clone_for_parameter(&changes)?)
    }
}
