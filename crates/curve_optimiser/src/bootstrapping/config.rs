//! Calibration configuration types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How referenced forward curves are created when absent.
///
/// # Variants
///
/// - `Native`: A point-based forward curve of forward rates
/// - `DerivedFromDiscount`: A discount curve of that name, read through a
///   forward-from-discount wrapper (single-curve set-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForwardCurveMode {
    /// Create point-based forward curves (default).
    #[default]
    Native,

    /// Create discount curves and derive forwards from them.
    DerivedFromDiscount,
}

/// Configuration for [`CalibratedCurves`](super::CalibratedCurves).
///
/// # Examples
///
/// ```
/// use curve_optimiser::bootstrapping::{CalibrationConfig, ForwardCurveMode};
///
/// let config = CalibrationConfig::default();
/// assert!(config.auto_create_curves);
/// assert_eq!(config.max_iterations, 1000);
///
/// let config = CalibrationConfig::builder()
///     .forward_curve_mode(ForwardCurveMode::DerivedFromDiscount)
///     .accuracy(1e-12)
///     .max_threads(4)
///     .build();
/// assert_eq!(config.max_threads, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationConfig {
    /// Time at which calibration products are valued.
    ///
    /// Default: 0.0
    pub evaluation_time: f64,

    /// Target root mean square residual.
    ///
    /// Default: 1e-10
    pub accuracy: f64,

    /// Iteration budget of the joint solve.
    ///
    /// Default: 1000
    pub max_iterations: usize,

    /// Create referenced curves that do not exist yet.
    ///
    /// If false, a reference to an absent curve is a configuration error.
    /// Default: true
    pub auto_create_curves: bool,

    /// Representation of created forward curves.
    ///
    /// Default: Native
    pub forward_curve_mode: ForwardCurveMode,

    /// Infer a missing index tenor from the forward curve name
    /// (`"_3M"`, `"-6M"`, ...).
    ///
    /// Default: false
    pub infer_index_tenor: bool,

    /// Cap on Jacobian threads; `None` uses twice the available cores.
    ///
    /// Default: None
    pub max_threads: Option<usize>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            evaluation_time: 0.0,
            accuracy: 1e-10,
            max_iterations: 1000,
            auto_create_curves: true,
            forward_curve_mode: ForwardCurveMode::Native,
            infer_index_tenor: false,
            max_threads: None,
        }
    }
}

impl CalibrationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder for fluent construction.
    pub fn builder() -> CalibrationConfigBuilder {
        CalibrationConfigBuilder::new()
    }

    /// Create a configuration that never creates curves.
    pub fn strict() -> Self {
        Self {
            auto_create_curves: false,
            ..Self::default()
        }
    }

    /// Create a single-curve configuration: forwards are derived from
    /// discount curves.
    pub fn single_curve() -> Self {
        Self {
            forward_curve_mode: ForwardCurveMode::DerivedFromDiscount,
            ..Self::default()
        }
    }
}

/// Builder for [`CalibrationConfig`].
#[derive(Debug, Clone, Default)]
pub struct CalibrationConfigBuilder {
    config: CalibrationConfig,
}

impl CalibrationConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evaluation time.
    pub fn evaluation_time(mut self, evaluation_time: f64) -> Self {
        self.config.evaluation_time = evaluation_time;
        self
    }

    /// Set the target accuracy.
    pub fn accuracy(mut self, accuracy: f64) -> Self {
        self.config.accuracy = accuracy;
        self
    }

    /// Set the iteration budget.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set whether absent curves are created.
    pub fn auto_create_curves(mut self, auto_create: bool) -> Self {
        self.config.auto_create_curves = auto_create;
        self
    }

    /// Set the forward curve mode.
    pub fn forward_curve_mode(mut self, mode: ForwardCurveMode) -> Self {
        self.config.forward_curve_mode = mode;
        self
    }

    /// Set whether index tenors are inferred from curve names.
    pub fn infer_index_tenor(mut self, infer: bool) -> Self {
        self.config.infer_index_tenor = infer;
        self
    }

    /// Cap the Jacobian threads.
    pub fn max_threads(mut self, max_threads: usize) -> Self {
        self.config.max_threads = Some(max_threads);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CalibrationConfig {
        self.config
    }
}
