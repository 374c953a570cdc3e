//! Integration tests for curves, the model and the optimisers.
//!
//! These tests exercise the public API across modules: parameter objects
//! cloned through the model, and a curve fitted by the Levenberg-Marquardt
//! optimiser through model clones.

use approx::assert_relative_eq;
use curve_core::market_data::{Curve, CurveHandle, DiscountCurve, ForwardCurve, Model};
use curve_core::math::optimisers::{
    LMConfig, LeastSquaresOptimiser, LeastSquaresProblem, LevenbergMarquardtFactory,
    OptimiserFactory,
};
use curve_core::traits::ParameterObject;
use curve_core::types::SolverError;
use std::collections::HashMap;
use std::sync::Arc;

fn model() -> Model {
    Model::new()
        .with_curve(
            DiscountCurve::builder("discount")
                .add_point(0.0, 1.0, false)
                .add_point(1.0, 0.98, true)
                .add_point(2.0, 0.95, true)
                .build()
                .unwrap(),
        )
        .with_curve(
            ForwardCurve::builder("forward")
                .add_point(0.0, 0.0, false)
                .add_point(1.0, 0.03, true)
                .build()
                .unwrap(),
        )
}

/// Cloning every curve for its own parameter reproduces the model.
#[test]
fn test_clone_for_own_parameter_is_idempotent() {
    let model = model();
    let parameters: HashMap<CurveHandle, Vec<f64>> = model
        .curves()
        .filter_map(|(handle, curve)| curve.parameter().map(|p| (handle, p)))
        .collect();

    let clone = model.clone_for_parameter(&parameters).unwrap();
    for (handle, curve) in model.curves() {
        let cloned: &Curve = clone.curve_by_handle(handle).unwrap();
        assert_eq!(cloned, curve.as_ref());
    }
}

/// Curves not listed in a parameter map are shared, not copied.
#[test]
fn test_unlisted_curves_are_shared() {
    let model = model();
    let discount = model.handle("discount").unwrap();
    let forward = model.handle("forward").unwrap();

    let clone = model
        .clone_for_parameter(&HashMap::from([(forward, vec![0.04])]))
        .unwrap();
    assert!(Arc::ptr_eq(
        model.curve_by_handle(discount).unwrap(),
        clone.curve_by_handle(discount).unwrap()
    ));
    assert_relative_eq!(clone.forward(forward, 1.0, 0.5).unwrap(), 0.04, epsilon = 1e-15);
    assert_relative_eq!(model.forward(forward, 1.0, 0.5).unwrap(), 0.03, epsilon = 1e-15);
}

/// Fit two discount factors to zero rates through model clones.
#[test]
fn test_fit_curve_through_model_clones() {
    let model = model();
    let discount = model.handle("discount").unwrap();
    let initial = model.curve_by_handle(discount).unwrap().parameter().unwrap();

    let objective = |p: &[f64]| -> Result<Vec<f64>, SolverError> {
        let clone = model.clone_for_parameter(&HashMap::from([(discount, p.to_vec())]))?;
        [1.0, 2.0]
            .iter()
            .map(|&t| -> Result<f64, SolverError> { Ok(-clone.discount_factor(discount, t)?.ln() / t) })
            .collect()
    };
    let problem = LeastSquaresProblem::new(&objective, initial, vec![0.02, 0.025]);

    let factory = LevenbergMarquardtFactory::new(LMConfig::new(1e-12, 200));
    let result = factory.create(2).minimise(&problem).unwrap();

    assert!(result.converged);
    assert_relative_eq!(result.best_fit_parameters[0], (-0.02_f64).exp(), epsilon = 1e-9);
    assert_relative_eq!(result.best_fit_parameters[1], (-0.05_f64).exp(), epsilon = 1e-9);
}
