//! The priceable product contract.
//!
//! The calibration engine treats products as black boxes exposing a single
//! valuation method. A product holds typed [`CurveHandle`](crate::market_data::CurveHandle)s
//! into the model it was built against and reads curves through them.
//!
//! # Design Philosophy
//!
//! Calibration code is generic over the product type (`P: AnalyticProduct`)
//! and product families are `enum`s, so pricing inside the objective function
//! is statically dispatched.

use crate::market_data::Model;
use crate::types::PricingError;

/// A product that can be valued against a curve model.
///
/// # Invariants
///
/// - `value` must be pure: no side effects, deterministic for a given model
/// - `value` is called concurrently from optimiser worker threads
///
/// # Example
///
/// ```
/// use curve_core::market_data::{Curve, DiscountCurve, Model, CurveHandle};
/// use curve_core::traits::priceable::AnalyticProduct;
/// use curve_core::types::PricingError;
///
/// struct ZeroCouponBond {
///     maturity: f64,
///     discount_curve: CurveHandle,
/// }
///
/// impl AnalyticProduct for ZeroCouponBond {
///     fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
///         let df = model.discount_factor(self.discount_curve, self.maturity)?;
///         let df_eval = model.discount_factor(self.discount_curve, evaluation_time)?;
///         Ok(df / df_eval)
///     }
/// }
///
/// let curve = DiscountCurve::builder("discount")
///     .add_point(0.0, 1.0, false)
///     .add_point(2.0, 0.9, true)
///     .build()
///     .unwrap();
/// let model = Model::new().with_curve(Curve::Discount(curve));
/// let bond = ZeroCouponBond { maturity: 2.0, discount_curve: model.handle("discount").unwrap() };
/// assert!((bond.value(0.0, &model).unwrap() - 0.9).abs() < 1e-12);
/// ```
pub trait AnalyticProduct: Send + Sync {
    /// Value of the product at `evaluation_time` under `model`.
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError>;
}

impl<P: AnalyticProduct + ?Sized> AnalyticProduct for Box<P> {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        self.as_ref().value(evaluation_time, model)
    }
}

impl<P: AnalyticProduct + ?Sized> AnalyticProduct for std::sync::Arc<P> {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        self.as_ref().value(evaluation_time, model)
    }
}
