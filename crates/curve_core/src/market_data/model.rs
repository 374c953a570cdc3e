//! The immutable curve model.
//!
//! This module provides:
//! - [`CurveHandle`]: Stable typed index of a curve within a model
//! - [`Model`]: Arena of shared immutable curves with a name index

use super::curves::{Curve, CurveKind};
use super::error::MarketDataError;
use crate::traits::parameter::ParameterObject;
use std::collections::HashMap;
use std::sync::Arc;

/// Stable index of a curve within a [`Model`].
///
/// A handle stays valid in every model derived from the one it was obtained
/// from: replacing a curve keeps its handle, and curves are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveHandle(usize);

impl CurveHandle {
    /// Create a handle for the arena slot `index`.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena slot of the curve.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CurveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable collection of named curves.
///
/// Every "modification" returns a new model. Curves are held behind `Arc`, so
/// a new model shares every curve it does not replace with its parent.
///
/// # Example
///
/// ```
/// use curve_core::market_data::{DiscountCurve, Model};
/// use std::collections::HashMap;
///
/// let curve = DiscountCurve::builder("discount")
///     .add_point(0.0, 1.0, false)
///     .add_point(1.0, 0.98, true)
///     .build()
///     .unwrap();
/// let model = Model::new().with_curve(curve);
/// let handle = model.handle("discount").unwrap();
///
/// let shifted = model
///     .clone_for_parameter(&HashMap::from([(handle, vec![0.97])]))
///     .unwrap();
/// assert!((model.discount_factor(handle, 1.0).unwrap() - 0.98).abs() < 1e-14);
/// assert!((shifted.discount_factor(handle, 1.0).unwrap() - 0.97).abs() < 1e-14);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Model {
    curves: Vec<Arc<Curve>>,
    index: Arc<HashMap<String, CurveHandle>>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the model has no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Return a model containing `curve`.
    ///
    /// A curve with the same name is replaced at the same handle; otherwise
    /// the curve is appended under a new handle.
    pub fn with_curve(&self, curve: impl Into<Curve>) -> Model {
        self.with_shared_curve(Arc::new(curve.into()))
    }

    /// Return a model containing all `curves`, applied in order.
    pub fn with_curves<I, C>(&self, curves: I) -> Model
    where
        I: IntoIterator<Item = C>,
        C: Into<Curve>,
    {
        curves
            .into_iter()
            .fold(self.clone(), |model, curve| model.with_curve(curve))
    }

    /// Return a model containing the shared `curve`.
    pub fn with_shared_curve(&self, curve: Arc<Curve>) -> Model {
        let mut curves = self.curves.clone();
        match self.index.get(curve.name()) {
            Some(handle) => {
                curves[handle.index()] = curve;
                Model {
                    curves,
                    index: Arc::clone(&self.index),
                }
            }
            None => {
                let mut index = (*self.index).clone();
                index.insert(curve.name().to_string(), CurveHandle(curves.len()));
                curves.push(curve);
                Model {
                    curves,
                    index: Arc::new(index),
                }
            }
        }
    }

    /// Handle of the curve called `name`.
    pub fn handle(&self, name: &str) -> Option<CurveHandle> {
        self.index.get(name).copied()
    }

    /// Handle of the curve called `name`, or [`MarketDataError::CurveNotFound`].
    pub fn require_handle(&self, name: &str) -> Result<CurveHandle, MarketDataError> {
        self.handle(name)
            .ok_or_else(|| MarketDataError::curve_not_found(name))
    }

    /// Curve called `name`.
    pub fn curve(&self, name: &str) -> Option<&Arc<Curve>> {
        self.handle(name).and_then(|h| self.curve_by_handle(h))
    }

    /// Curve at `handle`.
    pub fn curve_by_handle(&self, handle: CurveHandle) -> Option<&Arc<Curve>> {
        self.curves.get(handle.index())
    }

    /// All curves in handle order.
    pub fn curves(&self) -> impl Iterator<Item = (CurveHandle, &Arc<Curve>)> {
        self.curves
            .iter()
            .enumerate()
            .map(|(i, c)| (CurveHandle(i), c))
    }

    fn get(&self, handle: CurveHandle) -> Result<&Curve, MarketDataError> {
        self.curves
            .get(handle.index())
            .map(|c| c.as_ref())
            .ok_or(MarketDataError::UnknownHandle {
                index: handle.index(),
            })
    }

    /// Return a model where each listed curve is replaced by its clone for
    /// the given parameter. Unlisted curves are shared with `self`.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::UnknownHandle`] for a handle outside the model
    /// - [`MarketDataError::Parameter`] if a curve rejects its parameter
    pub fn clone_for_parameter(
        &self,
        parameters: &HashMap<CurveHandle, Vec<f64>>,
    ) -> Result<Model, MarketDataError> {
        let mut curves = self.curves.clone();
        for (handle, parameter) in parameters {
            let curve = self.get(*handle)?;
            let clone =
                curve
                    .clone_for_parameter(parameter)
                    .map_err(|source| MarketDataError::Parameter {
                        name: curve.name().to_string(),
                        source,
                    })?;
            curves[handle.index()] = Arc::new(clone);
        }
        Ok(Model {
            curves,
            index: Arc::clone(&self.index),
        })
    }

    /// Discount factor for time `t` on the discount curve at `handle`.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::UnknownHandle`] for a handle outside the model
    /// - [`MarketDataError::WrongCurveKind`] if the curve is not a discount curve
    /// - [`MarketDataError::InvalidMaturity`] for a negative time
    pub fn discount_factor(&self, handle: CurveHandle, t: f64) -> Result<f64, MarketDataError> {
        match self.get(handle)? {
            Curve::Discount(curve) => curve.discount_factor(t),
            other => Err(MarketDataError::WrongCurveKind {
                name: other.name().to_string(),
                expected: CurveKind::Discount.as_str(),
                actual: other.kind().as_str(),
            }),
        }
    }

    /// Forward rate fixing at `fixing_time` for a period of `period_length`
    /// years, read from the curve at `handle`.
    ///
    /// Point-based forward curves ignore `period_length`. Discount curves and
    /// derived curves imply the rate from discount factors; a derived curve
    /// falls back to its tenor when `period_length` is not positive.
    ///
    /// # Errors
    ///
    /// - [`MarketDataError::UnknownHandle`] for a handle outside the model
    /// - [`MarketDataError::InvalidMaturity`] for a negative fixing time or a
    ///   missing period length
    /// - [`MarketDataError::WrongCurveKind`] if a derived curve references a
    ///   curve that is not a discount curve
    pub fn forward(
        &self,
        handle: CurveHandle,
        fixing_time: f64,
        period_length: f64,
    ) -> Result<f64, MarketDataError> {
        match self.get(handle)? {
            Curve::Forward(curve) => curve.forward(fixing_time),
            Curve::Discount(_) => self.implied_forward(handle, fixing_time, period_length),
            Curve::ForwardFromDiscount(curve) => {
                let period_length = if period_length > 0.0 {
                    period_length
                } else {
                    curve.tenor().map_or(period_length, |t| t.period_years())
                };
                self.implied_forward(curve.discount_curve(), fixing_time, period_length)
            }
        }
    }

    fn implied_forward(
        &self,
        discount_curve: CurveHandle,
        fixing_time: f64,
        period_length: f64,
    ) -> Result<f64, MarketDataError> {
        if !period_length.is_finite() || period_length <= 0.0 {
            return Err(MarketDataError::InvalidMaturity { t: period_length });
        }
        let df_start = self.discount_factor(discount_curve, fixing_time)?;
        let df_end = self.discount_factor(discount_curve, fixing_time + period_length)?;
        Ok((df_start / df_end - 1.0) / period_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::curves::{
        DiscountCurve, ForwardCurve, ForwardCurveFromDiscountCurve, Tenor,
    };
    use approx::assert_relative_eq;

    fn discount() -> DiscountCurve {
        DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .add_point(1.0, 0.98, true)
            .add_point(2.0, 0.95, true)
            .build()
            .unwrap()
    }

    fn forward() -> ForwardCurve {
        ForwardCurve::builder("forward")
            .add_point(0.0, 0.0, false)
            .add_point(1.0, 0.03, true)
            .build()
            .unwrap()
    }

    fn model() -> Model {
        Model::new().with_curve(discount()).with_curve(forward())
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_handles_follow_insertion_order() {
        let model = model();
        assert_eq!(model.handle("discount"), Some(CurveHandle::new(0)));
        assert_eq!(model.handle("forward"), Some(CurveHandle::new(1)));
        assert_eq!(model.len(), 2);
        assert!(model.handle("missing").is_none());
    }

    #[test]
    fn test_with_curve_replaces_at_same_handle() {
        let model = model();
        let replacement = DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .build()
            .unwrap();
        let updated = model.with_curve(replacement);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated.handle("discount"), Some(CurveHandle::new(0)));
        assert_eq!(updated.curve("discount").unwrap().points().len(), 1);
        assert_eq!(model.curve("discount").unwrap().points().len(), 3);
    }

    #[test]
    fn test_require_handle_reports_name() {
        let err = model().require_handle("discount-USD").unwrap_err();
        assert_eq!(err, MarketDataError::curve_not_found("discount-USD"));
    }

    // ========================================
    // Clone For Parameter Tests
    // ========================================

    #[test]
    fn test_clone_shares_unlisted_curves() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let f = model.handle("forward").unwrap();
        let clone = model
            .clone_for_parameter(&HashMap::from([(d, vec![0.97, 0.93])]))
            .unwrap();

        assert!(Arc::ptr_eq(
            model.curve_by_handle(f).unwrap(),
            clone.curve_by_handle(f).unwrap()
        ));
        assert_eq!(
            clone.curve_by_handle(d).unwrap().parameter(),
            Some(vec![0.97, 0.93])
        );
        assert_eq!(
            model.curve_by_handle(d).unwrap().parameter(),
            Some(vec![0.98, 0.95])
        );
    }

    #[test]
    fn test_clone_unknown_handle() {
        let err = model()
            .clone_for_parameter(&HashMap::from([(CurveHandle::new(9), vec![1.0])]))
            .unwrap_err();
        assert_eq!(err, MarketDataError::UnknownHandle { index: 9 });
    }

    #[test]
    fn test_clone_wrong_length() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let err = model
            .clone_for_parameter(&HashMap::from([(d, vec![1.0])]))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Parameter { .. }));
    }

    // ========================================
    // Lookup Tests
    // ========================================

    #[test]
    fn test_discount_factor_wrong_kind() {
        let model = model();
        let f = model.handle("forward").unwrap();
        let err = model.discount_factor(f, 1.0).unwrap_err();
        assert!(matches!(err, MarketDataError::WrongCurveKind { .. }));
    }

    #[test]
    fn test_native_forward_ignores_period() {
        let model = model();
        let f = model.handle("forward").unwrap();
        assert_relative_eq!(model.forward(f, 1.0, 0.5).unwrap(), 0.03);
        assert_relative_eq!(model.forward(f, 0.5, 0.0).unwrap(), 0.015);
    }

    #[test]
    fn test_forward_from_discount() {
        let base = Model::new().with_curve(discount());
        let d = base.handle("discount").unwrap();
        let model = base.with_curve(ForwardCurveFromDiscountCurve::new(
            d,
            "discount",
            Some(Tenor::TwelveMonth),
        ));
        let w = model.handle("discount_from_discount").unwrap();

        let expected = (1.0 / 0.98 - 1.0) / 1.0;
        assert_relative_eq!(model.forward(w, 0.0, 1.0).unwrap(), expected, epsilon = 1e-14);
        // tenor fallback
        assert_relative_eq!(model.forward(w, 0.0, 0.0).unwrap(), expected, epsilon = 1e-14);
        // single-curve read of the discount curve itself
        assert_relative_eq!(model.forward(d, 0.0, 1.0).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_derived_forward_sees_cloned_discount() {
        let base = Model::new().with_curve(discount());
        let d = base.handle("discount").unwrap();
        let model = base.with_curve(ForwardCurveFromDiscountCurve::new(d, "discount", None));
        let w = model.handle("discount_from_discount").unwrap();

        let clone = model
            .clone_for_parameter(&HashMap::from([(d, vec![0.96, 0.92])]))
            .unwrap();
        let expected = (1.0 / 0.96 - 1.0) / 1.0;
        assert_relative_eq!(clone.forward(w, 0.0, 1.0).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_derived_forward_without_period() {
        let base = Model::new().with_curve(discount());
        let d = base.handle("discount").unwrap();
        let model = base.with_curve(ForwardCurveFromDiscountCurve::new(d, "discount", None));
        let w = model.handle("discount_from_discount").unwrap();
        assert!(model.forward(w, 0.0, 0.0).is_err());
    }
}
