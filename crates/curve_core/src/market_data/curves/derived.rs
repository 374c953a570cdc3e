//! Forward curve implied by a discount curve.

use super::tenor::Tenor;
use crate::market_data::model::CurveHandle;

/// Forward curve with no points of its own, implied by a discount curve.
///
/// The forward rate for a fixing time `t` and period length `Δ` is
/// `(df(t) / df(t + Δ) - 1) / Δ`, where `df` is the referenced discount
/// curve. The discount curve is looked up in the model the forward is
/// requested from, so a wrapper stored in a calibrated model sees the
/// calibrated discount curve.
///
/// The wrapper has no free parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardCurveFromDiscountCurve {
    name: String,
    discount_curve: CurveHandle,
    discount_curve_name: String,
    tenor: Option<Tenor>,
}

impl ForwardCurveFromDiscountCurve {
    /// Wrap the discount curve `discount_curve_name` living at `discount_curve`.
    ///
    /// The wrapper is named `"<discount_curve_name>_from_discount"`.
    pub fn new(
        discount_curve: CurveHandle,
        discount_curve_name: impl Into<String>,
        tenor: Option<Tenor>,
    ) -> Self {
        let discount_curve_name = discount_curve_name.into();
        Self {
            name: Self::wrapper_name(&discount_curve_name),
            discount_curve,
            discount_curve_name,
            tenor,
        }
    }

    /// Name given to the wrapper of the discount curve `discount_curve_name`.
    pub fn wrapper_name(discount_curve_name: &str) -> String {
        format!("{}_from_discount", discount_curve_name)
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the referenced discount curve.
    pub fn discount_curve(&self) -> CurveHandle {
        self.discount_curve
    }

    /// Name of the referenced discount curve.
    pub fn discount_curve_name(&self) -> &str {
        &self.discount_curve_name
    }

    /// Index tenor, used as period length when the caller supplies none.
    pub fn tenor(&self) -> Option<Tenor> {
        self.tenor
    }
}
