//! Swap legs, with optional notional exchange and notional reset.

use super::discounting;
use crate::schedules::Schedule;
use curve_core::market_data::{CurveHandle, Model};
use curve_core::traits::AnalyticProduct;
use curve_core::types::PricingError;

/// One leg of a swap.
///
/// Each period pays `(F_i + s) τ_i N_i` at its payment time, where `F_i` is
/// the forward from the leg's forward curve (zero for a fixed leg) and `s`
/// the spread or fixed rate. Periods paying before the evaluation time are
/// skipped.
///
/// With notional exchange the leg also pays `-N_i` at each period start and
/// receives `N_i` at each period end. With a reset curve the notional of a
/// period is `N_i = df_reset(start) / df(start)`, otherwise 1.
///
/// # Examples
///
/// ```
/// use curve_core::market_data::{DiscountCurve, Model};
/// use curve_core::traits::AnalyticProduct;
/// use curve_products::instruments::SwapLeg;
/// use curve_products::schedules::{Frequency, ScheduleBuilder};
///
/// let curve = DiscountCurve::builder("discount")
///     .add_point(0.0, 1.0, false)
///     .add_point(5.0, 0.9, true)
///     .build()
///     .unwrap();
/// let model = Model::new().with_curve(curve);
/// let discount = model.handle("discount").unwrap();
///
/// let schedule = ScheduleBuilder::new()
///     .start(0.0)
///     .end(5.0)
///     .frequency(Frequency::Annual)
///     .build()
///     .unwrap();
///
/// // A floating leg on its own discount curve with notional exchange is worth zero
/// let leg = SwapLeg::new(schedule, Some(discount), 0.0, discount).with_notional_exchange(true);
/// assert!(leg.value(0.0, &model).unwrap().abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SwapLeg {
    schedule: Schedule,
    forward_curve: Option<CurveHandle>,
    spread: f64,
    discount_curve: CurveHandle,
    notional_reset_curve: Option<CurveHandle>,
    notional_exchange: bool,
}

impl SwapLeg {
    /// Create a leg without notional exchange or reset.
    ///
    /// `forward_curve` is `None` for a fixed leg paying `spread`.
    pub fn new(
        schedule: Schedule,
        forward_curve: Option<CurveHandle>,
        spread: f64,
        discount_curve: CurveHandle,
    ) -> Self {
        Self {
            schedule,
            forward_curve,
            spread,
            discount_curve,
            notional_reset_curve: None,
            notional_exchange: false,
        }
    }

    /// Exchange notionals at period start and end.
    pub fn with_notional_exchange(mut self, notional_exchange: bool) -> Self {
        self.notional_exchange = notional_exchange;
        self
    }

    /// Reset the notional of every period against `curve`.
    pub fn with_notional_reset(mut self, curve: CurveHandle) -> Self {
        self.notional_reset_curve = Some(curve);
        self
    }

    /// Leg schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Forward curve handle, `None` for a fixed leg.
    pub fn forward_curve(&self) -> Option<CurveHandle> {
        self.forward_curve
    }

    /// Spread over the index, or the fixed rate.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Discount curve handle.
    pub fn discount_curve(&self) -> CurveHandle {
        self.discount_curve
    }

    /// Notional reset curve handle.
    pub fn notional_reset_curve(&self) -> Option<CurveHandle> {
        self.notional_reset_curve
    }

    /// Whether notionals are exchanged.
    pub fn has_notional_exchange(&self) -> bool {
        self.notional_exchange
    }
}

impl AnalyticProduct for SwapLeg {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        let mut value = 0.0;
        for period in self.schedule.iter() {
            if period.payment() < evaluation_time {
                continue;
            }

            let notional = match self.notional_reset_curve {
                Some(reset) => {
                    let df_reset = model.discount_factor(reset, period.start())?;
                    let df = model.discount_factor(self.discount_curve, period.start())?;
                    df_reset / df
                }
                None => 1.0,
            };

            let forward = match self.forward_curve {
                Some(curve) => model.forward(curve, period.fixing(), period.length())?,
                None => 0.0,
            };

            let df_payment = model.discount_factor(self.discount_curve, period.payment())?;
            value += (forward + self.spread) * period.length() * notional * df_payment;

            if self.notional_exchange {
                if period.start() >= evaluation_time {
                    value -= notional * model.discount_factor(self.discount_curve, period.start())?;
                }
                value += notional * model.discount_factor(self.discount_curve, period.end())?;
            }
        }

        Ok(value / discounting(model, self.discount_curve, evaluation_time)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedules::{Frequency, ScheduleBuilder};
    use approx::assert_relative_eq;
    use curve_core::market_data::DiscountCurve;

    fn model() -> Model {
        let discount = DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .add_point(2.0, 0.96, true)
            .build()
            .unwrap();
        let reset = DiscountCurve::builder("reset")
            .add_point(0.0, 1.0, false)
            .add_point(2.0, 0.98, true)
            .build()
            .unwrap();
        Model::new().with_curve(discount).with_curve(reset)
    }

    fn schedule() -> Schedule {
        ScheduleBuilder::new()
            .start(0.0)
            .end(2.0)
            .frequency(Frequency::Annual)
            .build()
            .unwrap()
    }

    #[test]
    fn test_fixed_leg_annuity() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let leg = SwapLeg::new(schedule(), None, 0.05, d);
        let df1 = model.discount_factor(d, 1.0).unwrap();
        let df2 = model.discount_factor(d, 2.0).unwrap();
        assert_relative_eq!(
            leg.value(0.0, &model).unwrap(),
            0.05 * (df1 + df2),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_notional_exchange_telescopes() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let fixed = SwapLeg::new(schedule(), None, 0.0, d).with_notional_exchange(true);
        // Σ df(end_i) - df(start_i) telescopes to df(2) - df(0)
        assert_relative_eq!(fixed.value(0.0, &model).unwrap(), 0.96 - 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_notional_reset_scales_periods() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let r = model.handle("reset").unwrap();
        let plain = SwapLeg::new(schedule(), None, 0.05, d);
        let reset = plain.clone().with_notional_reset(r);

        let n1 = model.discount_factor(r, 1.0).unwrap() / model.discount_factor(d, 1.0).unwrap();
        let df1 = model.discount_factor(d, 1.0).unwrap();
        let df2 = model.discount_factor(d, 2.0).unwrap();
        // First period starts at 0 where both curves are 1
        assert_relative_eq!(
            reset.value(0.0, &model).unwrap(),
            0.05 * (df1 + n1 * df2),
            epsilon = 1e-14
        );
        assert!(reset.value(0.0, &model).unwrap() > plain.value(0.0, &model).unwrap());
    }

    #[test]
    fn test_past_periods_skipped() {
        let model = model();
        let d = model.handle("discount").unwrap();
        let leg = SwapLeg::new(schedule(), None, 0.05, d);
        let df1 = model.discount_factor(d, 1.5).unwrap();
        let df2 = model.discount_factor(d, 2.0).unwrap();
        assert_relative_eq!(
            leg.value(1.5, &model).unwrap(),
            0.05 * df2 / df1,
            epsilon = 1e-14
        );
    }
}
