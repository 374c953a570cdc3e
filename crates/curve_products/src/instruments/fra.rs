//! Forward rate agreements and interest rate futures.

use super::discounting;
use crate::schedules::Period;
use curve_core::market_data::{CurveHandle, Model};
use curve_core::traits::AnalyticProduct;
use curve_core::types::PricingError;

/// A forward rate agreement receiving the index rate against `strike`.
///
/// Value at evaluation time `t_e`:
///
/// ```text
/// (F(fixing, τ) - K) τ df(payment) / df(t_e)
/// ```
///
/// # Examples
///
/// ```
/// use curve_core::market_data::{DiscountCurve, ForwardCurve, Model};
/// use curve_core::traits::AnalyticProduct;
/// use curve_products::instruments::ForwardRateAgreement;
/// use curve_products::schedules::Period;
///
/// let model = Model::new()
///     .with_curve(DiscountCurve::unit("discount"))
///     .with_curve(
///         ForwardCurve::builder("forward")
///             .add_point(0.0, 0.03, false)
///             .build()
///             .unwrap(),
///     );
///
/// let fra = ForwardRateAgreement::new(
///     Period::from_times(1.0, 1.5),
///     0.03,
///     model.handle("forward").unwrap(),
///     model.handle("discount").unwrap(),
/// );
/// assert!(fra.value(0.0, &model).unwrap().abs() < 1e-14);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRateAgreement {
    period: Period,
    strike: f64,
    forward_curve: CurveHandle,
    discount_curve: CurveHandle,
}

impl ForwardRateAgreement {
    /// Create an FRA over `period` struck at `strike`.
    pub fn new(
        period: Period,
        strike: f64,
        forward_curve: CurveHandle,
        discount_curve: CurveHandle,
    ) -> Self {
        Self {
            period,
            strike,
            forward_curve,
            discount_curve,
        }
    }

    /// Accrual period.
    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Fixed rate.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Forward curve handle.
    pub fn forward_curve(&self) -> CurveHandle {
        self.forward_curve
    }

    /// Discount curve handle.
    pub fn discount_curve(&self) -> CurveHandle {
        self.discount_curve
    }
}

impl AnalyticProduct for ForwardRateAgreement {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        if evaluation_time > self.period.payment() {
            return Ok(0.0);
        }
        let forward = model.forward(
            self.forward_curve,
            self.period.fixing(),
            self.period.length(),
        )?;
        let df = model.discount_factor(self.discount_curve, self.period.payment())?;
        let value = (forward - self.strike) * self.period.length() * df;
        Ok(value / discounting(model, self.discount_curve, evaluation_time)?)
    }
}

/// An interest rate future, valued as an undiscounted FRA.
///
/// The quote is a price; the implied rate is `1 - price / 100`. Value:
///
/// ```text
/// (F(fixing, τ) - (1 - price / 100)) τ
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Future {
    period: Period,
    price: f64,
    forward_curve: CurveHandle,
}

impl Future {
    /// Create a future over `period` quoted at `price` (e.g. `97.5`).
    pub fn new(period: Period, price: f64, forward_curve: CurveHandle) -> Self {
        Self {
            period,
            price,
            forward_curve,
        }
    }

    /// Create a future from its implied rate.
    pub fn from_rate(period: Period, rate: f64, forward_curve: CurveHandle) -> Self {
        Self::new(period, 100.0 * (1.0 - rate), forward_curve)
    }

    /// Accrual period.
    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Quoted price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Implied rate `1 - price / 100`.
    pub fn rate(&self) -> f64 {
        1.0 - self.price / 100.0
    }

    /// Forward curve handle.
    pub fn forward_curve(&self) -> CurveHandle {
        self.forward_curve
    }
}

impl AnalyticProduct for Future {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        if evaluation_time > self.period.fixing() {
            return Ok(0.0);
        }
        let forward = model.forward(
            self.forward_curve,
            self.period.fixing(),
            self.period.length(),
        )?;
        Ok((forward - self.rate()) * self.period.length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use curve_core::market_data::{DiscountCurve, ForwardCurve};

    fn model() -> Model {
        let discount = DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .add_point(2.0, 0.9, true)
            .build()
            .unwrap();
        let forward = ForwardCurve::builder("forward")
            .add_point(0.0, 0.02, false)
            .add_point(2.0, 0.04, true)
            .build()
            .unwrap();
        Model::new().with_curve(discount).with_curve(forward)
    }

    #[test]
    fn test_fra_value() {
        let model = model();
        let fra = ForwardRateAgreement::new(
            Period::from_times(1.0, 2.0),
            0.025,
            model.handle("forward").unwrap(),
            model.handle("discount").unwrap(),
        );
        // F(1.0) = 0.03 on the linear forward curve
        assert_relative_eq!(
            fra.value(0.0, &model).unwrap(),
            (0.03 - 0.025) * 1.0 * 0.9,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_fra_normalised_by_evaluation_discount() {
        let model = model();
        let fra = ForwardRateAgreement::new(
            Period::from_times(1.0, 2.0),
            0.025,
            model.handle("forward").unwrap(),
            model.handle("discount").unwrap(),
        );
        let df_half = 0.9_f64.powf(0.25);
        assert_relative_eq!(
            fra.value(0.5, &model).unwrap(),
            0.005 * 0.9 / df_half,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_future_is_undiscounted() {
        let model = model();
        let future = Future::new(Period::from_times(1.0, 1.25), 97.0, model.handle("forward").unwrap());
        assert_relative_eq!(future.rate(), 0.03, epsilon = 1e-14);
        assert_relative_eq!(future.value(0.0, &model).unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_future_from_rate() {
        let model = model();
        let h = model.handle("forward").unwrap();
        let future = Future::from_rate(Period::from_times(1.0, 1.25), 0.031, h);
        assert_relative_eq!(future.price(), 96.9, epsilon = 1e-12);
        assert_relative_eq!(
            future.value(0.0, &model).unwrap(),
            -0.001 * 0.25,
            epsilon = 1e-14
        );
    }
}
