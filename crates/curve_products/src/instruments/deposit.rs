//! Money-market deposit.

use super::discounting;
use crate::schedules::Period;
use curve_core::market_data::{CurveHandle, Model};
use curve_core::traits::AnalyticProduct;
use curve_core::types::PricingError;

/// A deposit: pay 1 at start, receive `1 + r τ` at end.
///
/// Value at evaluation time `t_e`:
///
/// ```text
/// (df(end) (1 + r τ) - df(start)) / df(t_e)
/// ```
///
/// A deposit quoted at its market rate has value zero.
///
/// # Examples
///
/// ```
/// use curve_core::market_data::{DiscountCurve, Model};
/// use curve_core::traits::AnalyticProduct;
/// use curve_products::instruments::Deposit;
/// use curve_products::schedules::Period;
///
/// let curve = DiscountCurve::builder("discount")
///     .add_point(0.0, 1.0, false)
///     .add_point(1.0, 1.0 / 1.02, true)
///     .build()
///     .unwrap();
/// let model = Model::new().with_curve(curve);
///
/// let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.02, model.handle("discount").unwrap());
/// assert!(deposit.value(0.0, &model).unwrap().abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    period: Period,
    rate: f64,
    discount_curve: CurveHandle,
}

impl Deposit {
    /// Create a deposit over `period` at `rate`.
    pub fn new(period: Period, rate: f64, discount_curve: CurveHandle) -> Self {
        Self {
            period,
            rate,
            discount_curve,
        }
    }

    /// Accrual period.
    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Deposit rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Discount curve handle.
    pub fn discount_curve(&self) -> CurveHandle {
        self.discount_curve
    }
}

impl AnalyticProduct for Deposit {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        if evaluation_time > self.period.end() {
            return Ok(0.0);
        }
        let df_end = model.discount_factor(self.discount_curve, self.period.end())?;
        let mut value = df_end * (1.0 + self.rate * self.period.length());
        if evaluation_time <= self.period.start() {
            value -= model.discount_factor(self.discount_curve, self.period.start())?;
        }
        Ok(value / discounting(model, self.discount_curve, evaluation_time)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use curve_core::market_data::DiscountCurve;

    fn model() -> Model {
        let curve = DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .add_point(1.0, 0.95, true)
            .build()
            .unwrap();
        Model::new().with_curve(curve)
    }

    #[test]
    fn test_value_formula() {
        let model = model();
        let h = model.handle("discount").unwrap();
        let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.03, h);
        assert_relative_eq!(
            deposit.value(0.0, &model).unwrap(),
            0.95 * 1.03 - 1.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_par_rate_gives_zero() {
        let model = model();
        let h = model.handle("discount").unwrap();
        let par = 1.0 / 0.95 - 1.0;
        let deposit = Deposit::new(Period::from_times(0.0, 1.0), par, h);
        assert_relative_eq!(deposit.value(0.0, &model).unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_expired_deposit_is_worthless() {
        let model = model();
        let h = model.handle("discount").unwrap();
        let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.03, h);
        assert_eq!(deposit.value(2.0, &model).unwrap(), 0.0);
    }
}
