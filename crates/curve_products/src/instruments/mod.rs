//! Linear rates products used as calibration instruments.
//!
//! This module provides:
//! - [`Deposit`]: Money-market deposit
//! - [`ForwardRateAgreement`]: FRA on a forward curve
//! - [`Future`]: Interest rate future (undiscounted FRA quoted as a price)
//! - [`SwapLeg`]: Swap leg with optional notional exchange and reset
//! - [`Swap`]: Receiver leg minus payer leg
//! - [`Product`]: Static dispatch enum over all of the above
//!
//! Discounted products are normalised by the discount factor at the
//! evaluation time, so their values are forward values as seen from that
//! time.

mod deposit;
mod fra;
mod swap;
mod swap_leg;

pub use deposit::Deposit;
pub use fra::{ForwardRateAgreement, Future};
pub use swap::Swap;
pub use swap_leg::SwapLeg;

use curve_core::market_data::{CurveHandle, Model};
use curve_core::traits::AnalyticProduct;
use curve_core::types::PricingError;

/// Static dispatch enum over the calibration products.
///
/// # Example
///
/// ```
/// use curve_core::market_data::{DiscountCurve, Model};
/// use curve_core::traits::AnalyticProduct;
/// use curve_products::instruments::{Deposit, Product};
/// use curve_products::schedules::Period;
///
/// let model = Model::new().with_curve(DiscountCurve::unit("discount"));
/// let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.0, model.handle("discount").unwrap());
///
/// let product = Product::from(deposit);
/// assert_eq!(product.name(), "Deposit");
/// assert!(product.value(0.0, &model).unwrap().abs() < 1e-14);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
    /// Money-market deposit
    Deposit(Deposit),
    /// Forward rate agreement
    Fra(ForwardRateAgreement),
    /// Interest rate future
    Future(Future),
    /// Single swap leg
    SwapLeg(SwapLeg),
    /// Two-leg swap
    Swap(Swap),
}

impl Product {
    /// Product family name.
    pub fn name(&self) -> &'static str {
        match self {
            Product::Deposit(_) => "Deposit",
            Product::Fra(_) => "ForwardRateAgreement",
            Product::Future(_) => "Future",
            Product::SwapLeg(_) => "SwapLeg",
            Product::Swap(_) => "Swap",
        }
    }
}

impl AnalyticProduct for Product {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        match self {
            Product::Deposit(p) => p.value(evaluation_time, model),
            Product::Fra(p) => p.value(evaluation_time, model),
            Product::Future(p) => p.value(evaluation_time, model),
            Product::SwapLeg(p) => p.value(evaluation_time, model),
            Product::Swap(p) => p.value(evaluation_time, model),
        }
    }
}

impl From<Deposit> for Product {
    fn from(p: Deposit) -> Self {
        Product::Deposit(p)
    }
}

impl From<ForwardRateAgreement> for Product {
    fn from(p: ForwardRateAgreement) -> Self {
        Product::Fra(p)
    }
}

impl From<Future> for Product {
    fn from(p: Future) -> Self {
        Product::Future(p)
    }
}

impl From<SwapLeg> for Product {
    fn from(p: SwapLeg) -> Self {
        Product::SwapLeg(p)
    }
}

impl From<Swap> for Product {
    fn from(p: Swap) -> Self {
        Product::Swap(p)
    }
}

/// Discount factor at the evaluation time, used to normalise product values.
fn discounting(
    model: &Model,
    discount_curve: CurveHandle,
    evaluation_time: f64,
) -> Result<f64, PricingError> {
    let df = model.discount_factor(discount_curve, evaluation_time)?;
    if !df.is_finite() || df <= 0.0 {
        return Err(PricingError::NumericalInstability(format!(
            "discount factor {} at evaluation time {}",
            df, evaluation_time
        )));
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedules::Period;
    use curve_core::market_data::DiscountCurve;

    #[test]
    fn test_product_dispatch_matches_inner() {
        let curve = DiscountCurve::builder("discount")
            .add_point(0.0, 1.0, false)
            .add_point(1.0, 0.97, true)
            .build()
            .unwrap();
        let model = Model::new().with_curve(curve);
        let d = model.handle("discount").unwrap();
        let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.01, d);
        let product = Product::from(deposit.clone());
        assert_eq!(
            product.value(0.0, &model).unwrap(),
            deposit.value(0.0, &model).unwrap()
        );
    }

    #[test]
    fn test_unknown_handle_is_pricing_error() {
        let model = Model::new();
        let deposit = Deposit::new(Period::from_times(0.0, 1.0), 0.01, CurveHandle::new(0));
        assert!(matches!(
            deposit.value(0.0, &model),
            Err(PricingError::MarketData(_))
        ));
    }

    #[test]
    fn test_names() {
        let model = Model::new().with_curve(DiscountCurve::unit("discount"));
        let d = model.handle("discount").unwrap();
        let fut = Future::new(Period::from_times(0.0, 0.25), 99.0, d);
        assert_eq!(Product::from(fut).name(), "Future");
    }
}
