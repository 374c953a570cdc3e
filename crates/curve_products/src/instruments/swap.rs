//! Two-leg swaps.

use super::swap_leg::SwapLeg;
use curve_core::market_data::Model;
use curve_core::traits::AnalyticProduct;
use curve_core::types::PricingError;

/// A swap: value of the receiver leg minus value of the payer leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    receiver: SwapLeg,
    payer: SwapLeg,
}

impl Swap {
    /// Create a swap from its two legs.
    pub fn new(receiver: SwapLeg, payer: SwapLeg) -> Self {
        Self { receiver, payer }
    }

    /// Received leg.
    pub fn receiver(&self) -> &SwapLeg {
        &self.receiver
    }

    /// Paid leg.
    pub fn payer(&self) -> &SwapLeg {
        &self.payer
    }
}

impl AnalyticProduct for Swap {
    fn value(&self, evaluation_time: f64, model: &Model) -> Result<f64, PricingError> {
        Ok(self.receiver.value(evaluation_time, model)? - self.payer.value(evaluation_time, model)?)
    }
}
