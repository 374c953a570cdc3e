//! Bump-and-revalue sensitivities to calibration quotes.
//!
//! For each symbol the calibration is redone with that quote shifted, and
//! the valuation repeated on the recalibrated model:
//!
//! ```text
//! dV/dq ≈ (V(model shifted by q + h) - V(model)) / h
//! ```
//!
//! Shifted recalibrations are independent and run on rayon when the
//! `parallel` feature is enabled. With a `max_threads` budget in the
//! calibration config they run on a pool of that size, and each
//! recalibration computes its Jacobian on the same pool.
//!
//! Shifts are in quote units. Rate quotes (deposits, FRAs, swaps) move by
//! `shift` in rate, while a future quote is a price, so a shift of `0.01`
//! moves its implied rate by one basis point and [`DEFAULT_SHIFT`] by
//! `1e-6`. Sensitivities to future quotes are per price point.

use super::calibrated_curves::CalibratedCurves;
use crate::error::OptimiserError;
use curve_core::market_data::Model;
use curve_core::types::PricingError;
use tracing::debug;

/// Default shift, one basis point of a rate quote.
pub const DEFAULT_SHIFT: f64 = 0.0001;

/// First-order sensitivities of a valuation to calibration quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSensitivities {
    shift: f64,
    base_value: f64,
    sensitivities: Vec<(String, f64)>,
}

impl QuoteSensitivities {
    /// Sensitivities of `valuation` to the quotes of `symbols`.
    ///
    /// Each entry is the change in `valuation` per unit of the symbol's
    /// quote; see the module documentation for future prices.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::Configuration`] for a zero or non-finite shift or
    ///   a symbol no spec of `base` carries
    /// - Any error of a shifted recalibration or of `valuation`
    pub fn compute<S, F>(
        base: &CalibratedCurves,
        symbols: &[S],
        shift: f64,
        valuation: F,
    ) -> Result<Self, OptimiserError>
    where
        S: AsRef<str> + Sync,
        F: Fn(&Model) -> Result<f64, PricingError> + Sync,
    {
        if !shift.is_finite() || shift == 0.0 {
            return Err(OptimiserError::configuration(
                "shift",
                format!("shift must be finite and non-zero, got {}", shift),
            ));
        }
        if let Some(unknown) = symbols
            .iter()
            .map(AsRef::as_ref)
            .find(|s| base.specs().iter().all(|spec| spec.symbol != *s))
        {
            return Err(OptimiserError::configuration(
                "symbols",
                format!("no calibration spec for symbol {}", unknown),
            ));
        }

        let base_value = valuation(base.model())?;
        debug!(symbols = symbols.len(), shift, base_value, "Computing quote sensitivities");

        let bump = |symbol: &str| -> Result<(String, f64), OptimiserError> {
            let shifted = base.clone_shifted(symbol, shift)?;
            let value = valuation(shifted.model())?;
            Ok((symbol.to_string(), (value - base_value) / shift))
        };
        let sensitivities = bump_all(symbols, base.config().max_threads, bump)?;

        Ok(Self {
            shift,
            base_value,
            sensitivities,
        })
    }

    /// Sensitivities of `valuation` to every calibration quote of `base`.
    ///
    /// # Errors
    ///
    /// As [`compute`](Self::compute).
    pub fn compute_all<F>(base: &CalibratedCurves, shift: f64, valuation: F) -> Result<Self, OptimiserError>
    where
        F: Fn(&Model) -> Result<f64, PricingError> + Sync,
    {
        let symbols: Vec<&str> = base.specs().iter().map(|s| s.symbol.as_str()).collect();
        Self::compute(base, &symbols, shift, valuation)
    }

    /// Sensitivity to the quote of `symbol`.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.sensitivities
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, v)| *v)
    }

    /// Symbols and sensitivities, in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.sensitivities.iter().map(|(s, v)| (s.as_str(), *v))
    }

    /// Valuation on the unshifted model.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Quote shift.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Number of sensitivities.
    pub fn len(&self) -> usize {
        self.sensitivities.len()
    }

    /// Whether there are no sensitivities.
    pub fn is_empty(&self) -> bool {
        self.sensitivities.is_empty()
    }
}

#[cfg(feature = "parallel")]
fn bump_all<S, B>(
    symbols: &[S],
    max_threads: Option<usize>,
    bump: B,
) -> Result<Vec<(String, f64)>, OptimiserError>
where
    S: AsRef<str> + Sync,
    B: Fn(&str) -> Result<(String, f64), OptimiserError> + Sync,
{
    use curve_core::types::SolverError;
    use rayon::prelude::*;

    let run = || symbols.par_iter().map(|s| bump(s.as_ref())).collect();
    match max_threads {
        Some(max_threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads.max(1))
            .thread_name(|i| format!("quote-bump-{}", i))
            .build()
            .map_err(|e| SolverError::ThreadPool(e.to_string()))?
            .install(run),
        None => run(),
    }
}

#[cfg(not(feature = "parallel"))]
fn bump_all<S, B>(
    symbols: &[S],
    _max_threads: Option<usize>,
    bump: B,
) -> Result<Vec<(String, f64)>, OptimiserError>
where
    S: AsRef<str> + Sync,
    B: Fn(&str) -> Result<(String, f64), OptimiserError> + Sync,
{
    symbols.iter().map(|s| bump(s.as_ref())).collect()
}
