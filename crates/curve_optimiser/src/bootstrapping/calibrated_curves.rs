//! Joint calibration of curves from declarative calibration specs.
//!
//! Specs are processed strictly in order. Each one makes sure the curves it
//! references exist, turns itself into a product, and adds exactly one free
//! point to its calibration curve. All products are then repriced to zero in
//! a single joint least-squares solve.

use super::calibration_spec::{CalibrationSpec, LegSpec, ProductType};
use super::config::{CalibrationConfig, ForwardCurveMode};
use crate::calibration::{CalibrationDiagnostics, CurveAggregation, Solver};
use crate::error::OptimiserError;
use curve_core::market_data::{
    Curve, CurveHandle, CurveKind, DiscountCurve, ForwardCurve, ForwardCurveFromDiscountCurve,
    Model, Tenor,
};
use curve_core::traits::ParameterObject;
use curve_products::instruments::{
    Deposit, ForwardRateAgreement, Future, Product, Swap, SwapLeg,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seed of a new discount curve point.
const DISCOUNT_SEED: f64 = 1.0;
/// Seed of a new forward curve point.
const FORWARD_SEED: f64 = 0.1;

/// Curves calibrated jointly to a list of calibration specs.
///
/// Construction either fully succeeds or fails; there are no partial
/// results. The calibrated state is immutable: shifted recalibrations
/// ([`clone_shifted`](Self::clone_shifted) and friends) return new instances
/// built from the same initial model.
///
/// # Example
///
/// ```
/// use curve_core::market_data::Model;
/// use curve_optimiser::bootstrapping::{
///     CalibratedCurves, CalibrationConfig, CalibrationSpec, LegSpec,
/// };
/// use curve_products::schedules::Schedule;
///
/// let deposit = |symbol: &str, end: f64, rate: f64| {
///     CalibrationSpec::new(
///         symbol,
///         "deposit",
///         LegSpec::fixed(Schedule::single(0.0, end).unwrap(), rate, "discount"),
///         "discount",
///         end,
///     )
/// };
/// let specs = vec![deposit("DEPO-1Y", 1.0, 0.02), deposit("DEPO-2Y", 2.0, 0.025)];
///
/// let curves = CalibratedCurves::new(specs, &Model::new(), CalibrationConfig::default()).unwrap();
/// let discount = curves.model().handle("discount").unwrap();
/// let df = curves.model().discount_factor(discount, 2.0).unwrap();
/// assert!((df - 1.0 / 1.05).abs() < 1e-8);
///
/// let bumped = curves.clone_shifted("DEPO-2Y", 0.0001).unwrap();
/// let df_1y = bumped.model().discount_factor(discount, 1.0).unwrap();
/// assert!((df_1y - 1.0 / 1.02).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct CalibratedCurves {
    specs: Vec<CalibrationSpec>,
    config: CalibrationConfig,
    initial_model: Model,
    model: Model,
    symbols: Vec<String>,
    products: Vec<Product>,
    diagnostics: CalibrationDiagnostics,
}

impl CalibratedCurves {
    /// Calibrate `specs` starting from `model`.
    ///
    /// # Errors
    ///
    /// - [`OptimiserError::Configuration`] for an unknown product type, a
    ///   missing leg or curve, a calibration curve that does not exist or
    ///   has no points, a forward curve no spec calibrates, or a system that
    ///   is not square; raised before any optimiser work
    /// - [`OptimiserError::Solver`] when the joint solve fails
    pub fn new(
        specs: Vec<CalibrationSpec>,
        model: &Model,
        config: CalibrationConfig,
    ) -> Result<Self, OptimiserError> {
        if specs.is_empty() {
            return Err(OptimiserError::configuration("specs", "no calibration specs"));
        }
        info!(specs = specs.len(), "Assembling calibration");

        let mut assembly = Assembly::new(model.clone(), &config);
        for (index, spec) in specs.iter().enumerate() {
            assembly.add(index, spec)?;
        }

        let Assembly {
            model: assembled,
            to_calibrate,
            symbols,
            products,
            ..
        } = assembly;

        if let Some((_, empty)) = assembled
            .curves()
            .find(|(_, curve)| curve.is_point_curve() && curve.points().is_empty())
        {
            return Err(OptimiserError::configuration(
                "specs",
                format!("curve {} is referenced but no spec calibrates it", empty.name()),
            ));
        }

        let parameter_count = to_calibrate.parameter_len();
        if parameter_count != products.len() {
            return Err(OptimiserError::configuration(
                "specs",
                format!(
                    "{} free parameters for {} products",
                    parameter_count,
                    products.len()
                ),
            ));
        }

        let mut solver = Solver::new(assembled, products.clone())
            .with_evaluation_time(config.evaluation_time)
            .with_accuracy(config.accuracy)
            .with_max_iterations(config.max_iterations);
        if let Some(max_threads) = config.max_threads {
            solver = solver.with_max_threads(max_threads);
        }
        let outcome = solver.solve_aggregation(&to_calibrate)?;

        Ok(Self {
            specs,
            config,
            initial_model: model.clone(),
            model: outcome.model,
            symbols,
            products,
            diagnostics: outcome.diagnostics,
        })
    }

    /// Calibrated model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Calibrated curve called `name`.
    pub fn curve(&self, name: &str) -> Option<&Arc<Curve>> {
        self.model.curve(name)
    }

    /// Diagnostics of the joint solve.
    pub fn diagnostics(&self) -> &CalibrationDiagnostics {
        &self.diagnostics
    }

    /// Iterations of the joint solve.
    pub fn last_iterations(&self) -> usize {
        self.diagnostics.iterations
    }

    /// Root mean square residual of the joint solve.
    pub fn last_accuracy(&self) -> f64 {
        self.diagnostics.accuracy
    }

    /// Calibration specs, in processing order.
    pub fn specs(&self) -> &[CalibrationSpec] {
        &self.specs
    }

    /// Model the calibration started from.
    pub fn initial_model(&self) -> &Model {
        &self.initial_model
    }

    /// Configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Product built for `symbol`.
    pub fn product_for_symbol(&self, symbol: &str) -> Option<&Product> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| &self.products[i])
    }

    /// Products, in spec order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Recalibrate with the quote of `symbol` bumped by `shift`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn clone_shifted(&self, symbol: &str, shift: f64) -> Result<Self, OptimiserError> {
        self.clone_shifted_matching(|s| s == symbol, shift)
    }

    /// Recalibrate with the quotes of all symbols accepted by `predicate`
    /// bumped by `shift`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn clone_shifted_matching<F>(&self, predicate: F, shift: f64) -> Result<Self, OptimiserError>
    where
        F: Fn(&str) -> bool,
    {
        self.recalibrate(|spec| predicate(&spec.symbol).then_some(shift))
    }

    /// Recalibrate with each symbol of `shifts` bumped by its shift.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn clone_shifted_map(&self, shifts: &HashMap<String, f64>) -> Result<Self, OptimiserError> {
        self.recalibrate(|spec| shifts.get(&spec.symbol).copied())
    }

    fn recalibrate<F>(&self, shift_for: F) -> Result<Self, OptimiserError>
    where
        F: Fn(&CalibrationSpec) -> Option<f64>,
    {
        let mut matched = 0;
        let specs: Vec<CalibrationSpec> = self
            .specs
            .iter()
            .map(|spec| match shift_for(spec) {
                Some(shift) => {
                    matched += 1;
                    spec.clone_shifted(shift)
                }
                None => spec.clone(),
            })
            .collect();
        if matched == 0 {
            warn!("No calibration spec matched the shift");
        }
        debug!(matched, "Recalibrating shifted specs");
        Self::new(specs, &self.initial_model, self.config.clone())
    }
}

/// Curve handles a leg resolved to.
#[derive(Debug, Clone, Copy)]
struct ResolvedLeg {
    discount: CurveHandle,
    forward: Option<CurveHandle>,
}

/// Model, products and free curves while specs are processed.
struct Assembly<'a> {
    config: &'a CalibrationConfig,
    model: Model,
    to_calibrate: CurveAggregation,
    symbols: Vec<String>,
    products: Vec<Product>,
}

impl<'a> Assembly<'a> {
    fn new(model: Model, config: &'a CalibrationConfig) -> Self {
        Self {
            config,
            model,
            to_calibrate: CurveAggregation::new(),
            symbols: Vec::new(),
            products: Vec::new(),
        }
    }

    fn add(&mut self, index: usize, spec: &CalibrationSpec) -> Result<(), OptimiserError> {
        let product_type = spec
            .parsed_product_type()
            .map_err(|reason| OptimiserError::spec(index, &spec.symbol, "product_type", reason))?;

        let payer = match (&spec.payer, product_type.has_payer()) {
            (Some(payer), true) => Some(payer),
            (None, true) => {
                return Err(OptimiserError::spec(
                    index,
                    &spec.symbol,
                    "payer",
                    format!("{} needs a payer leg", product_type),
                ))
            }
            (_, false) => None,
        };

        if product_type.needs_forward_curve() && spec.receiver.forward_curve.is_none() {
            return Err(OptimiserError::spec(
                index,
                &spec.symbol,
                "receiver.forward_curve",
                format!("{} needs a forward curve", product_type),
            ));
        }

        let receiver = self.resolve_leg(index, spec, &spec.receiver, "receiver")?;
        let payer = match payer {
            Some(leg) => Some((leg, self.resolve_leg(index, spec, leg, "payer")?)),
            None => None,
        };

        let product = self.product(index, spec, product_type, receiver, payer)?;
        let handle = self.extend_calibration_curve(index, spec)?;

        debug!(
            symbol = %spec.symbol,
            product_type = %product_type,
            curve = %spec.calibration_curve,
            handle = %handle,
            time = spec.calibration_time,
            "Processed calibration spec"
        );
        self.symbols.push(spec.symbol.clone());
        self.products.push(product);
        Ok(())
    }

    fn resolve_leg(
        &mut self,
        index: usize,
        spec: &CalibrationSpec,
        leg: &LegSpec,
        side: &'static str,
    ) -> Result<ResolvedLeg, OptimiserError> {
        let discount_field = if side == "receiver" {
            "receiver.discount_curve"
        } else {
            "payer.discount_curve"
        };
        let forward_field = if side == "receiver" {
            "receiver.forward_curve"
        } else {
            "payer.forward_curve"
        };

        let discount = self.discount_curve(index, spec, &leg.discount_curve, discount_field)?;
        let forward = match &leg.forward_curve {
            Some(name) => Some(self.forward_curve(index, spec, leg, name, forward_field)?),
            None => None,
        };
        Ok(ResolvedLeg { discount, forward })
    }

    /// Handle of the discount curve `name`, created as a unit curve if absent.
    fn discount_curve(
        &mut self,
        index: usize,
        spec: &CalibrationSpec,
        name: &str,
        field: &'static str,
    ) -> Result<CurveHandle, OptimiserError> {
        if let Some(curve) = self.model.curve(name) {
            if curve.kind() != CurveKind::Discount {
                return Err(OptimiserError::spec(
                    index,
                    &spec.symbol,
                    field,
                    format!("curve {} is a {} curve, expected discount", name, curve.kind()),
                ));
            }
            return self.handle(name);
        }
        self.require_auto_create(index, spec, name, field)?;

        self.model = self.model.with_curve(DiscountCurve::unit(name));
        debug!(curve = name, "Created discount curve");
        self.handle(name)
    }

    /// Handle to read forwards of `name` from.
    fn forward_curve(
        &mut self,
        index: usize,
        spec: &CalibrationSpec,
        leg: &LegSpec,
        name: &str,
        field: &'static str,
    ) -> Result<CurveHandle, OptimiserError> {
        let tenor = leg.index_tenor.or_else(|| {
            self.config
                .infer_index_tenor
                .then(|| Tenor::infer_from_curve_name(name))
                .flatten()
        });

        match self.model.curve(name).map(|c| c.kind()) {
            Some(CurveKind::Forward) | Some(CurveKind::ForwardFromDiscount) => return self.handle(name),
            Some(CurveKind::Discount) => return self.wrap_discount_curve(name, tenor),
            None => {}
        }
        self.require_auto_create(index, spec, name, field)?;

        match self.config.forward_curve_mode {
            ForwardCurveMode::Native => {
                // The first spec calibrating the curve supplies its only point
                self.model = self.model.with_curve(ForwardCurve::empty(name, tenor));
                debug!(curve = name, tenor = ?tenor, "Created forward curve");
                self.handle(name)
            }
            ForwardCurveMode::DerivedFromDiscount => {
                self.model = self.model.with_curve(DiscountCurve::unit(name));
                debug!(curve = name, tenor = ?tenor, "Created discount curve for forwards");
                self.wrap_discount_curve(name, tenor)
            }
        }
    }

    /// Handle of the forward-from-discount wrapper of the discount curve `name`.
    fn wrap_discount_curve(
        &mut self,
        name: &str,
        tenor: Option<Tenor>,
    ) -> Result<CurveHandle, OptimiserError> {
        let wrapper = ForwardCurveFromDiscountCurve::wrapper_name(name);
        if self.model.handle(&wrapper).is_none() {
            let discount = self.handle(name)?;
            self.model = self
                .model
                .with_curve(ForwardCurveFromDiscountCurve::new(discount, name, tenor));
        }
        self.handle(&wrapper)
    }

    fn require_auto_create(
        &self,
        index: usize,
        spec: &CalibrationSpec,
        name: &str,
        field: &'static str,
    ) -> Result<(), OptimiserError> {
        if self.config.auto_create_curves {
            Ok(())
        } else {
            Err(OptimiserError::spec(
                index,
                &spec.symbol,
                field,
                format!("curve {} not found", name),
            ))
        }
    }

    fn handle(&self, name: &str) -> Result<CurveHandle, OptimiserError> {
        Ok(self.model.require_handle(name)?)
    }

    fn product(
        &self,
        index: usize,
        spec: &CalibrationSpec,
        product_type: ProductType,
        receiver: ResolvedLeg,
        payer: Option<(&LegSpec, ResolvedLeg)>,
    ) -> Result<Product, OptimiserError> {
        let leg = &spec.receiver;
        let forward = || {
            receiver.forward.ok_or_else(|| {
                OptimiserError::spec(
                    index,
                    &spec.symbol,
                    "receiver.forward_curve",
                    format!("{} needs a forward curve", product_type),
                )
            })
        };
        let swap_leg = |leg: &LegSpec, resolved: ResolvedLeg| {
            SwapLeg::new(leg.schedule.clone(), resolved.forward, leg.spread, resolved.discount)
        };
        let payer_leg = || {
            payer.ok_or_else(|| {
                OptimiserError::spec(
                    index,
                    &spec.symbol,
                    "payer",
                    format!("{} needs a payer leg", product_type),
                )
            })
        };

        let product = match product_type {
            ProductType::Deposit => {
                Deposit::new(leg.schedule.span(), leg.spread, receiver.discount).into()
            }
            ProductType::Fra => ForwardRateAgreement::new(
                leg.schedule.span(),
                leg.spread,
                forward()?,
                receiver.discount,
            )
            .into(),
            ProductType::Future => Future::new(leg.schedule.span(), leg.spread, forward()?).into(),
            ProductType::SwapLeg => swap_leg(leg, receiver).with_notional_exchange(true).into(),
            ProductType::Swap => {
                let (payer_leg, payer_resolved) = payer_leg()?;
                Swap::new(swap_leg(leg, receiver), swap_leg(payer_leg, payer_resolved)).into()
            }
            ProductType::SwapWithResetOnReceiver => {
                let (payer_leg, payer_resolved) = payer_leg()?;
                Swap::new(
                    swap_leg(leg, receiver)
                        .with_notional_exchange(true)
                        .with_notional_reset(payer_resolved.discount),
                    swap_leg(payer_leg, payer_resolved).with_notional_exchange(true),
                )
                .into()
            }
            ProductType::SwapWithResetOnPayer => {
                let (payer_leg, payer_resolved) = payer_leg()?;
                Swap::new(
                    swap_leg(leg, receiver).with_notional_exchange(true),
                    swap_leg(payer_leg, payer_resolved)
                        .with_notional_exchange(true)
                        .with_notional_reset(receiver.discount),
                )
                .into()
            }
        };
        Ok(product)
    }

    /// Add one free point to the calibration curve of `spec` and register the
    /// extended curve in the model and the curves to calibrate.
    fn extend_calibration_curve(
        &mut self,
        index: usize,
        spec: &CalibrationSpec,
    ) -> Result<CurveHandle, OptimiserError> {
        let name = &spec.calibration_curve;
        let handle = self.model.handle(name).ok_or_else(|| {
            OptimiserError::spec(
                index,
                &spec.symbol,
                "calibration_curve",
                format!("curve {} does not exist", name),
            )
        })?;
        let curve = self.model.curve_by_handle(handle).ok_or_else(|| {
            OptimiserError::spec(
                index,
                &spec.symbol,
                "calibration_curve",
                format!("curve {} does not exist", name),
            )
        })?;

        let seed = match curve.kind() {
            CurveKind::Discount => DISCOUNT_SEED,
            CurveKind::Forward => FORWARD_SEED,
            CurveKind::ForwardFromDiscount => {
                return Err(OptimiserError::spec(
                    index,
                    &spec.symbol,
                    "calibration_curve",
                    format!("curve {} is derived and has no points", name),
                ))
            }
        };

        let extended = curve
            .clone_builder()?
            .add_point(spec.calibration_time, seed, true)
            .build()
            .map_err(|err| {
                OptimiserError::spec(index, &spec.symbol, "calibration_time", err.to_string())
            })?;
        let extended = Arc::new(extended);
        self.model = self.model.with_shared_curve(Arc::clone(&extended));
        self.to_calibrate.add(handle, extended);
        Ok(handle)
    }
}
