//! Declarative calibration instruments.
//!
//! A [`CalibrationSpec`] names a market instrument, its legs and the curve
//! point it calibrates. Curves are referenced by name and resolved when the
//! specs are turned into curves and products.

use curve_core::market_data::Tenor;
use curve_products::schedules::Schedule;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product type of a calibration spec, parsed case-insensitively from its tag.
///
/// # Examples
///
/// ```
/// use curve_optimiser::bootstrapping::ProductType;
///
/// assert_eq!("SwapLeg".parse::<ProductType>(), Ok(ProductType::SwapLeg));
/// assert_eq!("fra".parse::<ProductType>(), Ok(ProductType::Fra));
/// assert!("cap".parse::<ProductType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    /// Money-market deposit on the receiver leg
    Deposit,
    /// Forward rate agreement on the receiver leg
    Fra,
    /// Interest rate future; the receiver quote is a price
    Future,
    /// Single swap leg with notional exchange
    SwapLeg,
    /// Receiver leg minus payer leg
    Swap,
    /// Swap whose receiver notional resets against the payer discount curve
    SwapWithResetOnReceiver,
    /// Swap whose payer notional resets against the receiver discount curve
    SwapWithResetOnPayer,
}

impl ProductType {
    /// Canonical lower-case tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ProductType::Deposit => "deposit",
            ProductType::Fra => "fra",
            ProductType::Future => "future",
            ProductType::SwapLeg => "swapleg",
            ProductType::Swap => "swap",
            ProductType::SwapWithResetOnReceiver => "swapwithresetonreceiver",
            ProductType::SwapWithResetOnPayer => "swapwithresetonpayer",
        }
    }

    /// Whether the product has a payer leg.
    pub fn has_payer(&self) -> bool {
        matches!(
            self,
            ProductType::Swap | ProductType::SwapWithResetOnReceiver | ProductType::SwapWithResetOnPayer
        )
    }

    /// Whether the product needs a forward curve on its receiver leg.
    pub fn needs_forward_curve(&self) -> bool {
        matches!(self, ProductType::Fra | ProductType::Future)
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(ProductType::Deposit),
            "fra" => Ok(ProductType::Fra),
            "future" => Ok(ProductType::Future),
            "swapleg" => Ok(ProductType::SwapLeg),
            "swap" => Ok(ProductType::Swap),
            "swapwithresetonreceiver" => Ok(ProductType::SwapWithResetOnReceiver),
            "swapwithresetonpayer" => Ok(ProductType::SwapWithResetOnPayer),
            _ => Err(format!("unknown product type: {}", s)),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One leg of a calibration instrument.
///
/// `spread` is the quote of the leg: the fixed rate of a fixed leg, the
/// spread of a floating leg, the rate of a deposit or FRA, or the price of a
/// future.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegSpec {
    /// Accrual schedule.
    pub schedule: Schedule,
    /// Forward curve name; `None` for a fixed leg.
    pub forward_curve: Option<String>,
    /// Index tenor of the forward curve.
    pub index_tenor: Option<Tenor>,
    /// Rate, spread or price.
    pub spread: f64,
    /// Discount curve name.
    pub discount_curve: String,
}

impl LegSpec {
    /// Create a leg.
    pub fn new(
        schedule: Schedule,
        forward_curve: Option<String>,
        spread: f64,
        discount_curve: impl Into<String>,
    ) -> Self {
        Self {
            schedule,
            forward_curve,
            index_tenor: None,
            spread,
            discount_curve: discount_curve.into(),
        }
    }

    /// Create a fixed leg paying `rate`.
    pub fn fixed(schedule: Schedule, rate: f64, discount_curve: impl Into<String>) -> Self {
        Self::new(schedule, None, rate, discount_curve)
    }

    /// Create a floating leg on `forward_curve` paying `spread` on top.
    pub fn floating(
        schedule: Schedule,
        forward_curve: impl Into<String>,
        spread: f64,
        discount_curve: impl Into<String>,
    ) -> Self {
        Self::new(schedule, Some(forward_curve.into()), spread, discount_curve)
    }

    /// Set the index tenor of the forward curve.
    pub fn with_index_tenor(mut self, tenor: Tenor) -> Self {
        self.index_tenor = Some(tenor);
        self
    }

    /// Copy of the leg with `shift` added to its quote.
    pub fn shifted(&self, shift: f64) -> Self {
        Self {
            spread: self.spread + shift,
            ..self.clone()
        }
    }
}

/// A calibration instrument: one product, one new curve point.
///
/// # Examples
///
/// ```
/// use curve_optimiser::bootstrapping::{CalibrationSpec, LegSpec};
/// use curve_products::schedules::Schedule;
///
/// let schedule = Schedule::single(0.0, 2.0).unwrap();
/// let spec = CalibrationSpec::new(
///     "SWAP-2Y",
///     "swap",
///     LegSpec::floating(schedule.clone(), "forward-EUR-6M", 0.0, "discount-EUR"),
///     "forward-EUR-6M",
///     2.0,
/// )
/// .with_payer(LegSpec::fixed(schedule, 0.03, "discount-EUR"));
///
/// // A plain swap quotes on its payer leg
/// let bumped = spec.clone_shifted(0.0001);
/// assert!((bumped.payer.as_ref().unwrap().spread - 0.0301).abs() < 1e-15);
/// assert_eq!(bumped.receiver.spread, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationSpec {
    /// Market symbol of the instrument.
    pub symbol: String,
    /// Product type tag, see [`ProductType`].
    pub product_type: String,
    /// Receiver leg, or the only leg.
    pub receiver: LegSpec,
    /// Payer leg of swaps.
    pub payer: Option<LegSpec>,
    /// Name of the curve that gets a new point.
    pub calibration_curve: String,
    /// Time of the new point.
    pub calibration_time: f64,
}

impl CalibrationSpec {
    /// Create a single-leg spec.
    pub fn new(
        symbol: impl Into<String>,
        product_type: impl Into<String>,
        receiver: LegSpec,
        calibration_curve: impl Into<String>,
        calibration_time: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            product_type: product_type.into(),
            receiver,
            payer: None,
            calibration_curve: calibration_curve.into(),
            calibration_time,
        }
    }

    /// Add a payer leg.
    pub fn with_payer(mut self, payer: LegSpec) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Parsed product type.
    ///
    /// # Errors
    ///
    /// A message naming the unknown tag.
    pub fn parsed_product_type(&self) -> Result<ProductType, String> {
        self.product_type.parse()
    }

    /// Copy of the spec with its quote bumped by `shift`.
    ///
    /// The shift is in quote units: a rate for deposits, FRAs and swaps,
    /// a price for futures. A future shifted by `0.01` moves its implied
    /// rate down by one basis point.
    ///
    /// The receiver leg is bumped when there is no payer leg or the tag is
    /// `swapleg`, `deposit`, `swapwithresetonreceiver` or
    /// `swapwithresetonpayer`; otherwise the payer leg is bumped.
    pub fn clone_shifted(&self, shift: f64) -> Self {
        let tag = self.product_type.trim().to_ascii_lowercase();
        let bump_receiver = matches!(
            tag.as_str(),
            "swapleg" | "deposit" | "swapwithresetonreceiver" | "swapwithresetonpayer"
        );
        match &self.payer {
            Some(payer) if !bump_receiver => Self {
                payer: Some(payer.shifted(shift)),
                ..self.clone()
            },
            _ => Self {
                receiver: self.receiver.shifted(shift),
                ..self.clone()
            },
        }
    }
}
