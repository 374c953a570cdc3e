//! Immutable curves for the multi-curve model.
//!
//! This module provides:
//! - [`DiscountCurve`]: Discount factors at interpolation points
//! - [`ForwardCurve`]: Forward rates at interpolation points
//! - [`ForwardCurveFromDiscountCurve`]: Forward rates implied by a discount curve
//! - [`Curve`]: Static dispatch enum over the three
//! - [`Tenor`]: Index tenors
//!
//! The free parameters of a point-based curve are the values of the points
//! flagged `is_parameter`, in time order.

mod curve_enum;
mod derived;
mod discount;
mod forward;
mod points;
mod tenor;

pub use curve_enum::{Curve, CurveBuilder, CurveKind};
pub use derived::ForwardCurveFromDiscountCurve;
pub use discount::{DiscountCurve, DiscountCurveBuilder};
pub use forward::{ForwardCurve, ForwardCurveBuilder};
pub use points::{CurvePoint, InterpolationMethod};
pub use tenor::Tenor;
