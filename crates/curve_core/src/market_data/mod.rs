//! Market data: curves and the immutable curve model.
//!
//! This module provides:
//! - Discount, forward and derived forward curves (`curves`)
//! - The curve model addressed by [`CurveHandle`]s (`model`)
//! - Market data errors (`error`)

pub mod curves;
pub mod error;
pub mod model;

pub use curves::{
    Curve, CurveBuilder, CurveKind, CurvePoint, DiscountCurve, DiscountCurveBuilder, ForwardCurve,
    ForwardCurveBuilder, ForwardCurveFromDiscountCurve, InterpolationMethod, Tenor,
};
pub use error::MarketDataError;
pub use model::{CurveHandle, Model};
