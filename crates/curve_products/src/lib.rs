//! # curve_products (L2: Calibration Products)
//!
//! Time-based leg schedules and the linear rates products used as
//! calibration instruments.
//!
//! This crate provides:
//! - Schedules of accrual periods measured in year fractions (`schedules`)
//! - Deposits, FRAs, futures, swap legs and swaps (`instruments`)
//!
//! ## Design Principles
//!
//! - **Enum-based products** ([`instruments::Product`]) for static dispatch
//! - **Typed curve references**: products hold
//!   [`CurveHandle`](curve_core::market_data::CurveHandle)s resolved once at
//!   construction
//! - Every product implements
//!   [`AnalyticProduct`](curve_core::traits::AnalyticProduct)

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod instruments;
pub mod schedules;
