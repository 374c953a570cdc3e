//! Time-based schedule generation for rates products.
//!
//! This module provides:
//! - [`Schedule`]: A non-empty collection of accrual periods
//! - [`Period`]: A single accrual period with fixing, start, end and payment times
//! - [`Frequency`]: Payment frequency enumeration (Annual, SemiAnnual, etc.)
//! - [`ScheduleBuilder`]: Builder for regular schedules
//!
//! Times are year fractions. Calendars, business-day adjustment and day-count
//! conventions are applied by whoever produces the times.
//!
//! # Examples
//!
//! ```
//! use curve_products::schedules::{Frequency, ScheduleBuilder};
//!
//! let schedule = ScheduleBuilder::new()
//!     .start(0.0)
//!     .end(5.0)
//!     .frequency(Frequency::Annual)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schedule.len(), 5);
//! ```

mod error;
mod frequency;
mod period;
mod schedule;

pub use error::ScheduleError;
pub use frequency::Frequency;
pub use period::Period;
pub use schedule::{Schedule, ScheduleBuilder};
