//! Schedule and ScheduleBuilder implementation.

use super::error::ScheduleError;
use super::frequency::Frequency;
use super::period::Period;

/// Tolerance below which a trailing stub period is dropped.
const STUB_TOLERANCE: f64 = 1e-9;

/// An ordered, non-empty collection of accrual periods.
///
/// # Examples
///
/// ```
/// use curve_products::schedules::{Frequency, ScheduleBuilder};
///
/// let schedule = ScheduleBuilder::new()
///     .start(0.0)
///     .end(2.0)
///     .frequency(Frequency::SemiAnnual)
///     .build()
///     .unwrap();
///
/// assert_eq!(schedule.len(), 4);
/// assert_eq!(schedule.payment_times(), vec![0.5, 1.0, 1.5, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    periods: Vec<Period>,
}

impl Schedule {
    /// Creates a schedule from a list of periods.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::NoPeriods`] if `periods` is empty
    /// - [`ScheduleError::InvalidPeriod`] for a period with negative times,
    ///   `end <= start` or a non-positive length
    pub fn new(periods: Vec<Period>) -> Result<Self, ScheduleError> {
        if periods.is_empty() {
            return Err(ScheduleError::NoPeriods);
        }
        for (index, period) in periods.iter().enumerate() {
            period
                .validate()
                .map_err(|reason| ScheduleError::InvalidPeriod { index, reason })?;
        }
        Ok(Self { periods })
    }

    /// Creates a single-period schedule accruing from `start` to `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use curve_products::schedules::Schedule;
    ///
    /// let schedule = Schedule::single(0.0, 1.0).unwrap();
    /// assert_eq!(schedule.len(), 1);
    /// assert_eq!(schedule.maturity(), 1.0);
    /// ```
    pub fn single(start: f64, end: f64) -> Result<Self, ScheduleError> {
        if start.is_nan() || end.is_nan() || start >= end {
            return Err(ScheduleError::InvalidTimeRange { start, end });
        }
        Self::new(vec![Period::from_times(start, end)])
    }

    /// Returns the periods in the schedule.
    #[inline]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Returns the number of periods.
    #[inline]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false: schedules have at least one period.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns an iterator over the periods.
    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    /// Returns the accrual start of the first period.
    #[inline]
    pub fn start(&self) -> f64 {
        self.periods[0].start()
    }

    /// Returns the accrual end of the last period.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.periods[self.periods.len() - 1].end()
    }

    /// Returns the payment times.
    pub fn payment_times(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.payment()).collect()
    }

    /// Total accrual year fraction of all periods.
    pub fn total_length(&self) -> f64 {
        self.periods.iter().map(|p| p.length()).sum()
    }

    /// The whole schedule collapsed into one period: fixing and start of the
    /// first period, end and payment of the last, summed lengths.
    ///
    /// Single-period products (deposits, FRAs, futures) read their period
    /// through this.
    pub fn span(&self) -> Period {
        let first = &self.periods[0];
        let last = &self.periods[self.periods.len() - 1];
        Period::new(
            first.fixing(),
            first.start(),
            last.end(),
            last.payment(),
            self.total_length(),
        )
    }
}

/// Builder for regular time-based schedules.
///
/// Periods run from `start` in steps of the frequency's period length; the
/// last period is capped at `end` (short back stub).
///
/// # Examples
///
/// ```
/// use curve_products::schedules::{Frequency, ScheduleBuilder};
///
/// let schedule = ScheduleBuilder::new()
///     .start(0.5)
///     .end(1.75)
///     .frequency(Frequency::SemiAnnual)
///     .payment_offset(0.01)
///     .build()
///     .unwrap();
///
/// let last = schedule.periods()[2];
/// assert_eq!(last.end(), 1.75);
/// assert!((last.length() - 0.25).abs() < 1e-12);
/// assert!((last.payment() - 1.76).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    start: Option<f64>,
    end: Option<f64>,
    frequency: Option<Frequency>,
    fixing_offset: f64,
    payment_offset: f64,
}

impl ScheduleBuilder {
    /// Creates a new schedule builder without offsets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start time of the schedule.
    pub fn start(mut self, time: f64) -> Self {
        self.start = Some(time);
        self
    }

    /// Sets the end time of the schedule.
    pub fn end(mut self, time: f64) -> Self {
        self.end = Some(time);
        self
    }

    /// Sets the payment frequency.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Fix each period `offset` years before its start (floored at zero).
    pub fn fixing_offset(mut self, offset: f64) -> Self {
        self.fixing_offset = offset;
        self
    }

    /// Pay each period `offset` years after its end.
    pub fn payment_offset(mut self, offset: f64) -> Self {
        self.payment_offset = offset;
        self
    }

    /// Builds the schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Start, end or frequency is missing
    /// - Start is not before end
    /// - A generated period is invalid (e.g. negative start)
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        let start = self.start.ok_or(ScheduleError::MissingField { field: "start" })?;
        let end = self.end.ok_or(ScheduleError::MissingField { field: "end" })?;
        let frequency = self
            .frequency
            .ok_or(ScheduleError::MissingField { field: "frequency" })?;

        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ScheduleError::InvalidTimeRange { start, end });
        }

        let step = frequency.period_years();
        let mut periods = Vec::new();
        let mut i = 0_u32;
        loop {
            // Multiply rather than accumulate to avoid drift
            let period_start = start + f64::from(i) * step;
            if end - period_start <= STUB_TOLERANCE {
                break;
            }
            let mut period_end = start + f64::from(i + 1) * step;
            if period_end > end - STUB_TOLERANCE {
                period_end = end;
            }
            periods.push(Period::new(
                (period_start - self.fixing_offset).max(0.0),
                period_start,
                period_end,
                period_end + self.payment_offset,
                period_end - period_start,
            ));
            i += 1;
        }

        Schedule::new(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Schedule Tests
    // ========================================

    #[test]
    fn test_schedule_new_empty() {
        assert_eq!(Schedule::new(vec![]), Err(ScheduleError::NoPeriods));
    }

    #[test]
    fn test_schedule_new_rejects_bad_period() {
        let err = Schedule::new(vec![
            Period::from_times(0.0, 1.0),
            Period::from_times(1.0, 0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidPeriod { index: 1, .. }));
    }

    #[test]
    fn test_single() {
        let schedule = Schedule::single(0.25, 0.5).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.start(), 0.25);
        assert_eq!(schedule.maturity(), 0.5);
        assert!(Schedule::single(1.0, 1.0).is_err());
    }

    #[test]
    fn test_span() {
        let schedule = ScheduleBuilder::new()
            .start(0.0)
            .end(1.0)
            .frequency(Frequency::Quarterly)
            .build()
            .unwrap();
        let span = schedule.span();
        assert_eq!(span.start(), 0.0);
        assert_eq!(span.end(), 1.0);
        assert_relative_eq!(span.length(), 1.0, epsilon = 1e-14);
    }

    // ========================================
    // Builder Tests
    // ========================================

    #[test]
    fn test_builder_quarterly() {
        let schedule = ScheduleBuilder::new()
            .start(0.0)
            .end(2.0)
            .frequency(Frequency::Quarterly)
            .build()
            .unwrap();
        assert_eq!(schedule.len(), 8);
        assert_relative_eq!(schedule.total_length(), 2.0, epsilon = 1e-12);
        assert_eq!(schedule.maturity(), 2.0);
    }

    #[test]
    fn test_builder_monthly_no_drift() {
        let schedule = ScheduleBuilder::new()
            .start(0.0)
            .end(10.0)
            .frequency(Frequency::Monthly)
            .build()
            .unwrap();
        assert_eq!(schedule.len(), 120);
        assert_eq!(schedule.maturity(), 10.0);
    }

    #[test]
    fn test_builder_partial_period() {
        let schedule = ScheduleBuilder::new()
            .start(0.0)
            .end(1.25)
            .frequency(Frequency::Annual)
            .build()
            .unwrap();
        assert_eq!(schedule.len(), 2);
        assert_relative_eq!(schedule.periods()[1].length(), 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_builder_fixing_offset_floored() {
        let schedule = ScheduleBuilder::new()
            .start(0.0)
            .end(1.0)
            .frequency(Frequency::SemiAnnual)
            .fixing_offset(0.01)
            .build()
            .unwrap();
        assert_eq!(schedule.periods()[0].fixing(), 0.0);
        assert_relative_eq!(schedule.periods()[1].fixing(), 0.49, epsilon = 1e-14);
    }

    #[test]
    fn test_builder_missing_fields() {
        assert_eq!(
            ScheduleBuilder::new().end(1.0).frequency(Frequency::Annual).build(),
            Err(ScheduleError::MissingField { field: "start" })
        );
        assert_eq!(
            ScheduleBuilder::new().start(0.0).frequency(Frequency::Annual).build(),
            Err(ScheduleError::MissingField { field: "end" })
        );
        assert_eq!(
            ScheduleBuilder::new().start(0.0).end(1.0).build(),
            Err(ScheduleError::MissingField { field: "frequency" })
        );
    }

    #[test]
    fn test_builder_invalid_range() {
        let err = ScheduleBuilder::new()
            .start(1.0)
            .end(1.0)
            .frequency(Frequency::Annual)
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimeRange { .. }));
    }
}
