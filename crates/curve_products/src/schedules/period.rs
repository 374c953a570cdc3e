//! Period definition for scheduled instruments.

/// A single accrual period in a schedule.
///
/// All times are year fractions from the model reference date. The period
/// length is the accrual year fraction used for interest, kept separately
/// from `end - start` so that day-count conventions can be applied outside
/// this crate.
///
/// # Examples
///
/// ```
/// use curve_products::schedules::Period;
///
/// let period = Period::new(0.5, 0.5, 1.0, 1.0, 0.5);
/// assert_eq!(period.fixing(), 0.5);
/// assert_eq!(period.length(), 0.5);
///
/// let simple = Period::from_times(1.0, 1.25);
/// assert_eq!(simple.payment(), 1.25);
/// assert_eq!(simple.length(), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    fixing: f64,
    start: f64,
    end: f64,
    payment: f64,
    length: f64,
}

impl Period {
    /// Creates a period from all of its times and its accrual length.
    #[inline]
    pub fn new(fixing: f64, start: f64, end: f64, payment: f64, length: f64) -> Self {
        Self {
            fixing,
            start,
            end,
            payment,
            length,
        }
    }

    /// Creates a period fixing at its start, paying at its end and accruing
    /// `end - start`.
    #[inline]
    pub fn from_times(start: f64, end: f64) -> Self {
        Self::new(start, start, end, end, end - start)
    }

    /// Returns the fixing time.
    #[inline]
    pub fn fixing(&self) -> f64 {
        self.fixing
    }

    /// Returns the accrual start time.
    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the accrual end time.
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the payment time.
    #[inline]
    pub fn payment(&self) -> f64 {
        self.payment
    }

    /// Returns the accrual year fraction.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns a copy with every time moved by `offset` years.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            fixing: self.fixing + offset,
            start: self.start + offset,
            end: self.end + offset,
            payment: self.payment + offset,
            length: self.length,
        }
    }

    /// Describes what is inconsistent about the period, if anything.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let times = [self.fixing, self.start, self.end, self.payment];
        if times.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err("times must be finite and non-negative".to_string());
        }
        if self.end <= self.start {
            return Err(format!("end {} is not after start {}", self.end, self.start));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(format!("length {} is not positive", self.length));
        }
        Ok(())
    }
}
