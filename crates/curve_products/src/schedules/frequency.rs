//! Payment frequency enumeration.

use std::fmt;
use std::str::FromStr;

/// Payment frequency for scheduled instruments.
///
/// # Examples
///
/// ```
/// use curve_products::schedules::Frequency;
///
/// let freq = Frequency::Quarterly;
/// assert_eq!(freq.periods_per_year(), 4);
/// assert_eq!(freq.period_years(), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    /// Annual payments (once per year).
    Annual,
    /// Semi-annual payments (twice per year).
    SemiAnnual,
    /// Quarterly payments (four times per year).
    Quarterly,
    /// Monthly payments (twelve times per year).
    Monthly,
}

impl Frequency {
    /// Returns the number of payment periods per year.
    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Returns the length of one regular period in years.
    #[inline]
    pub fn period_years(&self) -> f64 {
        1.0 / self.periods_per_year() as f64
    }

    /// Returns the standard name for this frequency.
    ///
    /// # Examples
    ///
    /// ```
    /// use curve_products::schedules::Frequency;
    ///
    /// assert_eq!(Frequency::Annual.name(), "Annual");
    /// assert_eq!(Frequency::SemiAnnual.name(), "Semi-Annual");
    /// ```
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Frequency {
    type Err = String;

    /// Parses frequency from string (case-insensitive).
    ///
    /// Supported formats:
    /// - Annual: "annual", "1y", "yearly", "12m"
    /// - SemiAnnual: "semi-annual", "semiannual", "6m"
    /// - Quarterly: "quarterly", "3m"
    /// - Monthly: "monthly", "1m"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "annual" | "1y" | "yearly" | "12m" => Ok(Frequency::Annual),
            "semiannual" | "6m" => Ok(Frequency::SemiAnnual),
            "quarterly" | "3m" => Ok(Frequency::Quarterly),
            "monthly" | "1m" => Ok(Frequency::Monthly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}
