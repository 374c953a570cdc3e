//! Index tenors for forward curves.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tenor of the rate index a forward curve projects.
///
/// Represents the standard interest rate tenors used in the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tenor {
    /// Overnight rate (e.g., SOFR, ESTR)
    Overnight,
    /// 1-month tenor
    OneMonth,
    /// 3-month tenor
    #[default]
    ThreeMonth,
    /// 6-month tenor (e.g., 6M EURIBOR)
    SixMonth,
    /// 12-month tenor
    TwelveMonth,
}

impl Tenor {
    /// Get the period length in years.
    pub fn period_years(&self) -> f64 {
        match self {
            Tenor::Overnight => 1.0 / 365.0,
            Tenor::OneMonth => 1.0 / 12.0,
            Tenor::ThreeMonth => 0.25,
            Tenor::SixMonth => 0.5,
            Tenor::TwelveMonth => 1.0,
        }
    }

    /// Get the tenor code for display.
    pub fn code(&self) -> &'static str {
        match self {
            Tenor::Overnight => "ON",
            Tenor::OneMonth => "1M",
            Tenor::ThreeMonth => "3M",
            Tenor::SixMonth => "6M",
            Tenor::TwelveMonth => "12M",
        }
    }

    /// Parse a tenor code such as `"3M"` (case-insensitive).
    ///
    /// ```
    /// use curve_core::market_data::Tenor;
    ///
    /// assert_eq!(Tenor::from_code("6m"), Some(Tenor::SixMonth));
    /// assert_eq!(Tenor::from_code("1Y"), Some(Tenor::TwelveMonth));
    /// assert_eq!(Tenor::from_code("7M"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "ON" | "1D" => Some(Tenor::Overnight),
            "1M" => Some(Tenor::OneMonth),
            "3M" => Some(Tenor::ThreeMonth),
            "6M" => Some(Tenor::SixMonth),
            "12M" | "1Y" => Some(Tenor::TwelveMonth),
            _ => None,
        }
    }

    /// Guess the index tenor from substrings of a curve name.
    ///
    /// Recognises a tenor code preceded by `_`, `-` or a space, e.g.
    /// `"forward-EUR-6M"` or `"EURIBOR_3M"`. This is a legacy naming
    /// convention; prefer an explicit tenor.
    ///
    /// ```
    /// use curve_core::market_data::Tenor;
    ///
    /// assert_eq!(Tenor::infer_from_curve_name("forward-EUR-6M"), Some(Tenor::SixMonth));
    /// assert_eq!(Tenor::infer_from_curve_name("EURIBOR_12M"), Some(Tenor::TwelveMonth));
    /// assert_eq!(Tenor::infer_from_curve_name("discount-EUR"), None);
    /// ```
    pub fn infer_from_curve_name(name: &str) -> Option<Self> {
        // 12M before 1M so that "_12M" is not read as "_1M"
        const CANDIDATES: [Tenor; 5] = [
            Tenor::TwelveMonth,
            Tenor::SixMonth,
            Tenor::ThreeMonth,
            Tenor::OneMonth,
            Tenor::Overnight,
        ];
        let upper = name.to_ascii_uppercase();
        CANDIDATES.into_iter().find(|tenor| {
            ['_', '-', ' ']
                .iter()
                .any(|sep| upper.contains(&format!("{}{}", sep, tenor.code())))
        })
    }
}

impl std::fmt::Display for Tenor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
