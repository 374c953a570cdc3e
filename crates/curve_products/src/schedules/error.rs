//! Schedule generation error types.

use thiserror::Error;

/// Errors that can occur during schedule generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    /// Start time must be before end time.
    #[error("Start time {start} must be before end time {end}")]
    InvalidTimeRange {
        /// The start time.
        start: f64,
        /// The end time.
        end: f64,
    },

    /// Missing required field in builder.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Schedule has no periods.
    #[error("Schedule has no periods")]
    NoPeriods,

    /// A period is inconsistent.
    #[error("Invalid period {index}: {reason}")]
    InvalidPeriod {
        /// Position of the period in the schedule.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ScheduleError::InvalidTimeRange {
            start: 2.0,
            end: 1.0,
        };
        assert_eq!(format!("{}", err), "Start time 2 must be before end time 1");
        assert_eq!(
            format!("{}", ScheduleError::MissingField { field: "end" }),
            "Missing required field: end"
        );
    }
}
