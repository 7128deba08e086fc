//! Leave periods and month-by-month proration records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An INSS-covered absence (sick leave, accident leave), inclusive on both
/// ends.
///
/// # Example
///
/// ```
/// use folha_engine::models::LeavePeriod;
/// use chrono::NaiveDate;
///
/// let leave = LeavePeriod {
///     start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
/// };
/// assert_eq!(leave.days(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePeriod {
    /// First day of leave.
    pub start: NaiveDate,
    /// Last day of leave.
    pub end: NaiveDate,
}

impl LeavePeriod {
    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Days of this leave falling inside `[from, to]`, or 0 if disjoint.
    pub fn overlap_days(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let start = self.start.max(from);
        let end = self.end.min(to);
        if end < start {
            0
        } else {
            (end - start).num_days() + 1
        }
    }

    /// Rejects periods whose end precedes their start.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end < self.start {
            return Err(EngineError::invalid_input(
                "leave_periods",
                format!("leave period {}..{} ends before it starts", self.start, self.end),
            ));
        }
        Ok(())
    }
}

/// The outcome of prorating a single calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationMonth {
    /// Display label, e.g. "Janeiro/2024".
    pub month_label: String,
    /// Days worked in the month after leave exclusions.
    pub days_worked: i64,
    /// Calendar days in the month.
    pub days_in_month: u32,
    /// 1 if the month grants an avo, otherwise 0.
    pub avo_granted: u8,
    /// Why the avo was or was not granted.
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlap_inside_window() {
        let leave = LeavePeriod {
            start: date(2024, 3, 10),
            end: date(2024, 4, 5),
        };
        assert_eq!(leave.overlap_days(date(2024, 3, 1), date(2024, 3, 31)), 22);
        assert_eq!(leave.overlap_days(date(2024, 4, 1), date(2024, 4, 30)), 5);
    }

    #[test]
    fn test_overlap_disjoint_is_zero() {
        let leave = LeavePeriod {
            start: date(2024, 3, 10),
            end: date(2024, 3, 12),
        };
        assert_eq!(leave.overlap_days(date(2024, 5, 1), date(2024, 5, 31)), 0);
    }

    #[test]
    fn test_validate_rejects_inverted_period() {
        let leave = LeavePeriod {
            start: date(2024, 3, 12),
            end: date(2024, 3, 10),
        };
        assert!(matches!(
            leave.validate(),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
