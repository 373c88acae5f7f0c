//! Date range, fiscal period and holiday models.
//!
//! This module contains the [`DateRange`] used for every period the engine
//! reasons about, plus the [`Holiday`] and [`FiscalPeriod`] labels the
//! calendar produces.

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive range of local dates.
///
/// # Example
///
/// ```
/// use timesheet_payroll::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
/// )
/// .unwrap();
///
/// assert!(range.contains_date(NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()));
/// assert_eq!(range.num_days(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First date of the range (inclusive).
    pub start: NaiveDate,
    /// Last date of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end before the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::validation(
                "range",
                format!("end date {} is before start date {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// Creates the range of `days` consecutive dates beginning at `start`.
    pub(crate) fn spanning(start: NaiveDate, days: i64) -> Self {
        Self {
            start,
            end: start + Duration::days(days - 1),
        }
    }

    /// Checks if a given date falls within this range.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns the number of dates in the range.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// One day of a payroll week with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDay {
    /// The date.
    pub date: NaiveDate,
    /// The weekday.
    pub weekday: Weekday,
    /// Short label such as "Mon".
    pub label: String,
}

/// A US federal holiday.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Holiday {
    /// The date the holiday falls on.
    pub date: NaiveDate,
    /// The name of the holiday (e.g., "Labor Day").
    pub name: String,
}

/// One bucket of the 4-4-5 fiscal calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// The fiscal year.
    pub year: i32,
    /// The fiscal month, 1 through 12.
    pub month: u32,
    /// The dates the month covers.
    pub range: DateRange,
}

impl FiscalPeriod {
    /// Returns a stable label such as "FY2026-P03".
    pub fn label(&self) -> String {
        format!("FY{}-P{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_week() -> DateRange {
        DateRange::new(date(2026, 2, 2), date(2026, 2, 8)).unwrap()
    }

    #[test]
    fn test_contains_date_on_boundaries() {
        let range = create_week();
        assert!(range.contains_date(range.start));
        assert!(range.contains_date(range.end));
    }

    #[test]
    fn test_contains_date_outside_range() {
        let range = create_week();
        assert!(!range.contains_date(date(2026, 2, 1)));
        assert!(!range.contains_date(date(2026, 2, 9)));
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let result = DateRange::new(date(2026, 2, 8), date(2026, 2, 2));
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2026, 2, 2), date(2026, 2, 2)).unwrap();
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_spanning_builds_inclusive_range() {
        let range = DateRange::spanning(date(2026, 2, 23), 35);
        assert_eq!(range.end, date(2026, 3, 29));
        assert_eq!(range.num_days(), 35);
    }

    #[test]
    fn test_fiscal_period_label() {
        let period = FiscalPeriod {
            year: 2026,
            month: 3,
            range: DateRange::spanning(date(2026, 2, 23), 35),
        };
        assert_eq!(period.label(), "FY2026-P03");
    }

    #[test]
    fn test_serialize_date_range() {
        let json = serde_json::to_string(&create_week()).unwrap();
        assert_eq!(json, r#"{"start":"2026-02-02","end":"2026-02-08"}"#);
    }
}
