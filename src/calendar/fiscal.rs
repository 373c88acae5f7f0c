//! 4-4-5 fiscal calendar.
//!
//! Each fiscal year is 52 weeks split into 12 months following a repeating
//! 4-week/4-week/5-week pattern. There is no general formula for where a
//! year begins, so every year needs a configured anchor date. Requests for
//! an unconfigured year fail with [`EngineError::CalendarUnconfigured`]
//! rather than falling back to calendar months.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, FiscalPeriod};

use super::resolver::{CalendarResolver, DAYS_PER_WEEK};

/// Weeks in each fiscal month, in order.
pub const FISCAL_MONTH_WEEKS: [u32; 12] = [4, 4, 5, 4, 4, 5, 4, 4, 5, 4, 4, 5];

/// Weeks in a fiscal year.
pub const FISCAL_YEAR_WEEKS: u32 = 52;

impl CalendarResolver {
    /// Returns the anchor (first day) of a configured fiscal year.
    pub fn fiscal_year_anchor(&self, year: i32) -> EngineResult<NaiveDate> {
        self.settings
            .fiscal_years
            .get(&year)
            .copied()
            .ok_or(EngineError::CalendarUnconfigured { year })
    }

    /// Returns the 364-day span of a configured fiscal year.
    pub fn fiscal_year_range(&self, year: i32) -> EngineResult<DateRange> {
        let anchor = self.fiscal_year_anchor(year)?;
        Ok(DateRange::spanning(
            anchor,
            i64::from(FISCAL_YEAR_WEEKS) * DAYS_PER_WEEK,
        ))
    }

    /// Returns the start and end dates of fiscal month `month` (1 through 12).
    ///
    /// # Example
    ///
    /// ```
    /// use timesheet_payroll::calendar::CalendarResolver;
    /// use timesheet_payroll::config::CalendarSettings;
    /// use chrono::NaiveDate;
    ///
    /// let anchor = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
    /// let calendar = CalendarResolver::new(
    ///     CalendarSettings::default().with_fiscal_year(2026, anchor),
    /// );
    ///
    /// // Third month is the first 5-week month
    /// let march = calendar.fiscal_month_range(2026, 3).unwrap();
    /// assert_eq!(march.start, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
    /// assert_eq!(march.end, NaiveDate::from_ymd_opt(2026, 3, 29).unwrap());
    ///
    /// // No anchor, no answer
    /// assert!(calendar.fiscal_month_range(2027, 1).is_err());
    /// ```
    pub fn fiscal_month_range(&self, year: i32, month: u32) -> EngineResult<DateRange> {
        let index = month_index(month)?;
        let anchor = self.fiscal_year_anchor(year)?;

        let weeks_before: u32 = FISCAL_MONTH_WEEKS[..index].iter().sum();
        let start = anchor + Duration::days(i64::from(weeks_before) * DAYS_PER_WEEK);
        Ok(DateRange::spanning(
            start,
            i64::from(FISCAL_MONTH_WEEKS[index]) * DAYS_PER_WEEK,
        ))
    }

    /// Returns the 7-day weeks of fiscal month `month`, counted from its start.
    pub fn fiscal_weeks_for_month(&self, year: i32, month: u32) -> EngineResult<Vec<DateRange>> {
        let range = self.fiscal_month_range(year, month)?;
        let mut weeks = Vec::new();
        let mut start = range.start;
        while start <= range.end {
            weeks.push(DateRange::spanning(start, DAYS_PER_WEEK));
            start += Duration::days(DAYS_PER_WEEK);
        }
        Ok(weeks)
    }

    /// Returns the fiscal month containing `date`.
    ///
    /// Only configured years are searched. The error names the calendar year
    /// of `date` when no configured fiscal year covers it.
    pub fn fiscal_period_for_date(&self, date: NaiveDate) -> EngineResult<FiscalPeriod> {
        for &year in self.settings.fiscal_years.keys() {
            let year_range = self.fiscal_year_range(year)?;
            if !year_range.contains_date(date) {
                continue;
            }
            for month in 1..=12 {
                let range = self.fiscal_month_range(year, month)?;
                if range.contains_date(date) {
                    return Ok(FiscalPeriod { year, month, range });
                }
            }
        }
        Err(EngineError::CalendarUnconfigured { year: date.year() })
    }
}

fn month_index(month: u32) -> EngineResult<usize> {
    if (1..=12).contains(&month) {
        Ok((month - 1) as usize)
    } else {
        Err(EngineError::validation(
            "month",
            format!("fiscal month must be between 1 and 12, got {}", month),
        ))
    }
}
