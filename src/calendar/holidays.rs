//! US federal holiday calendar.
//!
//! Holidays only label entries for display and classification. They never
//! change a rate or multiplier; any holiday premium is a rendering concern.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{DateRange, Holiday};

/// Returns the six observed holidays of `year`, ordered by date.
///
/// Three fall on fixed dates (New Year's Day, Independence Day, Christmas)
/// and three follow weekday rules (Memorial Day, Labor Day, Thanksgiving).
///
/// # Example
///
/// ```
/// use timesheet_payroll::calendar::holidays_for_year;
/// use chrono::NaiveDate;
///
/// let holidays = holidays_for_year(2026);
/// assert_eq!(holidays.len(), 6);
/// assert_eq!(holidays[1].name, "Memorial Day");
/// assert_eq!(holidays[1].date, NaiveDate::from_ymd_opt(2026, 5, 25).unwrap());
/// ```
pub fn holidays_for_year(year: i32) -> Vec<Holiday> {
    let rules: [(&str, Option<NaiveDate>); 6] = [
        ("New Year's Day", NaiveDate::from_ymd_opt(year, 1, 1)),
        ("Memorial Day", last_weekday_of_month(year, 5, Weekday::Mon)),
        ("Independence Day", NaiveDate::from_ymd_opt(year, 7, 4)),
        (
            "Labor Day",
            NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1),
        ),
        (
            "Thanksgiving",
            NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Thu, 4),
        ),
        ("Christmas", NaiveDate::from_ymd_opt(year, 12, 25)),
    ];

    rules
        .into_iter()
        .filter_map(|(name, date)| {
            date.map(|date| Holiday {
                date,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Returns the holiday falling on `date`, if any.
pub fn holiday_on(date: NaiveDate) -> Option<Holiday> {
    holidays_for_year(date.year())
        .into_iter()
        .find(|h| h.date == date)
}

/// Returns every holiday inside `range`, ordered by date.
pub fn holidays_between(range: DateRange) -> Vec<Holiday> {
    (range.start.year()..=range.end.year())
        .flat_map(holidays_for_year)
        .filter(|h| range.contains_date(h.date))
        .collect()
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4))
}
