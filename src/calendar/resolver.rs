//! Timezone-aware payroll week math.
//!
//! All week computations are pure functions of their date input and the
//! [`CalendarSettings`] the resolver was built with; nothing reads the host
//! clock or environment except [`CalendarResolver::today_in_zone`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::CalendarSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, WeekDay};

/// Number of days in a payroll week.
pub const DAYS_PER_WEEK: i64 = 7;

/// Resolves dates, payroll weeks and fiscal periods for one configuration.
///
/// # Example
///
/// ```
/// use timesheet_payroll::calendar::CalendarResolver;
/// use timesheet_payroll::config::CalendarSettings;
/// use chrono::{NaiveDate, Weekday};
///
/// let calendar = CalendarResolver::new(CalendarSettings::new(
///     chrono_tz::America::Chicago,
///     Weekday::Mon,
/// ));
///
/// // 2026-02-05 is a Thursday
/// let thursday = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
/// assert_eq!(
///     calendar.week_start(thursday),
///     NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CalendarResolver {
    pub(super) settings: CalendarSettings,
}

impl CalendarResolver {
    /// Creates a resolver for the given settings.
    pub fn new(settings: CalendarSettings) -> Self {
        Self { settings }
    }

    /// Returns the settings this resolver was built with.
    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// Returns the configured timezone.
    pub fn timezone(&self) -> Tz {
        self.settings.timezone
    }

    /// Returns today's date in the configured timezone.
    pub fn today_in_zone(&self) -> NaiveDate {
        self.today_in_zone_at(Utc::now())
    }

    /// Returns the local date of `instant` in the configured timezone.
    pub fn today_in_zone_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.settings.timezone).date_naive()
    }

    /// Returns the first day of the payroll week containing `date`.
    ///
    /// `date` is already a local calendar date, so the result does not
    /// depend on the zone; callers holding an instant go through
    /// [`Self::week_start_at`].
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let weekday = date.weekday();
        let offset = (i64::from(weekday.num_days_from_monday()) + DAYS_PER_WEEK
            - i64::from(self.settings.week_start.num_days_from_monday()))
            % DAYS_PER_WEEK;
        date - Duration::days(offset)
    }

    /// Returns the inclusive bounds of the payroll week containing `date`.
    pub fn week_bounds(&self, date: NaiveDate) -> DateRange {
        DateRange::spanning(self.week_start(date), DAYS_PER_WEEK)
    }

    /// Returns the first day of the payroll week containing `instant`.
    pub fn week_start_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.week_start(self.today_in_zone_at(instant))
    }

    /// Returns the 7 ordered days of the week beginning at `week_start`.
    pub fn week_dates(&self, week_start: NaiveDate) -> Vec<WeekDay> {
        week_dates(week_start)
    }

    /// Returns every payroll week overlapping `range`, in order.
    pub fn weeks_covering(&self, range: DateRange) -> Vec<DateRange> {
        let mut weeks = Vec::new();
        let mut start = self.week_start(range.start);
        while start <= range.end {
            weeks.push(DateRange::spanning(start, DAYS_PER_WEEK));
            start += Duration::days(DAYS_PER_WEEK);
        }
        weeks
    }

    /// Returns `range` widened to whole payroll weeks.
    pub fn expand_to_weeks(&self, range: DateRange) -> DateRange {
        DateRange {
            start: self.week_start(range.start),
            end: self.week_bounds(range.end).end,
        }
    }
}

/// Returns the 7 ordered days beginning at `week_start` with short labels.
///
/// Pure function of its input, independent of configuration and host clock.
pub fn week_dates(week_start: NaiveDate) -> Vec<WeekDay> {
    (0..DAYS_PER_WEEK)
        .map(|offset| {
            let date = week_start + Duration::days(offset);
            let weekday: Weekday = date.weekday();
            WeekDay {
                date,
                weekday,
                label: weekday.to_string(),
            }
        })
        .collect()
}

/// Parses a Y-M-D work date supplied by a caller.
///
/// # Example
///
/// ```
/// use timesheet_payroll::calendar::parse_work_date;
///
/// assert!(parse_work_date("2026-02-04").is_ok());
/// assert!(parse_work_date("02/04/2026").is_err());
/// ```
pub fn parse_work_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        EngineError::validation("work_date", format!("'{}' is not a Y-M-D date: {}", value, e))
    })
}
