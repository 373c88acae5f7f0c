//! Payroll calendar: payroll weeks, the 4-4-5 fiscal calendar and holidays.
//!
//! The [`CalendarResolver`] is built from an explicit
//! [`CalendarSettings`](crate::config::CalendarSettings) value, so week and
//! period boundaries never depend on ambient process state.

mod fiscal;
mod holidays;
mod resolver;

pub use fiscal::{FISCAL_MONTH_WEEKS, FISCAL_YEAR_WEEKS};
pub use holidays::{holiday_on, holidays_between, holidays_for_year};
pub use resolver::{CalendarResolver, DAYS_PER_WEEK, parse_work_date, week_dates};
