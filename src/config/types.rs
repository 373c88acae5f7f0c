//! Configuration types for the payroll engine.
//!
//! [`RawEngineConfig`] mirrors the YAML file; [`EngineConfig`] is the
//! validated form handed to the calendar and the aggregation pass.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Default weekly overtime threshold in hours.
pub const DEFAULT_WEEKLY_OVERTIME_THRESHOLD: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Default overtime multiplier (time and a half).
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Overtime policy applied to hourly employees.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OvertimePolicy {
    /// Hours per payroll week before overtime begins.
    pub weekly_threshold_hours: Decimal,
    /// Multiplier applied to the rate for overtime hours.
    pub multiplier: Decimal,
}

impl Default for OvertimePolicy {
    fn default() -> Self {
        Self {
            weekly_threshold_hours: DEFAULT_WEEKLY_OVERTIME_THRESHOLD,
            multiplier: DEFAULT_OVERTIME_MULTIPLIER,
        }
    }
}

/// Timezone, week start and fiscal anchors for the calendar resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    /// The operating timezone.
    pub timezone: Tz,
    /// The weekday payroll weeks start on.
    pub week_start: Weekday,
    /// Fiscal year → first day of that fiscal year.
    pub fiscal_years: BTreeMap<i32, NaiveDate>,
}

impl CalendarSettings {
    /// Creates settings with no fiscal years configured.
    pub fn new(timezone: Tz, week_start: Weekday) -> Self {
        Self {
            timezone,
            week_start,
            fiscal_years: BTreeMap::new(),
        }
    }

    /// Adds the anchor date for one fiscal year.
    pub fn with_fiscal_year(mut self, year: i32, anchor: NaiveDate) -> Self {
        self.fiscal_years.insert(year, anchor);
        self
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self::new(Tz::UTC, Weekday::Mon)
    }
}

/// The complete, validated engine configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    /// Calendar settings.
    pub calendar: CalendarSettings,
    /// Overtime policy.
    pub overtime: OvertimePolicy,
}

/// The configuration file as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEngineConfig {
    /// IANA timezone name, e.g. "America/Chicago".
    pub timezone: String,
    /// Weekday name, e.g. "monday".
    #[serde(default = "default_week_start")]
    pub week_start: String,
    /// Overtime policy.
    #[serde(default)]
    pub overtime: OvertimePolicy,
    /// Fiscal year → anchor date.
    #[serde(default)]
    pub fiscal_years: BTreeMap<i32, NaiveDate>,
}

fn default_week_start() -> String {
    "monday".to_string()
}
