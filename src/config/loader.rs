//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file. Configuration is read once per process;
//! changing it only affects future week and period computations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::calendar::{DAYS_PER_WEEK, FISCAL_YEAR_WEEKS};
use crate::error::{EngineError, EngineResult};

use super::types::{CalendarSettings, EngineConfig, OvertimePolicy, RawEngineConfig};

/// Loads and provides access to the engine configuration.
///
/// # File Format
///
/// ```text
/// timezone: America/Chicago
/// week_start: monday
/// overtime:
///   weekly_threshold_hours: "40"
///   multiplier: "1.5"
/// fiscal_years:
///   2026: 2025-12-29
/// ```
///
/// # Example
///
/// ```no_run
/// use timesheet_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Timezone: {}", loader.config().calendar.timezone);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file is not valid YAML or misses a required field (`ConfigParseError`)
    /// - The timezone is unknown (`InvalidTimezone`)
    /// - The week start is not a weekday name (`ConfigParseError`)
    /// - The overtime threshold is not positive or the multiplier is below
    ///   one (`ConfigParseError`)
    /// - Two fiscal year anchors are less than 52 weeks apart (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Loads configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> EngineResult<Self> {
        let raw: RawEngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        let timezone: Tz = raw
            .timezone
            .parse()
            .map_err(|_| EngineError::InvalidTimezone {
                name: raw.timezone.clone(),
            })?;

        let week_start: Weekday =
            raw.week_start
                .parse()
                .map_err(|_| EngineError::ConfigParseError {
                    path: origin.to_string(),
                    message: format!("week_start '{}' is not a weekday", raw.week_start),
                })?;

        check_overtime(&raw.overtime, origin)?;
        check_fiscal_anchors(&raw.fiscal_years, origin)?;

        let calendar = CalendarSettings {
            timezone,
            week_start,
            fiscal_years: raw.fiscal_years,
        };

        Ok(Self {
            config: EngineConfig {
                calendar,
                overtime: raw.overtime,
            },
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

fn parse_error(origin: &str, message: String) -> EngineError {
    EngineError::ConfigParseError {
        path: origin.to_string(),
        message,
    }
}

fn check_overtime(policy: &OvertimePolicy, origin: &str) -> EngineResult<()> {
    if policy.weekly_threshold_hours <= Decimal::ZERO {
        return Err(parse_error(
            origin,
            format!(
                "overtime.weekly_threshold_hours must be positive, got {}",
                policy.weekly_threshold_hours
            ),
        ));
    }
    if policy.multiplier < Decimal::ONE {
        return Err(parse_error(
            origin,
            format!(
                "overtime.multiplier must be at least 1, got {}",
                policy.multiplier
            ),
        ));
    }
    Ok(())
}

/// Consecutive anchors must leave room for a full fiscal year.
fn check_fiscal_anchors(anchors: &BTreeMap<i32, NaiveDate>, origin: &str) -> EngineResult<()> {
    let year_length = Duration::days(i64::from(FISCAL_YEAR_WEEKS) * DAYS_PER_WEEK);
    let mut previous: Option<(i32, NaiveDate)> = None;
    for (&year, &anchor) in anchors {
        if let Some((prev_year, prev_anchor)) = previous {
            if anchor - prev_anchor < year_length {
                return Err(parse_error(
                    origin,
                    format!(
                        "fiscal_years {} anchor {} overlaps fiscal year {} starting {}",
                        year, anchor, prev_year, prev_anchor
                    ),
                ));
            }
        }
        previous = Some((year, anchor));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/payroll.yaml"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let config = result.unwrap().into_config();
        assert_eq!(config.calendar.timezone, chrono_tz::America::Chicago);
        assert_eq!(config.calendar.week_start, Weekday::Mon);
        assert_eq!(
            config.calendar.fiscal_years.get(&2026),
            Some(&NaiveDate::from_ymd_opt(2025, 12, 29).unwrap())
        );
        assert_eq!(config.overtime.weekly_threshold_hours, Decimal::from(40));
        assert_eq!(
            config.overtime.multiplier,
            Decimal::from_str("1.5").unwrap()
        );
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let result = ConfigLoader::load("/nonexistent/payroll.yaml");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let result = ConfigLoader::from_yaml_str("timezone: Mars/Olympus\n");
        match result {
            Err(EngineError::InvalidTimezone { name }) => assert_eq!(name, "Mars/Olympus"),
            other => panic!("Expected InvalidTimezone error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_week_start_is_rejected() {
        let result = ConfigLoader::from_yaml_str("timezone: UTC\nweek_start: someday\n");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_non_positive_overtime_threshold_is_rejected() {
        let result = ConfigLoader::from_yaml_str(
            "timezone: UTC\novertime:\n  weekly_threshold_hours: \"-5\"\n  multiplier: \"-1.5\"\n",
        );
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("overtime.weekly_threshold_hours"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        let result =
            ConfigLoader::from_yaml_str("timezone: UTC\novertime:\n  weekly_threshold_hours: \"0\"\n");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_overtime_multiplier_below_one_is_rejected() {
        let result =
            ConfigLoader::from_yaml_str("timezone: UTC\novertime:\n  multiplier: \"0.5\"\n");
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("overtime.multiplier"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        let straight_time =
            ConfigLoader::from_yaml_str("timezone: UTC\novertime:\n  multiplier: \"1\"\n").unwrap();
        assert_eq!(straight_time.config().overtime.multiplier, Decimal::ONE);
    }

    #[test]
    fn test_overlapping_fiscal_anchors_are_rejected() {
        let result = ConfigLoader::from_yaml_str(
            "timezone: UTC\nfiscal_years:\n  2026: 2025-12-29\n  2027: 2026-06-01\n",
        );
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("fiscal_years"));
                assert!(message.contains("2027"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_back_to_back_fiscal_anchors_are_accepted() {
        let loader = ConfigLoader::from_yaml_str(
            "timezone: UTC\nfiscal_years:\n  2026: 2025-12-29\n  2027: 2026-12-28\n",
        )
        .unwrap();
        assert_eq!(loader.config().calendar.fiscal_years.len(), 2);
    }

    #[test]
    fn test_missing_timezone_is_a_parse_error() {
        let result = ConfigLoader::from_yaml_str("week_start: sunday\n");
        match result {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert_eq!(path, "<inline>");
                assert!(message.contains("timezone"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_week_start_accepts_any_weekday_name() {
        let loader =
            ConfigLoader::from_yaml_str("timezone: America/New_York\nweek_start: sunday\n")
                .unwrap();
        assert_eq!(loader.config().calendar.week_start, Weekday::Sun);
    }
}
