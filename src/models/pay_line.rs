//! Priced line items produced by aggregation.
//!
//! A [`PayLine`] is one time entry, or one regular/overtime portion of a
//! split entry, priced under a report's rate hierarchy.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rounds a money amount to cents, midpoint away from zero.
///
/// # Example
///
/// ```
/// use timesheet_payroll::models::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether hours count as regular or overtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourClass {
    /// Hours within the weekly threshold, or any hours of an exempt employee.
    Regular,
    /// Hours past the weekly threshold.
    Overtime,
}

/// Where a line's rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// A negotiated (employee, customer) override.
    Override,
    /// The employee's default pay rate.
    DefaultPayRate,
    /// The employee's default client bill rate.
    DefaultClientBillRate,
    /// Nothing was configured; the rate is zero.
    Fallback,
}

/// Represents a single priced line in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The entry this line was derived from.
    pub entry_id: Uuid,
    /// The employee who did the work.
    pub employee_id: String,
    /// The customer the work was done for.
    pub customer_id: String,
    /// The date the work was done on.
    pub work_date: NaiveDate,
    /// First day of the payroll week the line was allocated in.
    pub week_start: NaiveDate,
    /// Regular or overtime.
    pub class: HourClass,
    /// Hours on this line; never rounded.
    pub hours: Decimal,
    /// The resolved hourly rate.
    pub rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// Multiplier applied to the rate (1 for regular time).
    pub multiplier: Decimal,
    /// hours × rate × multiplier, rounded to cents.
    pub amount: Decimal,
    /// Notes carried from the entry.
    pub notes: Option<String>,
    /// Name of the holiday the work date falls on, if any.
    pub holiday: Option<String>,
}

/// A line priced by the zero fallback.
///
/// A genuine zero rate is indistinguishable from missing configuration, so
/// these are always surfaced alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateWarning {
    /// The employee with no configured rate.
    pub employee_id: String,
    /// The customer the line was for.
    pub customer_id: String,
    /// The entry that produced the line.
    pub entry_id: Uuid,
    /// The date of the line.
    pub work_date: NaiveDate,
    /// Human-readable description.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_uses_midpoint_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("0.135")), dec("0.14"));
        assert_eq!(round_money(dec("-0.125")), dec("-0.13"));
    }

    #[test]
    fn test_round_money_keeps_whole_cents() {
        assert_eq!(round_money(dec("1211.25")), dec("1211.25"));
    }

    #[test]
    fn test_hour_class_serialization() {
        assert_eq!(
            serde_json::to_string(&HourClass::Overtime).unwrap(),
            "\"overtime\""
        );
        let class: HourClass = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(class, HourClass::Regular);
    }

    #[test]
    fn test_rate_source_serialization() {
        assert_eq!(
            serde_json::to_string(&RateSource::DefaultClientBillRate).unwrap(),
            "\"default_client_bill_rate\""
        );
    }

    #[test]
    fn test_pay_line_serializes_money_as_strings() {
        let line = PayLine {
            entry_id: Uuid::nil(),
            employee_id: "emp_001".to_string(),
            customer_id: "cust_boyle".to_string(),
            work_date: NaiveDate::from_ymd_opt(2026, 2, 6).unwrap(),
            week_start: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            class: HourClass::Overtime,
            hours: dec("8"),
            rate: dec("20.00"),
            rate_source: RateSource::DefaultPayRate,
            multiplier: dec("1.5"),
            amount: dec("240.00"),
            notes: None,
            holiday: None,
        };

        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"class\":\"overtime\""));
        assert!(json.contains("\"amount\":\"240.00\""));
        assert!(json.contains("\"work_date\":\"2026-02-06\""));
    }
}
