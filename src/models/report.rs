//! Aggregation report models.
//!
//! An [`AggregationReport`] holds every number a payroll or billing report
//! must contain. Renderers format these values; they never recompute them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{
    AuditStep, DateRange, EmployeeCategory, EntryStatus, Holiday, HourClass, PayLine, RateWarning,
    round_money,
};

/// Which rate hierarchy a report prices lines under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Wages owed to employees.
    Payroll,
    /// Amounts billed to customers.
    Billing,
}

/// Which entry statuses a report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Approved entries only.
    #[default]
    ApprovedOnly,
    /// Submitted and approved entries.
    SubmittedAndApproved,
    /// Every status, for previews.
    All,
}

impl StatusFilter {
    /// Returns true if entries in `status` are eligible.
    pub fn includes(&self, status: EntryStatus) -> bool {
        match self {
            StatusFilter::ApprovedOnly => status == EntryStatus::Approved,
            StatusFilter::SubmittedAndApproved => status != EntryStatus::Draft,
            StatusFilter::All => true,
        }
    }
}

/// Regular/overtime hours and amounts for some slice of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursAndPay {
    /// Regular hours.
    pub regular_hours: Decimal,
    /// Overtime hours.
    pub overtime_hours: Decimal,
    /// Amount for regular hours.
    pub regular_amount: Decimal,
    /// Amount for overtime hours.
    pub overtime_amount: Decimal,
    /// Regular plus overtime amount.
    pub total_amount: Decimal,
}

impl HoursAndPay {
    /// Adds one priced line.
    ///
    /// Fails with a [`EngineError::Validation`] if a running total overflows.
    pub fn add_line(&mut self, line: &PayLine) -> EngineResult<()> {
        match line.class {
            HourClass::Regular => {
                self.regular_hours = checked_add(self.regular_hours, line.hours, "hours")?;
                self.regular_amount = checked_add(self.regular_amount, line.amount, "amount")?;
            }
            HourClass::Overtime => {
                self.overtime_hours = checked_add(self.overtime_hours, line.hours, "hours")?;
                self.overtime_amount = checked_add(self.overtime_amount, line.amount, "amount")?;
            }
        }
        self.total_amount = checked_add(self.total_amount, line.amount, "amount")?;
        Ok(())
    }

    /// Returns regular plus overtime hours.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours
    }

    /// Rounds amounts for display. Hours are left untouched.
    pub(crate) fn finalize(&mut self) {
        self.regular_amount = round_money(self.regular_amount);
        self.overtime_amount = round_money(self.overtime_amount);
        self.total_amount = round_money(self.total_amount);
    }
}

fn checked_add(left: Decimal, right: Decimal, field: &str) -> EngineResult<Decimal> {
    left.checked_add(right)
        .ok_or_else(|| EngineError::overflow(field))
}

/// Totals for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSubtotal {
    /// The customer.
    pub customer_id: String,
    /// The customer's display name.
    pub customer_name: String,
    /// Hours and amounts.
    pub totals: HoursAndPay,
}

/// Totals for one employee's payroll week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Last day of the week.
    pub week_end: NaiveDate,
    /// Hours and amounts for lines inside the report range.
    pub totals: HoursAndPay,
    /// The employee's comment for the week, if any.
    pub comment: Option<String>,
}

/// Totals for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// The employee.
    pub employee_id: String,
    /// The employee's display name.
    pub name: String,
    /// The employee's category.
    pub category: EmployeeCategory,
    /// Hours and amounts across the report.
    pub totals: HoursAndPay,
    /// Per-customer breakdown, ordered by customer id.
    pub customers: Vec<CustomerSubtotal>,
    /// Per-week breakdown, ordered by week start.
    pub weeks: Vec<WeekSummary>,
}

/// Grand totals split by employee category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// Non-exempt employees.
    pub hourly: HoursAndPay,
    /// Exempt employees.
    pub admin: HoursAndPay,
}

impl CategoryTotals {
    /// Returns the totals for one category.
    pub fn for_category_mut(&mut self, category: EmployeeCategory) -> &mut HoursAndPay {
        match category {
            EmployeeCategory::Hourly => &mut self.hourly,
            EmployeeCategory::Admin => &mut self.admin,
        }
    }
}

/// The complete output of an aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Which rate hierarchy priced the lines.
    pub mode: ReportMode,
    /// Which statuses were included.
    pub statuses: StatusFilter,
    /// The reported date range.
    pub range: DateRange,
    /// Every classified, priced line, ordered by employee, date and entry.
    pub lines: Vec<PayLine>,
    /// Per-employee totals, ordered by employee id.
    pub employees: Vec<EmployeeSummary>,
    /// Per-customer totals across all employees, ordered by customer id.
    pub customers: Vec<CustomerSubtotal>,
    /// Totals by employee category.
    pub category_totals: CategoryTotals,
    /// Totals across everything.
    pub grand_totals: HoursAndPay,
    /// Holidays falling inside the range.
    pub holidays: Vec<Holiday>,
    /// Lines priced by the zero-rate fallback.
    pub warnings: Vec<RateWarning>,
    /// Calculation decisions, in order.
    pub audit_steps: Vec<AuditStep>,
}

impl AggregationReport {
    /// Looks up an employee's summary.
    pub fn employee(&self, employee_id: &str) -> Option<&EmployeeSummary> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    /// Looks up a customer's subtotal.
    pub fn customer(&self, customer_id: &str) -> Option<&CustomerSubtotal> {
        self.customers.iter().find(|c| c.customer_id == customer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateSource;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_line(class: HourClass, hours: &str, amount: &str) -> PayLine {
        PayLine {
            entry_id: Uuid::nil(),
            employee_id: "emp_001".to_string(),
            customer_id: "cust_boyle".to_string(),
            work_date: NaiveDate::from_ymd_opt(2026, 2, 6).unwrap(),
            week_start: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            class,
            hours: dec(hours),
            rate: dec("20"),
            rate_source: RateSource::DefaultPayRate,
            multiplier: Decimal::ONE,
            amount: dec(amount),
            notes: None,
            holiday: None,
        }
    }

    #[test]
    fn test_status_filter_eligibility() {
        assert!(StatusFilter::ApprovedOnly.includes(EntryStatus::Approved));
        assert!(!StatusFilter::ApprovedOnly.includes(EntryStatus::Submitted));
        assert!(StatusFilter::SubmittedAndApproved.includes(EntryStatus::Submitted));
        assert!(!StatusFilter::SubmittedAndApproved.includes(EntryStatus::Draft));
        assert!(StatusFilter::All.includes(EntryStatus::Draft));
    }

    #[test]
    fn test_add_line_splits_by_class() {
        let mut totals = HoursAndPay::default();
        totals.add_line(&create_line(HourClass::Regular, "40", "800.00")).unwrap();
        totals.add_line(&create_line(HourClass::Overtime, "8", "240.00")).unwrap();

        assert_eq!(totals.regular_hours, dec("40"));
        assert_eq!(totals.overtime_hours, dec("8"));
        assert_eq!(totals.regular_amount, dec("800.00"));
        assert_eq!(totals.overtime_amount, dec("240.00"));
        assert_eq!(totals.total_amount, dec("1040.00"));
        assert_eq!(totals.total_hours(), dec("48"));
    }

    #[test]
    fn test_add_line_reports_overflow() {
        let mut totals = HoursAndPay {
            total_amount: Decimal::MAX,
            ..HoursAndPay::default()
        };
        let result = totals.add_line(&create_line(HourClass::Regular, "1", "1.00"));
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_finalize_rounds_amounts_but_not_hours() {
        let mut totals = HoursAndPay {
            regular_hours: dec("40.375"),
            overtime_hours: Decimal::ZERO,
            regular_amount: dec("1211.254"),
            overtime_amount: Decimal::ZERO,
            total_amount: dec("1211.254"),
        };
        totals.finalize();
        assert_eq!(totals.regular_hours, dec("40.375"));
        assert_eq!(totals.total_amount, dec("1211.25"));
    }
}
