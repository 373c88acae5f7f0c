//! Weekly overtime allocation.
//!
//! Overtime is a weekly, cumulative concept: the threshold applies to the
//! running total of an employee's hours across the payroll week, not to any
//! single day. Entries are walked in date order and each one is classified
//! as regular, overtime, or split across the threshold.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, EmployeeCategory, HourClass, TimeEntry};

/// One regular or overtime portion of a time entry.
///
/// A straddling entry yields two portions that share every field except
/// `hours` and `class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedHours {
    /// The entry this portion came from.
    pub entry_id: Uuid,
    /// The customer the work was done for.
    pub customer_id: String,
    /// The date the work was done on.
    pub work_date: NaiveDate,
    /// Notes carried from the entry.
    pub notes: Option<String>,
    /// Hours in this portion.
    pub hours: Decimal,
    /// Regular or overtime.
    pub class: HourClass,
}

/// The result of allocating one employee's payroll week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyOvertimeAllocation {
    /// Allocated portions in walk order.
    pub lines: Vec<AllocatedHours>,
    /// Total regular hours for the week.
    pub regular_hours: Decimal,
    /// Total overtime hours for the week.
    pub overtime_hours: Decimal,
    /// The audit step recording this allocation.
    pub audit_step: AuditStep,
}

/// Classifies one employee's entries for one payroll week.
///
/// `entries` must already be in date order. Admin employees are exempt and
/// every hour is regular. For hourly employees the cumulative total is
/// tracked across the walk:
///
/// - an entry that ends at or below `threshold` is regular
/// - an entry that starts at or above `threshold` is overtime
/// - an entry that crosses it becomes a regular portion followed by an
///   overtime portion
///
/// Hours are never rounded, so regular plus overtime always equals the raw
/// total. A running total that leaves the decimal range fails with
/// [`EngineError::Validation`].
///
/// # Examples
///
/// ```
/// use timesheet_payroll::calculation::allocate_weekly_overtime;
/// use timesheet_payroll::models::{EmployeeCategory, EntryStatus, HourClass, TimeEntry};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let entry = |day: u32, hours: i64| TimeEntry {
///     id: Uuid::new_v4(),
///     employee_id: "emp_001".to_string(),
///     customer_id: "cust_boyle".to_string(),
///     work_date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
///     hours: Decimal::from(hours),
///     notes: None,
///     status: EntryStatus::Approved,
///     archived: false,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// // 4 × 10h then 8h: the fifth entry is entirely overtime
/// let entries: Vec<TimeEntry> = (2..=6).map(|d| entry(d, if d < 6 { 10 } else { 8 })).collect();
/// let result =
///     allocate_weekly_overtime(&entries, EmployeeCategory::Hourly, Decimal::from(40), 1).unwrap();
///
/// assert_eq!(result.regular_hours, Decimal::from(40));
/// assert_eq!(result.overtime_hours, Decimal::from(8));
/// assert_eq!(result.lines.last().unwrap().class, HourClass::Overtime);
/// ```
pub fn allocate_weekly_overtime(
    entries: &[TimeEntry],
    category: EmployeeCategory,
    threshold: Decimal,
    step_number: u32,
) -> EngineResult<WeeklyOvertimeAllocation> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    let mut cumulative = Decimal::ZERO;
    let mut regular_hours = Decimal::ZERO;
    let mut overtime_hours = Decimal::ZERO;
    let mut split_entries = Vec::new();

    for entry in entries {
        let before = cumulative;
        cumulative = add_hours(cumulative, entry.hours)?;

        if !category.is_overtime_eligible() || cumulative <= threshold {
            regular_hours = add_hours(regular_hours, entry.hours)?;
            lines.push(portion(entry, entry.hours, HourClass::Regular));
        } else if before >= threshold {
            overtime_hours = add_hours(overtime_hours, entry.hours)?;
            lines.push(portion(entry, entry.hours, HourClass::Overtime));
        } else {
            let regular = threshold
                .checked_sub(before)
                .ok_or_else(|| EngineError::overflow("hours"))?;
            let overtime = entry.hours - regular;
            regular_hours = add_hours(regular_hours, regular)?;
            overtime_hours = add_hours(overtime_hours, overtime)?;
            lines.push(portion(entry, regular, HourClass::Regular));
            lines.push(portion(entry, overtime, HourClass::Overtime));
            split_entries.push(entry.id.to_string());
        }
    }

    let total_hours = add_hours(regular_hours, overtime_hours)?;
    let reasoning = if !category.is_overtime_eligible() {
        format!(
            "{} hours worked by {} employee; exempt, all hours regular",
            total_hours.normalize(),
            category
        )
    } else if overtime_hours > Decimal::ZERO {
        format!(
            "{} hours worked exceeds {} hour weekly threshold by {} hours, triggering overtime",
            total_hours.normalize(),
            threshold.normalize(),
            overtime_hours.normalize()
        )
    } else {
        format!(
            "{} hours worked is within {} hour weekly threshold, no overtime triggered",
            total_hours.normalize(),
            threshold.normalize()
        )
    };

    debug!(
        category = %category,
        entries = entries.len(),
        regular_hours = %regular_hours,
        overtime_hours = %overtime_hours,
        "allocated weekly overtime"
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "weekly_overtime_allocation".to_string(),
        rule_name: "Weekly Overtime Allocation".to_string(),
        input: serde_json::json!({
            "category": category.as_str(),
            "entry_count": entries.len(),
            "total_hours": total_hours.normalize().to_string(),
            "threshold": threshold.normalize().to_string(),
            "first_work_date": entries.first().map(|e| e.work_date.to_string()),
        }),
        output: serde_json::json!({
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "split_entries": split_entries,
        }),
        reasoning,
    };

    Ok(WeeklyOvertimeAllocation {
        lines,
        regular_hours,
        overtime_hours,
        audit_step,
    })
}

fn add_hours(left: Decimal, right: Decimal) -> EngineResult<Decimal> {
    left.checked_add(right)
        .ok_or_else(|| EngineError::overflow("hours"))
}

fn portion(entry: &TimeEntry, hours: Decimal, class: HourClass) -> AllocatedHours {
    AllocatedHours {
        entry_id: entry.id,
        customer_id: entry.customer_id.clone(),
        work_date: entry.work_date,
        notes: entry.notes.clone(),
        hours,
        class,
    }
}
