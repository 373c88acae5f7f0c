//! The aggregation pass.
//!
//! Turns fetched rows into an [`AggregationReport`]: eligible entries are
//! partitioned by employee and payroll week, classified by the overtime
//! allocator, priced by the rate resolver, tagged with holidays and summed.
//! Everything here is a pure function of its inputs; fetching is the
//! caller's job.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::{CalendarResolver, holiday_on, holidays_between};
use crate::config::OvertimePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AggregationReport, AuditStep, CategoryTotals, Customer, CustomerSubtotal, DateRange, Employee,
    EmployeeSummary, HourClass, HoursAndPay, PayLine, RateWarning, ReportMode, StatusFilter,
    TimeEntry, WeekSummary, WeeklyComment, round_money,
};

use super::rate_resolver::{RateTable, resolve_rate};
use super::weekly_overtime::allocate_weekly_overtime;

/// What to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    /// The inclusive date range to report on.
    pub range: DateRange,
    /// Which rate hierarchy to price lines under.
    pub mode: ReportMode,
    /// Which statuses to include.
    #[serde(default)]
    pub statuses: StatusFilter,
}

impl AggregationRequest {
    /// A payroll report over approved entries.
    pub fn payroll(range: DateRange) -> Self {
        Self {
            range,
            mode: ReportMode::Payroll,
            statuses: StatusFilter::default(),
        }
    }

    /// A billing report over approved entries.
    pub fn billing(range: DateRange) -> Self {
        Self {
            range,
            mode: ReportMode::Billing,
            statuses: StatusFilter::default(),
        }
    }

    /// Replaces the status filter.
    pub fn with_statuses(mut self, statuses: StatusFilter) -> Self {
        self.statuses = statuses;
        self
    }
}

/// Rows fetched for one aggregation pass.
///
/// `entries` should cover the request range widened to whole payroll weeks,
/// otherwise overtime for weeks straddling the range edges is understated.
#[derive(Debug, Clone, Copy)]
pub struct AggregationInputs<'a> {
    /// Candidate time entries; ineligible ones are filtered out here.
    pub entries: &'a [TimeEntry],
    /// Every employee referenced by `entries`.
    pub employees: &'a [Employee],
    /// Every customer referenced by `entries`.
    pub customers: &'a [Customer],
    /// Rate overrides.
    pub rates: &'a RateTable,
    /// Weekly comments to attach to week summaries.
    pub comments: &'a [WeeklyComment],
}

#[derive(Default)]
struct EmployeeAccumulator {
    totals: HoursAndPay,
    customers: BTreeMap<String, HoursAndPay>,
    weeks: BTreeMap<NaiveDate, HoursAndPay>,
}

/// Aggregates eligible entries into a report.
///
/// Fails with [`EngineError::NotFound`] if an entry references an employee
/// or customer missing from `inputs`. Aggregating the same inputs twice
/// produces identical reports.
pub fn aggregate_entries(
    request: &AggregationRequest,
    inputs: &AggregationInputs<'_>,
    calendar: &CalendarResolver,
    policy: &OvertimePolicy,
) -> EngineResult<AggregationReport> {
    let range = request.range;
    let fetch_range = calendar.expand_to_weeks(range);

    let employees: HashMap<&str, &Employee> =
        inputs.employees.iter().map(|e| (e.id.as_str(), e)).collect();
    let customers: HashMap<&str, &Customer> =
        inputs.customers.iter().map(|c| (c.id.as_str(), c)).collect();
    let comments: HashMap<(&str, NaiveDate), &str> = inputs
        .comments
        .iter()
        .map(|c| ((c.employee_id.as_str(), c.week_start), c.comment.as_str()))
        .collect();

    let mut eligible: Vec<&TimeEntry> = inputs
        .entries
        .iter()
        .filter(|e| !e.archived && request.statuses.includes(e.status))
        .filter(|e| fetch_range.contains_date(e.work_date))
        .collect();
    eligible.sort_by(|a, b| {
        (&a.employee_id, a.work_date, a.created_at, a.id)
            .cmp(&(&b.employee_id, b.work_date, b.created_at, b.id))
    });

    let mut by_employee: BTreeMap<&str, BTreeMap<NaiveDate, Vec<TimeEntry>>> = BTreeMap::new();
    for entry in eligible {
        by_employee
            .entry(entry.employee_id.as_str())
            .or_default()
            .entry(calendar.week_start(entry.work_date))
            .or_default()
            .push(entry.clone());
    }

    let mut lines: Vec<PayLine> = Vec::new();
    let mut audit_steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<RateWarning> = Vec::new();
    let mut warned_entries = HashSet::new();
    let mut step_number: u32 = 1;

    let mut employee_summaries = Vec::new();
    let mut customer_totals: BTreeMap<String, HoursAndPay> = BTreeMap::new();
    let mut category_totals = CategoryTotals::default();
    let mut grand_totals = HoursAndPay::default();

    for (employee_id, weeks) in &by_employee {
        let employee = employees
            .get(employee_id)
            .copied()
            .ok_or_else(|| EngineError::not_found("Employee", *employee_id))?;
        let mut acc = EmployeeAccumulator::default();

        for (week_start, week_entries) in weeks {
            let allocation = allocate_weekly_overtime(
                week_entries,
                employee.category,
                policy.weekly_threshold_hours,
                step_number,
            )?;
            audit_steps.push(allocation.audit_step);
            step_number += 1;

            for portion in allocation.lines {
                if !range.contains_date(portion.work_date) {
                    continue;
                }
                if !customers.contains_key(portion.customer_id.as_str()) {
                    return Err(EngineError::not_found("Customer", portion.customer_id));
                }

                let resolved = resolve_rate(request.mode, employee, &portion.customer_id, inputs.rates);
                if resolved.is_fallback() && warned_entries.insert(portion.entry_id) {
                    warn!(
                        employee_id = %employee.id,
                        customer_id = %portion.customer_id,
                        entry_id = %portion.entry_id,
                        "no rate configured, pricing at zero"
                    );
                    warnings.push(RateWarning {
                        employee_id: employee.id.clone(),
                        customer_id: portion.customer_id.clone(),
                        entry_id: portion.entry_id,
                        work_date: portion.work_date,
                        message: format!(
                            "No {} rate configured for {} on {}; priced at 0",
                            mode_label(request.mode),
                            employee.name,
                            portion.customer_id
                        ),
                    });
                }

                let multiplier = match portion.class {
                    HourClass::Regular => Decimal::ONE,
                    HourClass::Overtime => policy.multiplier,
                };
                let amount = portion
                    .hours
                    .checked_mul(resolved.rate)
                    .and_then(|base| base.checked_mul(multiplier))
                    .map(round_money)
                    .ok_or_else(|| EngineError::overflow("amount"))?;
                let line = PayLine {
                    entry_id: portion.entry_id,
                    employee_id: employee.id.clone(),
                    customer_id: portion.customer_id,
                    work_date: portion.work_date,
                    week_start: *week_start,
                    class: portion.class,
                    hours: portion.hours,
                    rate: resolved.rate,
                    rate_source: resolved.source,
                    multiplier,
                    amount,
                    notes: portion.notes,
                    holiday: holiday_on(portion.work_date).map(|h| h.name),
                };

                acc.totals.add_line(&line)?;
                acc.customers
                    .entry(line.customer_id.clone())
                    .or_default()
                    .add_line(&line)?;
                acc.weeks.entry(*week_start).or_default().add_line(&line)?;
                customer_totals
                    .entry(line.customer_id.clone())
                    .or_default()
                    .add_line(&line)?;
                category_totals
                    .for_category_mut(employee.category)
                    .add_line(&line)?;
                grand_totals.add_line(&line)?;
                lines.push(line);
            }
        }

        if acc.weeks.is_empty() {
            continue;
        }
        employee_summaries.push(summarize_employee(employee, acc, &customers, &comments, calendar));
    }

    let mut customer_subtotals: Vec<CustomerSubtotal> = customer_totals
        .into_iter()
        .map(|(customer_id, totals)| customer_subtotal(customer_id, totals, &customers))
        .collect();
    for subtotal in &mut customer_subtotals {
        subtotal.totals.finalize();
    }
    category_totals.hourly.finalize();
    category_totals.admin.finalize();
    grand_totals.finalize();
    warnings.sort();

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "report_totals".to_string(),
        rule_name: "Report Totals".to_string(),
        input: serde_json::json!({
            "mode": request.mode,
            "statuses": request.statuses,
            "start": range.start.to_string(),
            "end": range.end.to_string(),
            "line_count": lines.len(),
        }),
        output: serde_json::json!({
            "regular_hours": grand_totals.regular_hours.normalize().to_string(),
            "overtime_hours": grand_totals.overtime_hours.normalize().to_string(),
            "total_amount": grand_totals.total_amount.to_string(),
            "fallback_rates": warnings.len(),
        }),
        reasoning: format!(
            "Summed {} lines for {} employees from {} to {}",
            lines.len(),
            employee_summaries.len(),
            range.start,
            range.end
        ),
    });

    Ok(AggregationReport {
        mode: request.mode,
        statuses: request.statuses,
        range,
        lines,
        employees: employee_summaries,
        customers: customer_subtotals,
        category_totals,
        grand_totals,
        holidays: holidays_between(range),
        warnings,
        audit_steps,
    })
}

fn summarize_employee(
    employee: &Employee,
    acc: EmployeeAccumulator,
    customers: &HashMap<&str, &Customer>,
    comments: &HashMap<(&str, NaiveDate), &str>,
    calendar: &CalendarResolver,
) -> EmployeeSummary {
    let mut totals = acc.totals;
    totals.finalize();

    let customer_breakdown = acc
        .customers
        .into_iter()
        .map(|(customer_id, mut totals)| {
            totals.finalize();
            customer_subtotal(customer_id, totals, customers)
        })
        .collect();

    let weeks = acc
        .weeks
        .into_iter()
        .map(|(week_start, mut totals)| {
            totals.finalize();
            WeekSummary {
                week_start,
                week_end: calendar.week_bounds(week_start).end,
                totals,
                comment: comments
                    .get(&(employee.id.as_str(), week_start))
                    .map(|c| c.to_string()),
            }
        })
        .collect();

    EmployeeSummary {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        category: employee.category,
        totals,
        customers: customer_breakdown,
        weeks,
    }
}

fn customer_subtotal(
    customer_id: String,
    totals: HoursAndPay,
    customers: &HashMap<&str, &Customer>,
) -> CustomerSubtotal {
    let customer_name = customers
        .get(customer_id.as_str())
        .map(|c| c.name.clone())
        .unwrap_or_else(|| customer_id.clone());
    CustomerSubtotal {
        customer_id,
        customer_name,
        totals,
    }
}

fn mode_label(mode: ReportMode) -> &'static str {
    match mode {
        ReportMode::Payroll => "pay",
        ReportMode::Billing => "bill",
    }
}
