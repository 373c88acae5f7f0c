//! The payroll engine facade.
//!
//! [`PayrollEngine`] owns the store, the loaded configuration and a calendar
//! resolver built from it. Lifecycle operations live in
//! [`lifecycle`](crate::lifecycle); reference data and reporting live here.

use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::{
    AggregationInputs, AggregationRequest, RateTable, aggregate_entries,
};
use crate::calendar::CalendarResolver;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AggregationReport, Customer, Employee, MAX_HOURLY_RATE, RateOverride, ReportMode,
    StatusFilter,
};
use crate::store::Database;

/// Entry point for entry lifecycle, reference data and reporting.
///
/// # Example
///
/// ```
/// use timesheet_payroll::PayrollEngine;
/// use timesheet_payroll::calculation::AggregationRequest;
/// use timesheet_payroll::config::EngineConfig;
/// use timesheet_payroll::models::DateRange;
/// use timesheet_payroll::store::Database;
/// use chrono::NaiveDate;
///
/// let engine = PayrollEngine::new(Database::open_in_memory().unwrap(), EngineConfig::default());
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
/// )
/// .unwrap();
///
/// let report = engine.aggregate(&AggregationRequest::payroll(range)).unwrap();
/// assert!(report.lines.is_empty());
/// ```
pub struct PayrollEngine {
    pub(crate) db: Database,
    config: EngineConfig,
    pub(crate) calendar: CalendarResolver,
}

impl PayrollEngine {
    /// Creates an engine over an opened store.
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let calendar = CalendarResolver::new(config.calendar.clone());
        Self {
            db,
            config,
            calendar,
        }
    }

    /// Returns the store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the calendar resolver.
    pub fn calendar(&self) -> &CalendarResolver {
        &self.calendar
    }

    /// Adds or replaces an employee.
    pub fn register_employee(&mut self, employee: &Employee) -> EngineResult<()> {
        require_id("employee_id", &employee.id)?;
        for (field, rate) in [
            ("default_pay_rate", employee.default_pay_rate),
            ("default_client_bill_rate", employee.default_client_bill_rate),
        ] {
            if let Some(rate) = rate {
                require_rate(field, rate)?;
            }
        }
        self.db.upsert_employee(employee)
    }

    /// Adds or replaces a customer.
    pub fn register_customer(&self, customer: &Customer) -> EngineResult<()> {
        require_id("customer_id", &customer.id)?;
        self.db.upsert_customer(customer)
    }

    /// Sets the negotiated rate for an (employee, customer) pair.
    pub fn set_rate_override(&self, rate: &RateOverride) -> EngineResult<()> {
        require_rate("bill_rate", rate.bill_rate)?;
        self.require_employee(&rate.employee_id)?;
        self.require_customer(&rate.customer_id)?;
        self.db.set_rate_override(rate)
    }

    /// Aggregates a date range into a report.
    ///
    /// Entries are fetched for the range widened to whole payroll weeks so
    /// that overtime in edge weeks counts hours worked outside the range.
    pub fn aggregate(&self, request: &AggregationRequest) -> EngineResult<AggregationReport> {
        let fetch_range = self.calendar.expand_to_weeks(request.range);
        let entries = self.db.entries_in_range(fetch_range)?;
        let employees = self.db.employees()?;
        let customers = self.db.customers()?;
        let rates = RateTable::new(self.db.rate_overrides()?);
        let comments = self.db.weekly_comments_in_range(fetch_range)?;

        let inputs = AggregationInputs {
            entries: &entries,
            employees: &employees,
            customers: &customers,
            rates: &rates,
            comments: &comments,
        };
        let report = aggregate_entries(request, &inputs, &self.calendar, &self.config.overtime)?;

        info!(
            mode = ?report.mode,
            start = %report.range.start,
            end = %report.range.end,
            lines = report.lines.len(),
            employees = report.employees.len(),
            total = %report.grand_totals.total_amount,
            fallback_rates = report.warnings.len(),
            "Aggregation completed"
        );

        Ok(report)
    }

    /// Aggregates one 4-4-5 fiscal month.
    ///
    /// Fails with [`EngineError::CalendarUnconfigured`] if the fiscal year
    /// has no configured anchor.
    pub fn aggregate_fiscal_month(
        &self,
        year: i32,
        month: u32,
        mode: ReportMode,
        statuses: StatusFilter,
    ) -> EngineResult<AggregationReport> {
        let range = self.calendar.fiscal_month_range(year, month)?;
        self.aggregate(&AggregationRequest {
            range,
            mode,
            statuses,
        })
    }

    pub(crate) fn require_employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.db
            .employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("Employee", employee_id))
    }

    pub(crate) fn require_customer(&self, customer_id: &str) -> EngineResult<Customer> {
        self.db
            .customer(customer_id)?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))
    }
}

pub(crate) fn require_id(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_rate(field: &str, value: Decimal) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::validation(
            field,
            format!("rate must not be negative, got {}", value),
        ));
    }
    if value > MAX_HOURLY_RATE {
        return Err(EngineError::validation(
            field,
            format!("rate must not exceed {}, got {}", MAX_HOURLY_RATE, value),
        ));
    }
    Ok(())
}
