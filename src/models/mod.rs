//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod employee;
mod pay_line;
mod period;
mod report;
mod time_entry;

pub use audit::{AdminAction, AdminAuditRecord, AuditStep, ParseActionError};
pub use employee::{
    Customer, Employee, EmployeeCategory, MAX_HOURLY_RATE, ParseCategoryError, RateOverride,
};
pub use pay_line::{HourClass, PayLine, RateSource, RateWarning, round_money};
pub use period::{DateRange, FiscalPeriod, Holiday, WeekDay};
pub use report::{
    AggregationReport, CategoryTotals, CustomerSubtotal, EmployeeSummary, HoursAndPay,
    ReportMode, StatusFilter, WeekSummary,
};
pub use time_entry::{
    EntryInput, EntryStatus, MAX_ENTRY_HOURS, ParseStatusError, StatusChange, TimeEntry,
    WeeklyComment,
};
