//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation passes: rate resolution for the
//! payroll and billing hierarchies, weekly overtime allocation, the
//! aggregation pass that prices and sums lines, and reconciliation of a
//! finished report against external figures.

mod aggregation;
mod rate_resolver;
mod reconciliation;
mod weekly_overtime;

pub use aggregation::{AggregationInputs, AggregationRequest, aggregate_entries};
pub use rate_resolver::{
    RateResolution, RateTable, resolve_billing_rate, resolve_payroll_rate, resolve_rate,
};
pub use reconciliation::{
    ExpectedGross, RECONCILIATION_TOLERANCE, ReconciliationLine, ReconciliationStatus,
    ReconciliationSummary, reconcile,
};
pub use weekly_overtime::{AllocatedHours, WeeklyOvertimeAllocation, allocate_weekly_overtime};
