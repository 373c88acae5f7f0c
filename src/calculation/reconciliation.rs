//! Reconciliation of computed payroll against externally supplied figures.
//!
//! A report is the computed side; an external payroll export (or a
//! hand-checked labor distribution) supplies the expected gross, and
//! optionally hours, per employee. Any per-employee difference of a cent
//! (or a hundredth of an hour) or more is a mismatch.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AggregationReport, round_money};

/// Differences smaller than this are treated as equal.
pub const RECONCILIATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// An externally supplied figure for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedGross {
    /// The employee the figure belongs to.
    pub employee_id: String,
    /// Expected gross amount.
    pub gross: Decimal,
    /// Expected hours, if the source reports them.
    #[serde(default)]
    pub hours: Option<Decimal>,
}

/// How one employee's figures compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Within tolerance.
    Matched,
    /// Present on both sides but different.
    Mismatched,
    /// Expected but absent from the report.
    MissingFromReport,
    /// In the report but not in the expected figures.
    MissingFromExpected,
}

/// One employee's comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationLine {
    /// The employee.
    pub employee_id: String,
    /// Gross computed by the report (zero if absent).
    pub computed_gross: Decimal,
    /// Gross from the external source (zero if absent).
    pub expected_gross: Decimal,
    /// computed minus expected.
    pub gross_delta: Decimal,
    /// Hours computed by the report (zero if absent).
    pub computed_hours: Decimal,
    /// computed minus expected hours, when expected hours were supplied.
    pub hours_delta: Option<Decimal>,
    /// The outcome.
    pub status: ReconciliationStatus,
}

/// The outcome of reconciling a whole report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Per-employee comparisons, ordered by employee id.
    pub lines: Vec<ReconciliationLine>,
    /// Sum of computed gross across all lines.
    pub computed_total: Decimal,
    /// Sum of expected gross across all lines.
    pub expected_total: Decimal,
    /// Sum of absolute gross deltas.
    pub total_gap: Decimal,
}

impl ReconciliationSummary {
    /// Returns true if every line matched.
    pub fn is_clean(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.status == ReconciliationStatus::Matched)
    }

    /// Returns the lines that did not match.
    pub fn discrepancies(&self) -> impl Iterator<Item = &ReconciliationLine> {
        self.lines
            .iter()
            .filter(|l| l.status != ReconciliationStatus::Matched)
    }
}

/// Compares a report's per-employee gross against expected figures.
///
/// If `expected` names an employee twice, the last figure wins.
pub fn reconcile(report: &AggregationReport, expected: &[ExpectedGross]) -> ReconciliationSummary {
    let expected_by_employee: BTreeMap<&str, &ExpectedGross> = expected
        .iter()
        .map(|e| (e.employee_id.as_str(), e))
        .collect();
    let computed_by_employee: BTreeMap<&str, (Decimal, Decimal)> = report
        .employees
        .iter()
        .map(|e| {
            (
                e.employee_id.as_str(),
                (e.totals.total_amount, e.totals.total_hours()),
            )
        })
        .collect();

    let mut ids: Vec<&str> = expected_by_employee
        .keys()
        .chain(computed_by_employee.keys())
        .copied()
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let lines: Vec<ReconciliationLine> = ids
        .into_iter()
        .map(|id| {
            let computed = computed_by_employee.get(id).copied();
            let expected = expected_by_employee.get(id).copied();
            compare(id, computed, expected)
        })
        .collect();

    let computed_total = round_money(lines.iter().map(|l| l.computed_gross).sum());
    let expected_total = round_money(lines.iter().map(|l| l.expected_gross).sum());
    let total_gap = round_money(lines.iter().map(|l| l.gross_delta.abs()).sum());

    ReconciliationSummary {
        lines,
        computed_total,
        expected_total,
        total_gap,
    }
}

fn compare(
    employee_id: &str,
    computed: Option<(Decimal, Decimal)>,
    expected: Option<&ExpectedGross>,
) -> ReconciliationLine {
    let (computed_gross, computed_hours) = computed.unwrap_or_default();
    let expected_gross = expected.map(|e| e.gross).unwrap_or_default();
    let gross_delta = computed_gross - expected_gross;
    let hours_delta = expected
        .and_then(|e| e.hours)
        .map(|hours| computed_hours - hours);

    let status = match (computed, expected) {
        (None, Some(_)) => ReconciliationStatus::MissingFromReport,
        (Some(_), None) => ReconciliationStatus::MissingFromExpected,
        _ if gross_delta.abs() >= RECONCILIATION_TOLERANCE => ReconciliationStatus::Mismatched,
        _ if hours_delta.is_some_and(|d| d.abs() >= RECONCILIATION_TOLERANCE) => {
            ReconciliationStatus::Mismatched
        }
        _ => ReconciliationStatus::Matched,
    };

    ReconciliationLine {
        employee_id: employee_id.to_string(),
        computed_gross,
        expected_gross,
        gross_delta,
        computed_hours,
        hours_delta,
        status,
    }
}
