//! Rate resolution for payroll and billing.
//!
//! Two hierarchies read the same override table:
//!
//! | Mode    | 1st                | 2nd                          | 3rd                  | else |
//! |---------|--------------------|------------------------------|----------------------|------|
//! | Payroll | `RateOverride`     | `default_pay_rate`           |                      | 0    |
//! | Billing | `RateOverride`     | `default_client_bill_rate`   | `default_pay_rate`   | 0    |
//!
//! A negotiated override is the actual agreed rate, so both views share it.
//! Without one, billing carries margin and the hierarchies diverge.
//! Resolution runs per line at aggregation time; results are never reused
//! across lines.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, RateOverride, RateSource, ReportMode};

/// The outcome of resolving one line's rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResolution {
    /// The hourly rate.
    pub rate: Decimal,
    /// Which level of the hierarchy supplied it.
    pub source: RateSource,
}

impl RateResolution {
    /// Returns true if nothing was configured and the rate defaulted to zero.
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }

    fn fallback() -> Self {
        Self {
            rate: Decimal::ZERO,
            source: RateSource::Fallback,
        }
    }
}

/// The override rows fetched for one aggregation pass, keyed by pair.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    overrides: HashMap<(String, String), Decimal>,
}

impl RateTable {
    /// Builds a table from override rows. A later row for the same pair wins.
    pub fn new(overrides: impl IntoIterator<Item = RateOverride>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|o| ((o.employee_id, o.customer_id), o.bill_rate))
                .collect(),
        }
    }

    /// Returns the override for an (employee, customer) pair.
    pub fn get(&self, employee_id: &str, customer_id: &str) -> Option<Decimal> {
        self.overrides
            .get(&(employee_id.to_string(), customer_id.to_string()))
            .copied()
    }
}

/// Resolves the payroll rate: override, then default pay rate, then zero.
///
/// # Examples
///
/// ```
/// use timesheet_payroll::calculation::resolve_payroll_rate;
/// use timesheet_payroll::models::{Employee, EmployeeCategory, RateSource};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Sean Matthew".to_string(),
///     category: EmployeeCategory::Hourly,
///     default_pay_rate: Some(Decimal::from(20)),
///     default_client_bill_rate: Some(Decimal::from(45)),
///     aliases: vec![],
/// };
///
/// let resolved = resolve_payroll_rate(&employee, Some(Decimal::from(25)));
/// assert_eq!(resolved.rate, Decimal::from(25));
/// assert_eq!(resolved.source, RateSource::Override);
///
/// let resolved = resolve_payroll_rate(&employee, None);
/// assert_eq!(resolved.rate, Decimal::from(20));
/// ```
pub fn resolve_payroll_rate(employee: &Employee, override_rate: Option<Decimal>) -> RateResolution {
    if let Some(rate) = override_rate {
        return RateResolution {
            rate,
            source: RateSource::Override,
        };
    }

    match employee.default_pay_rate {
        Some(rate) => RateResolution {
            rate,
            source: RateSource::DefaultPayRate,
        },
        None => RateResolution::fallback(),
    }
}

/// Resolves the billing rate: override, then default client bill rate,
/// then default pay rate, then zero.
pub fn resolve_billing_rate(employee: &Employee, override_rate: Option<Decimal>) -> RateResolution {
    if let Some(rate) = override_rate {
        return RateResolution {
            rate,
            source: RateSource::Override,
        };
    }

    if let Some(rate) = employee.default_client_bill_rate {
        return RateResolution {
            rate,
            source: RateSource::DefaultClientBillRate,
        };
    }

    match employee.default_pay_rate {
        Some(rate) => RateResolution {
            rate,
            source: RateSource::DefaultPayRate,
        },
        None => RateResolution::fallback(),
    }
}

/// Resolves the rate for one line under the report's hierarchy.
pub fn resolve_rate(
    mode: ReportMode,
    employee: &Employee,
    customer_id: &str,
    rates: &RateTable,
) -> RateResolution {
    let override_rate = rates.get(&employee.id, customer_id);
    match mode {
        ReportMode::Payroll => resolve_payroll_rate(employee, override_rate),
        ReportMode::Billing => resolve_billing_rate(employee, override_rate),
    }
}
