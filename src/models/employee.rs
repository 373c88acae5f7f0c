//! Employee, customer and rate override models.
//!
//! This module defines the reference data the engine prices time entries
//! against: who worked, for whom, and at which negotiated rate.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents the payroll classification of an employee.
///
/// The category decides overtime eligibility: hourly employees are
/// non-exempt, admin employees are exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeCategory {
    /// Non-exempt; weekly overtime applies.
    Hourly,
    /// Exempt; every hour is regular time.
    Admin,
}

impl EmployeeCategory {
    /// Returns the storage and wire representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeCategory::Hourly => "hourly",
            EmployeeCategory::Admin => "admin",
        }
    }

    /// Returns true if weekly overtime applies to the category.
    pub fn is_overtime_eligible(&self) -> bool {
        matches!(self, EmployeeCategory::Hourly)
    }
}

impl fmt::Display for EmployeeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown employee category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for EmployeeCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(EmployeeCategory::Hourly),
            "admin" => Ok(EmployeeCategory::Admin),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Represents an employee whose time is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Payroll classification.
    pub category: EmployeeCategory,
    /// Default hourly pay rate, if configured.
    #[serde(default)]
    pub default_pay_rate: Option<Decimal>,
    /// Default hourly rate billed to customers, if configured.
    #[serde(default)]
    pub default_client_bill_rate: Option<Decimal>,
    /// Alternative names used by upstream name resolution.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Employee {
    /// Returns true if weekly overtime applies to this employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use timesheet_payroll::models::{Employee, EmployeeCategory};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Sean Matthew".to_string(),
    ///     category: EmployeeCategory::Hourly,
    ///     default_pay_rate: None,
    ///     default_client_bill_rate: None,
    ///     aliases: vec![],
    /// };
    /// assert!(employee.is_overtime_eligible());
    /// ```
    pub fn is_overtime_eligible(&self) -> bool {
        self.category.is_overtime_eligible()
    }
}

/// Upper bound accepted for any configured hourly rate.
pub const MAX_HOURLY_RATE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// A customer that time is billed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier for the customer.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Postal address, if known.
    #[serde(default)]
    pub address: Option<String>,
}

/// A negotiated (employee, customer) rate.
///
/// Unique per pair and shared by the payroll and billing hierarchies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOverride {
    /// The employee the rate applies to.
    pub employee_id: String,
    /// The customer the rate applies to.
    pub customer_id: String,
    /// The agreed hourly rate.
    pub bill_rate: Decimal,
}
