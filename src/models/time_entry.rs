//! Time entry model and its status lifecycle.
//!
//! A [`TimeEntry`] records hours one employee worked for one customer on one
//! date. Its [`EntryStatus`] is the logical lock on the row: drafts are
//! mutable by their owner, anything later is frozen until an explicit
//! unsubmit. Archival is a separate flag and never changes the status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The lifecycle state of a time entry.
///
/// Forward path is Draft → Submitted → Approved. The only way back is
/// [`EntryStatus::unsubmit`], which is an administrative operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Editable by the owning employee.
    Draft,
    /// Handed in for the week; awaiting approval.
    Submitted,
    /// Approved for payroll and billing.
    Approved,
}

impl EntryStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Submitted => "submitted",
            EntryStatus::Approved => "approved",
        }
    }

    /// Returns true if the entry may still be edited or deleted by its owner.
    pub fn is_mutable(&self) -> bool {
        *self == EntryStatus::Draft
    }

    /// The status after a weekly submit, if the entry takes part in it.
    ///
    /// # Example
    ///
    /// ```
    /// use timesheet_payroll::models::EntryStatus;
    ///
    /// assert_eq!(EntryStatus::Draft.submit(), Some(EntryStatus::Submitted));
    /// assert_eq!(EntryStatus::Approved.submit(), None);
    /// ```
    pub fn submit(self) -> Option<EntryStatus> {
        match self {
            EntryStatus::Draft => Some(EntryStatus::Submitted),
            EntryStatus::Submitted | EntryStatus::Approved => None,
        }
    }

    /// The status after approval, if the entry is eligible.
    pub fn approve(self) -> Option<EntryStatus> {
        match self {
            EntryStatus::Submitted => Some(EntryStatus::Approved),
            EntryStatus::Draft | EntryStatus::Approved => None,
        }
    }

    /// The status after an administrative unsubmit, if the entry is eligible.
    pub fn unsubmit(self) -> Option<EntryStatus> {
        match self {
            EntryStatus::Submitted | EntryStatus::Approved => Some(EntryStatus::Draft),
            EntryStatus::Draft => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entry status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for EntryStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EntryStatus::Draft),
            "submitted" => Ok(EntryStatus::Submitted),
            "approved" => Ok(EntryStatus::Approved),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A stored record of hours worked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Unique identifier, assigned on first write.
    pub id: Uuid,
    /// The employee who did the work.
    pub employee_id: String,
    /// The customer the work was done for.
    pub customer_id: String,
    /// The local date the work was done on.
    pub work_date: NaiveDate,
    /// Hours worked; always positive.
    pub hours: Decimal,
    /// Free-text notes, including any provenance hint from upstream tools.
    pub notes: Option<String>,
    /// Lifecycle state.
    pub status: EntryStatus,
    /// Whether the entry belongs to a closed period.
    pub archived: bool,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Returns true if the entry takes part in aggregation and key uniqueness.
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}

/// Upper bound on the hours of a single entry: one calendar day.
pub const MAX_ENTRY_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// The caller-supplied fields of a time entry write.
///
/// Manual input and upstream extraction tools both produce this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// The employee who did the work.
    pub employee_id: String,
    /// The customer the work was done for.
    pub customer_id: String,
    /// The local date the work was done on.
    pub work_date: NaiveDate,
    /// Hours worked.
    pub hours: Decimal,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A requested status change, applied only if the row still holds `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// The entry to change.
    pub entry_id: Uuid,
    /// The status the entry is expected to hold.
    pub from: EntryStatus,
    /// The status to move it to.
    pub to: EntryStatus,
}

/// Free-text comment attached to one employee's payroll week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyComment {
    /// The employee the comment belongs to.
    pub employee_id: String,
    /// First day of the payroll week.
    pub week_start: NaiveDate,
    /// The comment text.
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_drafts_are_mutable() {
        assert!(EntryStatus::Draft.is_mutable());
        assert!(!EntryStatus::Submitted.is_mutable());
        assert!(!EntryStatus::Approved.is_mutable());
    }

    #[test]
    fn test_submit_moves_only_drafts() {
        assert_eq!(EntryStatus::Draft.submit(), Some(EntryStatus::Submitted));
        assert_eq!(EntryStatus::Submitted.submit(), None);
        assert_eq!(EntryStatus::Approved.submit(), None);
    }

    #[test]
    fn test_approve_moves_only_submitted() {
        assert_eq!(EntryStatus::Draft.approve(), None);
        assert_eq!(EntryStatus::Submitted.approve(), Some(EntryStatus::Approved));
        assert_eq!(EntryStatus::Approved.approve(), None);
    }

    #[test]
    fn test_unsubmit_returns_locked_entries_to_draft() {
        assert_eq!(EntryStatus::Draft.unsubmit(), None);
        assert_eq!(EntryStatus::Submitted.unsubmit(), Some(EntryStatus::Draft));
        assert_eq!(EntryStatus::Approved.unsubmit(), Some(EntryStatus::Draft));
    }

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [
            EntryStatus::Draft,
            EntryStatus::Submitted,
            EntryStatus::Approved,
        ] {
            assert_eq!(status.as_str().parse::<EntryStatus>(), Ok(status));
        }
        assert_eq!(
            "APPROVED".parse::<EntryStatus>(),
            Err(ParseStatusError("APPROVED".to_string()))
        );
    }

    #[test]
    fn test_deserialize_entry_input() {
        let json = r#"{
            "employee_id": "emp_001",
            "customer_id": "cust_boyle",
            "work_date": "2026-02-04",
            "hours": "7.5"
        }"#;

        let input: EntryInput = serde_json::from_str(json).unwrap();
        assert_eq!(
            input.work_date,
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
        assert_eq!(input.hours, Decimal::new(75, 1));
        assert!(input.notes.is_none());
    }
}
