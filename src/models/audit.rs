//! Audit models.
//!
//! [`AuditStep`] records a calculation decision inside a report.
//! [`AdminAuditRecord`] records an administrative bypass of the entry
//! lifecycle (force delete, unsubmit, archive) and is persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Administrative operations that bypass the owner-only draft lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    /// An entry was deleted with `force`.
    ForceDelete,
    /// A week of entries was returned to draft.
    UnsubmitWeek,
    /// Approved entries in a closed period were archived.
    ArchiveRange,
}

impl AdminAction {
    /// Returns the storage representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::ForceDelete => "entry.force_delete",
            AdminAction::UnsubmitWeek => "week.unsubmit",
            AdminAction::ArchiveRange => "period.archive",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an action string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown admin action: {0}")]
pub struct ParseActionError(pub String);

impl FromStr for AdminAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry.force_delete" => Ok(AdminAction::ForceDelete),
            "week.unsubmit" => Ok(AdminAction::UnsubmitWeek),
            "period.archive" => Ok(AdminAction::ArchiveRange),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

/// A persisted administrative action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAuditRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// What was done.
    pub action: AdminAction,
    /// Who did it.
    pub actor_id: String,
    /// What it was done to (entry id, employee/week, or date range).
    pub subject: String,
    /// Action-specific details, such as the deleted entry's fields.
    pub detail: serde_json::Value,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl AdminAuditRecord {
    /// Creates a record stamped with a fresh id and the current time.
    pub fn new(
        action: AdminAction,
        actor_id: impl Into<String>,
        subject: impl Into<String>,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            actor_id: actor_id.into(),
            subject: subject.into(),
            detail,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_action_round_trips_through_storage_form() {
        for action in [
            AdminAction::ForceDelete,
            AdminAction::UnsubmitWeek,
            AdminAction::ArchiveRange,
        ] {
            assert_eq!(action.as_str().parse::<AdminAction>(), Ok(action));
        }
    }

    #[test]
    fn test_unknown_admin_action_is_rejected() {
        assert!("entry.delete".parse::<AdminAction>().is_err());
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "weekly_overtime".to_string(),
            rule_name: "Weekly Overtime Allocation".to_string(),
            input: serde_json::json!({"total_hours": "48"}),
            output: serde_json::json!({"overtime_hours": "8"}),
            reasoning: "48 hours exceeds 40 hour threshold".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"rule_id\":\"weekly_overtime\""));
        assert!(json.contains("\"total_hours\":\"48\""));
    }
}
