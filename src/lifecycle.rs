//! Time entry lifecycle.
//!
//! Entries move Draft → Submitted → Approved. Submission is a whole-week
//! bulk transition for one employee; approval is an explicit id list; the
//! only way back is an audited unsubmit. Drafts are the only editable state.
//! Archiving is independent of status and removes an entry from every
//! aggregation while keeping the row.
//!
//! Administrative bypasses (force delete, unsubmit, archive) are written to
//! the admin audit log and logged at `warn` level.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{PayrollEngine, require_id};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdminAction, AdminAuditRecord, DateRange, EntryInput, EntryStatus, MAX_ENTRY_HOURS,
    StatusChange, TimeEntry, WeeklyComment,
};
use crate::store::UpsertOutcome;

impl PayrollEngine {
    /// Creates the entry for (employee, customer, work date), or updates it
    /// while it is still a draft.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] if hours are not in `(0, 24]` or an id is empty
    /// - [`EngineError::NotFound`] if the employee or customer is unknown
    /// - [`EngineError::Locked`] if the active entry for the key is submitted
    ///   or approved
    pub fn create_or_update(&self, input: &EntryInput) -> EngineResult<TimeEntry> {
        require_id("employee_id", &input.employee_id)?;
        require_id("customer_id", &input.customer_id)?;
        if input.hours <= Decimal::ZERO {
            return Err(EngineError::validation(
                "hours",
                format!("must be greater than zero, got {}", input.hours),
            ));
        }
        if input.hours > MAX_ENTRY_HOURS {
            return Err(EngineError::validation(
                "hours",
                format!("must not exceed {}, got {}", MAX_ENTRY_HOURS, input.hours),
            ));
        }
        self.require_employee(&input.employee_id)?;
        self.require_customer(&input.customer_id)?;

        let normalized = EntryInput {
            notes: input
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            ..input.clone()
        };

        match self.db.upsert_draft_entry(&normalized, Utc::now())? {
            UpsertOutcome::Written(entry) => Ok(entry),
            UpsertOutcome::Locked(entry) => Err(EngineError::Locked {
                entry_id: entry.id.to_string(),
                status: entry.status,
            }),
        }
    }

    /// Submits every active draft of `employee_id` in the payroll week
    /// containing `date`. Returns the number of entries submitted.
    ///
    /// Submitting an already-submitted week changes nothing and returns 0.
    pub fn submit_week(&mut self, employee_id: &str, date: NaiveDate) -> EngineResult<usize> {
        self.require_employee(employee_id)?;
        let week = self.calendar.week_bounds(date);
        let changed = self.transition_week(employee_id, week, EntryStatus::submit)?;

        info!(
            employee_id = %employee_id,
            week_start = %week.start,
            submitted = changed,
            "Week submitted"
        );
        Ok(changed)
    }

    /// Returns every submitted or approved entry of `employee_id` in the
    /// payroll week containing `date` to draft. Audited.
    pub fn unsubmit_week(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        actor_id: &str,
    ) -> EngineResult<usize> {
        require_id("actor_id", actor_id)?;
        self.require_employee(employee_id)?;
        let week = self.calendar.week_bounds(date);
        let changed = self.transition_week(employee_id, week, EntryStatus::unsubmit)?;

        self.db.record_admin_action(&AdminAuditRecord::new(
            AdminAction::UnsubmitWeek,
            actor_id,
            format!("{}@{}", employee_id, week.start),
            serde_json::json!({
                "employee_id": employee_id,
                "week_start": week.start.to_string(),
                "week_end": week.end.to_string(),
                "changed": changed,
            }),
        ))?;
        warn!(
            actor_id = %actor_id,
            employee_id = %employee_id,
            week_start = %week.start,
            changed = changed,
            "Week unsubmitted"
        );
        Ok(changed)
    }

    /// Approves the submitted entries among `ids`.
    ///
    /// Unknown, archived, draft or already-approved ids are skipped. Returns
    /// the number of entries actually approved.
    pub fn approve(&mut self, ids: &[Uuid]) -> EngineResult<usize> {
        let mut seen = HashSet::new();
        let mut changes = Vec::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            let Some(entry) = self.db.entry(id)? else {
                continue;
            };
            if !entry.is_active() {
                continue;
            }
            if let Some(to) = entry.status.approve() {
                changes.push(StatusChange {
                    entry_id: id,
                    from: entry.status,
                    to,
                });
            }
        }

        let changed = self.db.apply_status_changes(&changes, Utc::now())?;
        info!(
            requested = ids.len(),
            approved = changed,
            "Entries approved"
        );
        Ok(changed)
    }

    /// Deletes an entry.
    ///
    /// Without `force`, only the owner may delete and only while the entry
    /// is a draft. `force` bypasses both checks and is audited.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if no entry has `entry_id`
    /// - [`EngineError::Ownership`] if `actor_id` does not own the entry
    /// - [`EngineError::Locked`] if the entry is past draft
    pub fn delete(&self, entry_id: Uuid, actor_id: &str, force: bool) -> EngineResult<()> {
        require_id("actor_id", actor_id)?;
        let entry = self
            .db
            .entry(entry_id)?
            .ok_or_else(|| EngineError::not_found("Time entry", entry_id.to_string()))?;

        if force {
            self.db.record_admin_action(&AdminAuditRecord::new(
                AdminAction::ForceDelete,
                actor_id,
                entry_id.to_string(),
                serde_json::json!({
                    "employee_id": entry.employee_id,
                    "customer_id": entry.customer_id,
                    "work_date": entry.work_date.to_string(),
                    "hours": entry.hours.to_string(),
                    "status": entry.status.as_str(),
                    "archived": entry.archived,
                }),
            ))?;
            warn!(
                actor_id = %actor_id,
                entry_id = %entry_id,
                owner_id = %entry.employee_id,
                status = %entry.status,
                "Entry force deleted"
            );
        } else {
            if entry.employee_id != actor_id {
                return Err(EngineError::Ownership {
                    entry_id: entry_id.to_string(),
                    owner_id: entry.employee_id,
                    actor_id: actor_id.to_string(),
                });
            }
            if !entry.status.is_mutable() {
                return Err(EngineError::Locked {
                    entry_id: entry_id.to_string(),
                    status: entry.status,
                });
            }
        }

        self.db.delete_entry(entry_id)?;
        Ok(())
    }

    /// Archives every active approved entry dated inside `range`. Audited.
    ///
    /// Archived entries drop out of every aggregation and free their
    /// (employee, customer, date) key for new entries.
    pub fn archive_range(&self, range: DateRange, actor_id: &str) -> EngineResult<usize> {
        require_id("actor_id", actor_id)?;
        let archived = self.db.archive_approved_in_range(range, Utc::now())?;

        self.db.record_admin_action(&AdminAuditRecord::new(
            AdminAction::ArchiveRange,
            actor_id,
            format!("{}..{}", range.start, range.end),
            serde_json::json!({
                "start": range.start.to_string(),
                "end": range.end.to_string(),
                "archived": archived,
            }),
        ))?;
        warn!(
            actor_id = %actor_id,
            start = %range.start,
            end = %range.end,
            archived = archived,
            "Range archived"
        );
        Ok(archived)
    }

    /// Sets the comment for the payroll week containing `date`.
    pub fn set_weekly_comment(
        &self,
        employee_id: &str,
        date: NaiveDate,
        text: &str,
    ) -> EngineResult<WeeklyComment> {
        self.require_employee(employee_id)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::validation("comment", "must not be empty"));
        }

        let comment = WeeklyComment {
            employee_id: employee_id.to_string(),
            week_start: self.calendar.week_start(date),
            comment: text.to_string(),
        };
        self.db.upsert_weekly_comment(&comment, Utc::now())?;
        Ok(comment)
    }

    /// Returns the comment for the payroll week containing `date`, if any.
    pub fn weekly_comment(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<WeeklyComment>> {
        self.db
            .weekly_comment(employee_id, self.calendar.week_start(date))
    }

    fn transition_week(
        &mut self,
        employee_id: &str,
        week: DateRange,
        transition: fn(EntryStatus) -> Option<EntryStatus>,
    ) -> EngineResult<usize> {
        let changes: Vec<StatusChange> = self
            .db
            .entries_for_employee(employee_id, week)?
            .into_iter()
            .filter_map(|entry| {
                transition(entry.status).map(|to| StatusChange {
                    entry_id: entry.id,
                    from: entry.status,
                    to,
                })
            })
            .collect();
        self.db.apply_status_changes(&changes, Utc::now())
    }
}
