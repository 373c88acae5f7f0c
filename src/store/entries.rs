//! Time entry persistence.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, EntryInput, EntryStatus, StatusChange, TimeEntry};

use super::{Database, format_timestamp, parse_text};

const ENTRY_COLUMNS: &str = "id, employee_id, customer_id, work_date, hours, notes, status, archived, created_at, updated_at";

/// The result of a draft upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The entry was created or its draft was updated.
    Written(TimeEntry),
    /// The active entry for the key is past draft and was left unchanged.
    Locked(TimeEntry),
}

impl Database {
    /// Creates the active entry for the input's key, or updates it in place
    /// while it is still a draft.
    ///
    /// A single statement resolves the conflict against the partial unique
    /// index, so a second write to the same key never creates a duplicate.
    pub fn upsert_draft_entry(
        &self,
        input: &EntryInput,
        now: DateTime<Utc>,
    ) -> EngineResult<UpsertOutcome> {
        let changed = self.conn.execute(
            "
            INSERT INTO time_entries
                (id, employee_id, customer_id, work_date, hours, notes, status, archived, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'draft', 0, ?7, ?7)
            ON CONFLICT (employee_id, customer_id, work_date) WHERE archived = 0
            DO UPDATE SET
                hours = excluded.hours,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            WHERE time_entries.status = 'draft'
            ",
            params![
                Uuid::new_v4().to_string(),
                input.employee_id,
                input.customer_id,
                input.work_date,
                input.hours.to_string(),
                input.notes,
                format_timestamp(now),
            ],
        )?;

        let entry = self
            .active_entry(&input.employee_id, &input.customer_id, input.work_date)?
            .ok_or_else(|| {
                EngineError::not_found(
                    "Time entry",
                    format!(
                        "{}/{}/{}",
                        input.employee_id, input.customer_id, input.work_date
                    ),
                )
            })?;

        if changed == 0 {
            Ok(UpsertOutcome::Locked(entry))
        } else {
            Ok(UpsertOutcome::Written(entry))
        }
    }

    /// Looks up an entry by id, archived or not.
    pub fn entry(&self, id: Uuid) -> EngineResult<Option<TimeEntry>> {
        let sql = format!("SELECT {} FROM time_entries WHERE id = ?1", ENTRY_COLUMNS);
        let entry = self
            .conn
            .query_row(&sql, [id.to_string()], entry_from_row)
            .optional()?;
        Ok(entry)
    }

    /// Looks up the active entry for a composite key.
    pub fn active_entry(
        &self,
        employee_id: &str,
        customer_id: &str,
        work_date: NaiveDate,
    ) -> EngineResult<Option<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries
             WHERE employee_id = ?1 AND customer_id = ?2 AND work_date = ?3 AND archived = 0",
            ENTRY_COLUMNS
        );
        let entry = self
            .conn
            .query_row(&sql, params![employee_id, customer_id, work_date], entry_from_row)
            .optional()?;
        Ok(entry)
    }

    /// Lists one employee's active entries dated inside `range`.
    ///
    /// Ordered by work date, then creation time, then id.
    pub fn entries_for_employee(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries
             WHERE employee_id = ?1 AND work_date BETWEEN ?2 AND ?3 AND archived = 0
             ORDER BY work_date ASC, created_at ASC, id ASC",
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![employee_id, range.start, range.end], entry_from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Lists every active entry dated inside `range`.
    ///
    /// Ordered by employee, work date, creation time, then id.
    pub fn entries_in_range(&self, range: DateRange) -> EngineResult<Vec<TimeEntry>> {
        let sql = format!(
            "SELECT {} FROM time_entries
             WHERE work_date BETWEEN ?1 AND ?2 AND archived = 0
             ORDER BY employee_id ASC, work_date ASC, created_at ASC, id ASC",
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![range.start, range.end], entry_from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Applies status changes in one transaction.
    ///
    /// Each change is a compare-and-set: it only applies if the active row
    /// still holds `from`. Returns the number of rows actually changed.
    pub fn apply_status_changes(
        &mut self,
        changes: &[StatusChange],
        now: DateTime<Utc>,
    ) -> EngineResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        let now = format_timestamp(now);
        let tx = self.conn.transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "
                UPDATE time_entries
                SET status = ?1, updated_at = ?2
                WHERE id = ?3 AND status = ?4 AND archived = 0
                ",
            )?;
            for change in changes {
                changed += stmt.execute(params![
                    change.to.as_str(),
                    now,
                    change.entry_id.to_string(),
                    change.from.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Removes an entry. Returns false if no row had that id.
    pub fn delete_entry(&self, id: Uuid) -> EngineResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM time_entries WHERE id = ?1", [id.to_string()])?;
        Ok(deleted > 0)
    }

    /// Archives every active approved entry dated inside `range`.
    pub fn archive_approved_in_range(
        &self,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> EngineResult<usize> {
        let archived = self.conn.execute(
            "
            UPDATE time_entries
            SET archived = 1, updated_at = ?1
            WHERE archived = 0 AND status = ?2 AND work_date BETWEEN ?3 AND ?4
            ",
            params![
                format_timestamp(now),
                EntryStatus::Approved.as_str(),
                range.start,
                range.end,
            ],
        )?;
        Ok(archived)
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: parse_text(row, 0)?,
        employee_id: row.get(1)?,
        customer_id: row.get(2)?,
        work_date: row.get(3)?,
        hours: parse_text(row, 4)?,
        notes: row.get(5)?,
        status: parse_text(row, 6)?,
        archived: row.get(7)?,
        created_at: parse_text(row, 8)?,
        updated_at: parse_text(row, 9)?,
    })
}
