//! Admin audit log persistence.

use rusqlite::params;

use crate::error::EngineResult;
use crate::models::AdminAuditRecord;

use super::{Database, format_timestamp, parse_text};

impl Database {
    /// Appends an administrative action to the audit log.
    pub fn record_admin_action(&self, record: &AdminAuditRecord) -> EngineResult<()> {
        self.conn.execute(
            "
            INSERT INTO admin_audit (id, action, actor_id, subject, detail, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                record.id.to_string(),
                record.action.as_str(),
                record.actor_id,
                record.subject,
                record.detail.to_string(),
                format_timestamp(record.recorded_at),
            ],
        )?;
        Ok(())
    }

    /// Lists the audit log oldest first.
    pub fn admin_actions(&self) -> EngineResult<Vec<AdminAuditRecord>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, action, actor_id, subject, detail, recorded_at
            FROM admin_audit
            ORDER BY recorded_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AdminAuditRecord {
                id: parse_text(row, 0)?,
                action: parse_text(row, 1)?,
                actor_id: row.get(2)?,
                subject: row.get(3)?,
                detail: parse_text(row, 4)?,
                recorded_at: parse_text(row, 5)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdminAction;
    use chrono::{Duration, SubsecRound, Utc};

    #[test]
    fn test_admin_actions_round_trip_in_order() {
        let db = Database::open_in_memory().unwrap();

        let mut first = AdminAuditRecord::new(
            AdminAction::ForceDelete,
            "emp_admin",
            "7f0c5c1e-3c55-4d1e-9d0e-1a2b3c4d5e6f",
            serde_json::json!({"status": "approved", "hours": "8"}),
        );
        first.recorded_at = Utc::now().trunc_subsecs(3);
        let mut second = AdminAuditRecord::new(
            AdminAction::UnsubmitWeek,
            "emp_admin",
            "emp_001@2026-02-02",
            serde_json::json!({"changed": 5}),
        );
        second.recorded_at = first.recorded_at + Duration::seconds(1);

        db.record_admin_action(&second).unwrap();
        db.record_admin_action(&first).unwrap();

        assert_eq!(db.admin_actions().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_empty_audit_log() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.admin_actions().unwrap().is_empty());
    }
}
