//! Persistent storage for the payroll engine.
//!
//! Provides persistence for employees, customers, rate overrides, time
//! entries, weekly comments and the admin audit log using `rusqlite`.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. A `Database` can move between threads but cannot be shared
//! without external synchronization; callers serialize writes.
//!
//! # Schema
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as UTC text, so
//! lexicographic order matches chronological order. Decimal hours and
//! rates are stored as text to keep their exact scale.
//!
//! At most one active (non-archived) entry exists per
//! (employee, customer, work date); a partial unique index enforces this
//! and backs the draft upsert. Archived rows fall outside the index, so
//! archiving a period frees its keys.

mod audit;
mod entries;
mod reference;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

use crate::error::EngineResult;

pub use entries::UpsertOutcome;

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema. Safe to call on an initialized database.
    fn init(&self) -> EngineResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL CHECK (category IN ('hourly', 'admin')),
                default_pay_rate TEXT,
                default_client_bill_rate TEXT
            );

            CREATE TABLE IF NOT EXISTS employee_aliases (
                employee_id TEXT NOT NULL,
                alias TEXT NOT NULL,
                PRIMARY KEY (employee_id, alias),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT
            );

            CREATE TABLE IF NOT EXISTS rate_overrides (
                employee_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                bill_rate TEXT NOT NULL,
                PRIMARY KEY (employee_id, customer_id),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
                FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
            );

            -- status: 'draft' | 'submitted' | 'approved'
            -- archived: orthogonal to status; archived rows never aggregate
            CREATE TABLE IF NOT EXISTS time_entries (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                work_date TEXT NOT NULL,
                hours TEXT NOT NULL,
                notes TEXT,
                status TEXT NOT NULL DEFAULT 'draft'
                    CHECK (status IN ('draft', 'submitted', 'approved')),
                archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (employee_id) REFERENCES employees(id),
                FOREIGN KEY (customer_id) REFERENCES customers(id)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_time_entries_active_key
                ON time_entries(employee_id, customer_id, work_date)
                WHERE archived = 0;
            CREATE INDEX IF NOT EXISTS idx_time_entries_employee_date
                ON time_entries(employee_id, work_date);
            CREATE INDEX IF NOT EXISTS idx_time_entries_date ON time_entries(work_date);

            CREATE TABLE IF NOT EXISTS weekly_comments (
                employee_id TEXT NOT NULL,
                week_start TEXT NOT NULL,
                comment TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (employee_id, week_start),
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );

            -- action: dotted name, e.g. 'entry.force_delete'
            -- detail: JSON payload describing the bypass
            CREATE TABLE IF NOT EXISTS admin_audit (
                id TEXT PRIMARY KEY,
                action TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                detail TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_admin_audit_recorded ON admin_audit(recorded_at);
            ",
        )?;
        Ok(())
    }
}

/// Formats a timestamp with fixed millisecond precision so text order
/// matches time order.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a text column and parses it with `FromStr`.
///
/// Parse failures surface as `FromSqlConversionFailure` for that column.
fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Like [`parse_text`] for a nullable column.
fn parse_optional_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        t.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
