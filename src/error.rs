//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition the engine can raise. All of them are local and
//! recoverable; none should abort the process.

use thiserror::Error;

use crate::models::EntryStatus;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use timesheet_payroll::error::EngineError;
///
/// let error = EngineError::CalendarUnconfigured { year: 2031 };
/// assert_eq!(
///     error.to_string(),
///     "Fiscal calendar is not configured for year 2031"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A field was missing or malformed.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A mutation was attempted on an entry that is no longer a draft.
    #[error("Time entry '{entry_id}' is {status} and cannot be modified")]
    Locked {
        /// The locked entry.
        entry_id: String,
        /// The status that locks it.
        status: EntryStatus,
    },

    /// An employee, customer or entry id was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of record ("Employee", "Customer", "Time entry").
        kind: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A non-owning actor tried to delete an entry without force.
    #[error("Employee '{actor_id}' does not own time entry '{entry_id}' (owner '{owner_id}')")]
    Ownership {
        /// The entry being deleted.
        entry_id: String,
        /// The employee that owns the entry.
        owner_id: String,
        /// The employee attempting the delete.
        actor_id: String,
    },

    /// A fiscal period was requested for a year with no configured anchor.
    #[error("Fiscal calendar is not configured for year {year}")]
    CalendarUnconfigured {
        /// The fiscal year that has no anchor.
        year: i32,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The configured timezone is not a known IANA zone.
    #[error("Unknown timezone: {name}")]
    InvalidTimezone {
        /// The zone name from configuration.
        name: String,
    },

    /// An error from the embedded store.
    ///
    /// Rows that fail to decode surface here as
    /// `rusqlite::Error::FromSqlConversionFailure`.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the [`EngineError::Validation`] raised when decimal
    /// arithmetic on `field` leaves the representable range.
    pub fn overflow(field: impl Into<String>) -> Self {
        Self::validation(field, "arithmetic overflow")
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
