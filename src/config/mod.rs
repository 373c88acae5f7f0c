//! Configuration loading and management for the payroll engine.
//!
//! This module loads the process-wide settings: operating timezone,
//! payroll-week start weekday, fiscal-year anchors and overtime policy.
//!
//! # Example
//!
//! ```no_run
//! use timesheet_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Weeks start on {}", config.config().calendar.week_start);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CalendarSettings, DEFAULT_OVERTIME_MULTIPLIER, DEFAULT_WEEKLY_OVERTIME_THRESHOLD,
    EngineConfig, OvertimePolicy, RawEngineConfig,
};
