//! Time entry lifecycle and payroll computation engine.
//!
//! This crate records daily time entries per (employee, customer, work date),
//! moves them through a Draft → Submitted → Approved lifecycle, and
//! aggregates them into payroll or billing reports with weekly overtime,
//! rate hierarchies, US federal holiday tags and a 4-4-5 fiscal calendar.

#![warn(missing_docs)]

pub mod calculation;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod store;

pub use engine::PayrollEngine;
