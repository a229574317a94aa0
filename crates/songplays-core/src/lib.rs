//! Engine-independent building blocks for the songplays star schema.
//!
//! This crate provides the foundational pieces shared by the pipeline stages:
//!
//! - Storage locations, raw-record discovery under the input root, and the
//!   overwrite helper for table subpaths under the output root (`storage`).
//! - Relative path conventions for inputs and each output table
//!   (`storage::layout`).
//! - The five star-schema tables with their columns and partition keys
//!   (`tables`).
//! - Fixed Arrow schemas used to load raw JSON records (`schema`).
//! - The calendar convention that turns play timestamps into `time`
//!   dimension parts (`calendar`).
//!
//! The DataFusion stages live in `songplays-datafusion`; this crate keeps
//! DataFusion types out so the conventions can be reused by other engines.
#![deny(missing_docs)]

pub mod calendar;
pub mod schema;
pub mod storage;
pub mod tables;

pub use calendar::{CalendarParts, ParseTimezoneError, ReportingTimezone};
pub use storage::{StorageError, StorageLocation, StorageResult};
pub use tables::StarTable;
