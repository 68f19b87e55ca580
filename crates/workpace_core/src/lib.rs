//! Task tracking with planned vs. actual time and efficiency reporting.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod report_api;
pub mod storage;
pub mod task_api;
