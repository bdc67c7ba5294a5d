//! Daily bill generator: rate rules, the employee directory, and bill export.

pub mod billing;
pub mod config;
pub mod error;
pub mod telemetry;
