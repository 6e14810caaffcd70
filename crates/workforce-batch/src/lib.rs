//! Scheduled batch processing for the workforce groupware suite: monthly
//! attendance ledger creation, paid leave acquisition reconciliation, and
//! tenure-based paid leave grants.

pub mod batch;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
