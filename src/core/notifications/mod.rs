//! Notification log.
//!
//! Provides the store that owns the log and the snapshots handed to observers.

pub mod snapshot;
pub mod store;
