#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
// The ultimate strictness: catches things like missing documentation or overflow risks
#![warn(clippy::restriction)]
pub mod core;

pub use crate::core::alerts::router::AlertRouter;
pub use crate::core::model::{AlertPayload, Notification, NotificationId, Severity};
pub use crate::core::notifications::store::NotificationStore;
