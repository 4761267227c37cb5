// Alert routing for user-facing events.
//
// Architecture:
// - policy.rs: Severity -> toast style / durability lookup
// - presenter.rs: Toast presentation seam
// - router.rs: Dispatches an alert to the presenter and the notification log

pub mod policy;
pub mod presenter;
pub mod router;
