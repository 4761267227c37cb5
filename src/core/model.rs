//! Data model for alerts and the notification log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an alert. Decides both toast styling and whether the
/// alert is kept in the notification log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Ephemeral system messages (connection state and the like)
    System,
    /// Normal messages worth reviewing later
    Info,
    /// Something happened that the user should look at
    Warn,
    /// Recoverable errors
    Error,
}

impl Severity {
    /// Get all severities, lowest tier first
    pub fn all() -> &'static [Severity] {
        &[Self::System, Self::Info, Self::Warn, Self::Error]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name one of the four severities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid alert severity {0:?}, expected one of System, Info, Warn, Error")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

/// What a caller supplies when raising an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AlertPayload {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Opaque key of a logged notification. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub(crate) u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A durable entry in the notification log.
///
/// Only the store creates these and only the store flips `seen`; everything
/// handed to observers is a read-only copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub seen: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub(crate) fn new(id: NotificationId, severity: Severity, base: AlertPayload) -> Self {
        Self {
            id,
            severity,
            title: base.title,
            description: base.description,
            seen: false,
            timestamp: Utc::now(),
        }
    }
}
