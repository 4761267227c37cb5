// Severity -> surfacing policy. Kept as a plain lookup so it can be audited
// and tested without any presenter or store involved.

use serde::Serialize;

use crate::core::model::Severity;

/// Visual variant of a transient toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastStyle {
    Neutral,
    Success,
    Warning,
    Error,
}

/// How an alert of a given severity is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub style: ToastStyle,
    /// Whether the alert is appended to the notification log
    pub durable: bool,
}

/// System alerts are ambient and only toasted; everything else is also logged
/// for later review.
pub const fn policy_for(severity: Severity) -> AlertPolicy {
    match severity {
        Severity::System => AlertPolicy {
            style: ToastStyle::Neutral,
            durable: false,
        },
        Severity::Info => AlertPolicy {
            style: ToastStyle::Success,
            durable: true,
        },
        Severity::Warn => AlertPolicy {
            style: ToastStyle::Warning,
            durable: true,
        },
        Severity::Error => AlertPolicy {
            style: ToastStyle::Error,
            durable: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        let table: Vec<_> = Severity::all()
            .iter()
            .map(|s| (*s, policy_for(*s).style, policy_for(*s).durable))
            .collect();

        assert_eq!(
            table,
            vec![
                (Severity::System, ToastStyle::Neutral, false),
                (Severity::Info, ToastStyle::Success, true),
                (Severity::Warn, ToastStyle::Warning, true),
                (Severity::Error, ToastStyle::Error, true),
            ]
        );
    }

    #[test]
    fn test_only_system_is_transient() {
        let transient: Vec<_> = Severity::all()
            .iter()
            .filter(|s| !policy_for(**s).durable)
            .collect();
        assert_eq!(transient, vec![&Severity::System]);
    }
}
