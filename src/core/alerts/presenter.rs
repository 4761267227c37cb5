//! Transient toast presentation.
//!
//! The router does not know how toasts are drawn; the UI shell supplies a
//! [`ToastPresenter`]. Headless builds use [`LogPresenter`].

use log::{error, info, warn};
use thiserror::Error;

use super::policy::ToastStyle;
use crate::core::model::AlertPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentError {
    /// No UI is attached (window closed, not yet started, ...)
    #[error("toast presenter unavailable")]
    Unavailable,
    #[error("failed to present toast: {0}")]
    Failed(String),
}

/// Something that can show a short-lived toast.
pub trait ToastPresenter: Send + Sync {
    fn present(&self, style: ToastStyle, toast: &AlertPayload) -> Result<(), PresentError>;
}

/// Renders toasts as log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl ToastPresenter for LogPresenter {
    fn present(&self, style: ToastStyle, toast: &AlertPayload) -> Result<(), PresentError> {
        let description = toast.description.as_deref().unwrap_or("");
        match style {
            ToastStyle::Neutral | ToastStyle::Success => {
                info!(target: "toast", "{} {}", toast.title, description);
            }
            ToastStyle::Warning => warn!(target: "toast", "{} {}", toast.title, description),
            ToastStyle::Error => error!(target: "toast", "{} {}", toast.title, description),
        }
        Ok(())
    }
}

impl<P: ToastPresenter + ?Sized> ToastPresenter for std::sync::Arc<P> {
    fn present(&self, style: ToastStyle, toast: &AlertPayload) -> Result<(), PresentError> {
        (**self).present(style, toast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_presenter_never_fails() {
        let presenter = LogPresenter;
        for style in [
            ToastStyle::Neutral,
            ToastStyle::Success,
            ToastStyle::Warning,
            ToastStyle::Error,
        ] {
            assert!(presenter.present(style, &AlertPayload::new("hello")).is_ok());
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(PresentError::Unavailable.to_string(), "toast presenter unavailable");
        assert_eq!(
            PresentError::Failed("no window".into()).to_string(),
            "failed to present toast: no window"
        );
    }
}
