//! Single entry point for user-facing alerts.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{error, warn};

use super::policy::policy_for;
use super::presenter::{LogPresenter, ToastPresenter};
use crate::core::model::{AlertPayload, Notification, Severity};
use crate::core::notifications::store::NotificationStore;

/// Shows a toast for every alert and logs the durable ones.
///
/// Holds no state of its own between calls.
pub struct AlertRouter {
    presenter: Box<dyn ToastPresenter>,
    store: Arc<NotificationStore>,
}

impl AlertRouter {
    pub fn new(presenter: impl ToastPresenter + 'static, store: Arc<NotificationStore>) -> Self {
        Self {
            presenter: Box::new(presenter),
            store,
        }
    }

    /// Router that only writes toasts to the log output.
    pub fn headless(store: Arc<NotificationStore>) -> Self {
        Self::new(LogPresenter, store)
    }

    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// Raise an alert. Returns the logged entry for durable severities.
    ///
    /// The toast and the log append are independent: a presenter error or
    /// panic is logged and the append still happens.
    pub fn dispatch(&self, severity: Severity, payload: AlertPayload) -> Option<Notification> {
        let policy = policy_for(severity);

        let shown = panic::catch_unwind(AssertUnwindSafe(|| {
            self.presenter.present(policy.style, &payload)
        }));
        match shown {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Toast for {} alert {:?} not shown: {}", severity, payload.title, e),
            Err(_) => error!("Toast presenter panicked on {} alert {:?}", severity, payload.title),
        }

        policy
            .durable
            .then(|| self.store.append(severity, payload))
    }

    pub fn system(&self, payload: AlertPayload) {
        self.dispatch(Severity::System, payload);
    }

    pub fn info(&self, payload: AlertPayload) -> Option<Notification> {
        self.dispatch(Severity::Info, payload)
    }

    pub fn warn(&self, payload: AlertPayload) -> Option<Notification> {
        self.dispatch(Severity::Warn, payload)
    }

    pub fn error(&self, payload: AlertPayload) -> Option<Notification> {
        self.dispatch(Severity::Error, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::policy::ToastStyle;
    use crate::core::alerts::presenter::PresentError;
    use std::sync::Mutex;

    type Shown = (ToastStyle, String, Option<String>);

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Mutex<Vec<Shown>>,
    }

    impl ToastPresenter for RecordingPresenter {
        fn present(&self, style: ToastStyle, toast: &AlertPayload) -> Result<(), PresentError> {
            self.shown
                .lock()
                .unwrap()
                .push((style, toast.title.clone(), toast.description.clone()));
            Ok(())
        }
    }

    struct BrokenPresenter;

    impl ToastPresenter for BrokenPresenter {
        fn present(&self, _: ToastStyle, _: &AlertPayload) -> Result<(), PresentError> {
            Err(PresentError::Unavailable)
        }
    }

    struct PanickingPresenter;

    impl ToastPresenter for PanickingPresenter {
        fn present(&self, _: ToastStyle, _: &AlertPayload) -> Result<(), PresentError> {
            panic!("webview gone");
        }
    }

    fn setup() -> (Arc<RecordingPresenter>, Arc<NotificationStore>, AlertRouter) {
        let presenter = Arc::new(RecordingPresenter::default());
        let store = Arc::new(NotificationStore::new());
        let router = AlertRouter::new(Arc::clone(&presenter), Arc::clone(&store));
        (presenter, store, router)
    }

    #[test]
    fn test_system_alert_is_toast_only() {
        let (presenter, store, router) = setup();

        let logged = router.dispatch(Severity::System, AlertPayload::new("Connected"));

        assert!(logged.is_none());
        assert!(store.is_empty());
        assert_eq!(
            *presenter.shown.lock().unwrap(),
            vec![(ToastStyle::Neutral, "Connected".to_string(), None)]
        );
    }

    #[test]
    fn test_error_alert_is_toasted_and_logged() {
        let (presenter, store, router) = setup();

        let logged = router
            .dispatch(
                Severity::Error,
                AlertPayload::new("Disconnected").with_description("Token expired"),
            )
            .unwrap();

        assert_eq!(
            *presenter.shown.lock().unwrap(),
            vec![(
                ToastStyle::Error,
                "Disconnected".to_string(),
                Some("Token expired".to_string())
            )]
        );

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0], logged);
        assert_eq!(logged.severity, Severity::Error);
        assert!(!logged.seen);
        assert_eq!(logged.title, "Disconnected");
        assert_eq!(logged.description.as_deref(), Some("Token expired"));
    }

    #[test]
    fn test_info_and_warn_styles() {
        let (presenter, store, router) = setup();

        router.info(AlertPayload::new("Joined channel"));
        router.warn(AlertPayload::new("Rate limited"));

        let styles: Vec<_> = presenter.shown.lock().unwrap().iter().map(|s| s.0).collect();
        assert_eq!(styles, vec![ToastStyle::Success, ToastStyle::Warning]);

        let severities: Vec<_> = store.snapshot().iter().map(|n| n.severity).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Warn]);
    }

    #[test]
    fn test_one_toast_per_dispatch() {
        let (presenter, store, router) = setup();
        for severity in Severity::all() {
            router.dispatch(*severity, AlertPayload::new(severity.as_str()));
        }
        assert_eq!(presenter.shown.lock().unwrap().len(), 4);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_presenter_failure_does_not_block_log() {
        let store = Arc::new(NotificationStore::new());
        let router = AlertRouter::new(BrokenPresenter, Arc::clone(&store));

        let logged = router.error(AlertPayload::new("Disconnected"));

        assert!(logged.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_subscriber_sees_dispatches() {
        let (_presenter, store, router) = setup();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        let _sub = store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.len()));

        router.system(AlertPayload::new("Connected"));
        router.info(AlertPayload::new("Joined"));
        router.error(AlertPayload::new("Disconnected"));

        // Initial delivery, then one per durable dispatch
        assert_eq!(*counts.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_presenter_panic_does_not_block_log() {
        let store = Arc::new(NotificationStore::new());
        let router = AlertRouter::new(PanickingPresenter, Arc::clone(&store));

        let logged = router.warn(AlertPayload::new("Rate limited"));
        assert_eq!(logged.map(|n| n.title), Some("Rate limited".to_string()));

        // Still usable afterwards
        router.system(AlertPayload::new("Connected"));
        router.error(AlertPayload::new("Disconnected"));
        assert_eq!(store.len(), 2);
    }
}
