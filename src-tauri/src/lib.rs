use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, State};
use alertlog::core::{
    alerts::{policy::ToastStyle, presenter::{PresentError, ToastPresenter}, router::AlertRouter},
    config::{ConfigManager, Settings},
    ingest::{self, AlertSender},
    model::{AlertPayload, Notification, NotificationId, Severity},
    notifications::store::{NotificationStore, Subscription},
};

/// Payload of the "toast" event the web UI listens for.
#[derive(Clone, Serialize)]
struct ToastEvent {
    style: ToastStyle,
    title: String,
    description: Option<String>,
    duration_ms: u64,
}

/// Shows toasts by emitting them to the webview.
struct WebviewPresenter {
    handle: AppHandle,
    /// Shared with AppState so saved settings apply to the next toast
    duration_ms: Arc<AtomicU64>,
}

impl ToastPresenter for WebviewPresenter {
    fn present(&self, style: ToastStyle, toast: &AlertPayload) -> Result<(), PresentError> {
        self.handle
            .emit(
                "toast",
                ToastEvent {
                    style,
                    title: toast.title.clone(),
                    description: toast.description.clone(),
                    duration_ms: self.duration_ms.load(Ordering::Relaxed),
                },
            )
            .map_err(|e| PresentError::Failed(e.to_string()))
    }
}

struct AppState {
    store: Arc<NotificationStore>,
    /// Every store mutation goes through here so one task applies them in order
    alert_tx: AlertSender,
    toast_duration_ms: Arc<AtomicU64>,
    settings: Mutex<Settings>,
    config_manager: ConfigManager,
    _ui_subscription: Subscription,
}

#[tauri::command]
fn get_notifications(state: State<'_, AppState>) -> Vec<Notification> {
    state.store.snapshot().to_vec()
}

#[tauri::command]
fn mark_notification_seen(id: NotificationId, state: State<'_, AppState>) -> Result<(), String> {
    state.alert_tx.mark_seen(id).map_err(|e| e.to_string())
}

#[tauri::command]
fn mark_all_notifications_seen(state: State<'_, AppState>) -> Result<(), String> {
    state.alert_tx.mark_all_seen().map_err(|e| e.to_string())
}

/// The resulting log change arrives through "notifications-update".
#[tauri::command]
fn raise_alert(
    severity: String,
    title: String,
    description: Option<String>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let severity = severity.parse::<Severity>().map_err(|e| e.to_string())?;
    let payload = AlertPayload { title, description };
    state.alert_tx.send(severity, payload).map_err(|e| e.to_string())
}

#[tauri::command]
fn get_settings(state: State<'_, AppState>) -> Settings {
    state.settings.lock().unwrap().clone()
}

/// Persist settings and apply them to the running store and presenter.
#[tauri::command]
fn save_settings(settings: Settings, state: State<'_, AppState>) -> Result<(), String> {
    let mut current = state.settings.lock().unwrap();
    if current.notification_capacity != settings.notification_capacity {
        state
            .alert_tx
            .set_capacity(settings.notification_capacity)
            .map_err(|e| e.to_string())?;
    }
    state
        .toast_duration_ms
        .store(settings.toast_duration_ms, Ordering::Relaxed);
    *current = settings.clone();
    state.config_manager.save(&settings).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // Initialize Config
            let config_dir = app.path().app_config_dir().unwrap_or(PathBuf::from("."));
            let config_manager = ConfigManager::new(config_dir);
            let settings = config_manager.load();

            let store = Arc::new(NotificationStore::from_settings(&settings));
            let handle = app.handle().clone();
            let ui_subscription = store.subscribe(move |snapshot| {
                let _ = handle.emit("notifications-update", snapshot.clone());
            });

            // One router, owned by the inbox task, applies every change to the log
            let toast_duration_ms = Arc::new(AtomicU64::new(settings.toast_duration_ms));
            let presenter = WebviewPresenter {
                handle: app.handle().clone(),
                duration_ms: Arc::clone(&toast_duration_ms),
            };
            let router = AlertRouter::new(presenter, Arc::clone(&store));
            let (alert_tx, inbox) = ingest::channel();
            tauri::async_runtime::spawn(inbox.run(router));

            alert_tx
                .send(Severity::System, AlertPayload::new("Alert center ready"))
                .map_err(|e| e.to_string())?;

            app.manage(AppState {
                store,
                alert_tx,
                toast_duration_ms,
                settings: Mutex::new(settings),
                config_manager,
                _ui_subscription: ui_subscription,
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_notifications,
            mark_notification_seen,
            mark_all_notifications_seen,
            raise_alert,
            get_settings,
            save_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
