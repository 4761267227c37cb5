// Single-consumer funnel for every change to the notification log.
//
// Background workers and UI command handlers get a cloneable AlertSender; one
// task owns the router and drains the matching AlertInbox, so all store
// mutations happen on that one consumer in send order.

use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::alerts::router::AlertRouter;
use super::model::{AlertPayload, NotificationId, Severity};

#[derive(Debug, Clone)]
enum Request {
    Alert {
        severity: Severity,
        payload: AlertPayload,
    },
    MarkSeen(NotificationId),
    MarkAllSeen,
    SetCapacity(Option<usize>),
}

impl Request {
    fn apply(self, router: &AlertRouter) {
        match self {
            Self::Alert { severity, payload } => {
                router.dispatch(severity, payload);
            }
            Self::MarkSeen(id) => {
                router.store().mark_seen(id);
            }
            Self::MarkAllSeen => router.store().mark_all_seen(),
            Self::SetCapacity(capacity) => router.store().set_capacity(capacity),
        }
    }
}

/// Returned when the inbox is gone; carries what was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("alert inbox closed, dropped {severity} alert {title:?}")]
    Alert { severity: Severity, title: String },
    #[error("alert inbox closed, dropped mark-seen for {0}")]
    MarkSeen(NotificationId),
    #[error("alert inbox closed, dropped mark-all-seen")]
    MarkAllSeen,
    #[error("alert inbox closed, dropped capacity change")]
    SetCapacity,
}

impl SendError {
    fn dropped(request: Request) -> Self {
        match request {
            Request::Alert { severity, payload } => Self::Alert {
                severity,
                title: payload.title,
            },
            Request::MarkSeen(id) => Self::MarkSeen(id),
            Request::MarkAllSeen => Self::MarkAllSeen,
            Request::SetCapacity(_) => Self::SetCapacity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: UnboundedSender<Request>,
}

impl AlertSender {
    fn submit(&self, request: Request) -> Result<(), SendError> {
        self.tx.send(request).map_err(|e| SendError::dropped(e.0))
    }

    pub fn send(&self, severity: Severity, payload: AlertPayload) -> Result<(), SendError> {
        self.submit(Request::Alert { severity, payload })
    }

    pub fn mark_seen(&self, id: NotificationId) -> Result<(), SendError> {
        self.submit(Request::MarkSeen(id))
    }

    pub fn mark_all_seen(&self) -> Result<(), SendError> {
        self.submit(Request::MarkAllSeen)
    }

    /// Change the log's retention bound (None = unbounded).
    pub fn set_capacity(&self, capacity: Option<usize>) -> Result<(), SendError> {
        self.submit(Request::SetCapacity(capacity))
    }
}

pub struct AlertInbox {
    rx: UnboundedReceiver<Request>,
}

pub fn channel() -> (AlertSender, AlertInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertSender { tx }, AlertInbox { rx })
}

impl AlertInbox {
    /// Apply everything queued so far without blocking. Returns how many
    /// requests were handled.
    pub fn drain(&mut self, router: &AlertRouter) -> usize {
        let mut count = 0;
        while let Ok(request) = self.rx.try_recv() {
            request.apply(router);
            count += 1;
        }
        if count > 0 {
            debug!("Drained {} queued requests", count);
        }
        count
    }

    /// Apply requests as they arrive until every sender is gone.
    pub async fn run(mut self, router: AlertRouter) {
        while let Some(request) = self.rx.recv().await {
            request.apply(&router);
        }
        info!("Alert inbox closed");
    }
}
