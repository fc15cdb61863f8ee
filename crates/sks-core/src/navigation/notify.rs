//! Side channels out of the core: user notifications and redirect signals.

use std::mem;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::route::View;

/// Notification severity; the core only raises errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Error,
}

/// Transient message for the UI (`{ message, type }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationType::Error,
        }
    }
}

/// Receives notifications; called synchronously.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Receives redirects issued outside the guard (the pipeline's 401 handling).
pub trait Navigator: Send + Sync {
    fn redirect(&self, view: View);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        warn!(message = %notification.message, kind = ?notification.kind, "notification");
    }
}

/// Keeps every notification; used by tests and the CLI.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    items: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Keeps every redirect target in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<View>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<View> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, view: View) {
        debug!(%view, "redirect requested");
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_wire_shape() {
        let json = serde_json::to_value(Notification::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "nope", "type": "error"}));
    }

    #[test]
    fn test_recording_notifier_drains() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Notification::error("seat taken"));
        assert_eq!(notifier.take().len(), 1);
        assert!(notifier.take().is_empty());
    }
}
