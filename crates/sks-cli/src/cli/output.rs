//! Terminal side of the core's notification and redirect channels.

use sks_core::navigation::{Navigator, Notification, Notifier, View};
use tracing::debug;

/// Redirects become hints on stderr; the CLI has no views to switch to.
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect(&self, view: View) {
        if view == View::Login {
            eprintln!("Session expired, please log in again (run `sks login`).");
        } else {
            debug!(%view, "redirect ignored");
        }
    }
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("error: {}", notification.message);
    }
}
