//! Route table and the guard that gates navigation on session state.

mod guard;
mod notify;
mod route;

pub use guard::{Decision, NavigationGuard, access_denied_message};
pub use notify::{
    Navigator, Notification, NotificationType, Notifier, RecordingNavigator, RecordingNotifier,
    TracingNotifier,
};
pub use route::{NavigationRequest, Requirements, RoleRequirement, View};
