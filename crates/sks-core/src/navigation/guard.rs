//! Gate evaluated before a view is allowed to mount.

use std::sync::Arc;

use tracing::debug;

use super::notify::{Notification, Notifier};
use super::route::{NavigationRequest, RoleRequirement, View};
use crate::session::{ProfileSource, SessionStore};

/// Terminal outcome of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectHome,
}

impl Decision {
    /// Where the caller must go instead, if anywhere.
    pub fn redirect_target(self) -> Option<View> {
        match self {
            Decision::Allow => None,
            Decision::RedirectLogin => Some(View::Login),
            Decision::RedirectHome => Some(View::Home),
        }
    }
}

/// Builds the access-denied message shown to the user.
pub fn access_denied_message(requirement: RoleRequirement, current_role: &str) -> String {
    let role = if current_role.is_empty() {
        "unknown"
    } else {
        current_role
    };
    format!(
        "This feature is for {} (current role: {role})",
        requirement.audience()
    )
}

/// Enforces per-view auth and role requirements against the session store.
///
/// Attempts are independent: two overlapping evaluations each read whatever
/// the store holds when they look, and a slower refresh may overwrite the
/// profile written by a faster one.
pub struct NavigationGuard<S> {
    session: Arc<SessionStore>,
    source: Arc<S>,
    notifier: Arc<dyn Notifier>,
}

impl<S: ProfileSource> NavigationGuard<S> {
    pub fn new(session: Arc<SessionStore>, source: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            source,
            notifier,
        }
    }

    /// Runs the guard for one attempt. Always settles on a terminal decision.
    pub async fn evaluate(&self, request: &NavigationRequest) -> Decision {
        let requirements = request.requirements;

        if requirements.requires_auth && !self.session.is_logged_in() {
            debug!(path = %request.path, "not logged in, redirecting to login");
            return Decision::RedirectLogin;
        }

        let Some(role_requirement) = requirements.requires_role else {
            debug!(path = %request.path, "navigation allowed");
            return Decision::Allow;
        };

        if self.session.is_logged_in() {
            // Role checks wait for the refresh to settle, whatever its outcome.
            let outcome = self.session.sync_user_info(self.source.as_ref()).await;
            debug!(path = %request.path, ?outcome, "profile refreshed before role check");

            if requirements.requires_auth && !self.session.is_logged_in() {
                debug!(path = %request.path, "session ended during refresh, redirecting to login");
                return Decision::RedirectLogin;
            }
        }

        let profile = self.session.profile();
        if !role_requirement.permits(profile.as_ref().map(|p| &p.role)) {
            let message = access_denied_message(role_requirement, &self.session.role());
            debug!(path = %request.path, %message, "role requirement not met");
            self.notifier.notify(Notification::error(message));
            return Decision::RedirectHome;
        }

        debug!(path = %request.path, "navigation allowed");
        Decision::Allow
    }
}
