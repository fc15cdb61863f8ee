//! View table and per-view access requirements.

use std::fmt;

use crate::session::Role;

/// Role gate a view may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    PlayerOnly,
    StaffOrBoss,
}

impl RoleRequirement {
    pub fn permits(self, role: Option<&Role>) -> bool {
        match self {
            RoleRequirement::PlayerOnly => matches!(role, Some(Role::Player)),
            RoleRequirement::StaffOrBoss => matches!(role, Some(Role::Staff | Role::Boss)),
        }
    }

    /// Human description of who may enter.
    pub fn audience(self) -> &'static str {
        match self {
            RoleRequirement::PlayerOnly => "players only",
            RoleRequirement::StaffOrBoss => "staff or boss only",
        }
    }
}

/// Declared access requirements of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Requirements {
    pub requires_auth: bool,
    pub requires_role: Option<RoleRequirement>,
}

impl Requirements {
    pub const PUBLIC: Requirements = Requirements {
        requires_auth: false,
        requires_role: None,
    };

    pub const AUTHENTICATED: Requirements = Requirements {
        requires_auth: true,
        requires_role: None,
    };

    pub const fn role(requirement: RoleRequirement) -> Requirements {
        Requirements {
            requires_auth: true,
            requires_role: Some(requirement),
        }
    }
}

/// Views of the booking client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    ScriptDetail,
    Orders,
    MyLocks,
    Profile,
    AdminDashboard,
    AdminSchedules,
    AdminReports,
}

impl View {
    pub fn all() -> &'static [View] {
        &[
            View::Home,
            View::Login,
            View::Register,
            View::ScriptDetail,
            View::Orders,
            View::MyLocks,
            View::Profile,
            View::AdminDashboard,
            View::AdminSchedules,
            View::AdminReports,
        ]
    }

    /// Path pattern; `:id` matches exactly one segment.
    pub fn pattern(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Login => "/login",
            View::Register => "/register",
            View::ScriptDetail => "/scripts/:id",
            View::Orders => "/orders",
            View::MyLocks => "/my-locks",
            View::Profile => "/profile",
            View::AdminDashboard => "/admin",
            View::AdminSchedules => "/admin/schedules",
            View::AdminReports => "/admin/reports",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Login",
            View::Register => "Register",
            View::ScriptDetail => "ScriptDetail",
            View::Orders => "Orders",
            View::MyLocks => "MyLocks",
            View::Profile => "Profile",
            View::AdminDashboard => "AdminDashboard",
            View::AdminSchedules => "AdminSchedules",
            View::AdminReports => "AdminReports",
        }
    }

    pub fn requirements(self) -> Requirements {
        match self {
            View::Home | View::Login | View::Register => Requirements::PUBLIC,
            View::ScriptDetail | View::Profile => Requirements::AUTHENTICATED,
            View::Orders | View::MyLocks => Requirements::role(RoleRequirement::PlayerOnly),
            View::AdminDashboard | View::AdminSchedules | View::AdminReports => {
                Requirements::role(RoleRequirement::StaffOrBoss)
            }
        }
    }

    /// Resolves a concrete path (query string and trailing slash ignored).
    pub fn resolve(path: &str) -> Option<View> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        View::all().iter().copied().find(|view| {
            let pattern: Vec<&str> = view
                .pattern()
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            pattern.len() == segments.len()
                && pattern
                    .iter()
                    .zip(&segments)
                    .all(|(p, s)| p.starts_with(':') || p == s)
        })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One navigation attempt: target path plus its declared requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    pub requirements: Requirements,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>, requirements: Requirements) -> Self {
        Self {
            path: path.into(),
            requirements,
        }
    }

    /// Builds a request for a concrete path using the view table.
    pub fn for_path(path: &str) -> Option<Self> {
        View::resolve(path).map(|view| Self::new(path, view.requirements()))
    }

    pub fn for_view(view: View) -> Self {
        Self::new(view.pattern(), view.requirements())
    }
}
