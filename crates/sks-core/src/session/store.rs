use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::ProfileSource;
use super::profile::{Role, UserProfile, normalize_profile};
use crate::api::{ApiError, ApiErrorKind};
use crate::storage::Storage;

/// Storage key holding the raw token string.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized [`UserProfile`].
pub const USER_INFO_KEY: &str = "userInfo";

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Opaque credential; empty means logged out.
    pub token: String,
    pub profile: Option<UserProfile>,
}

/// Result of [`SessionStore::sync_user_info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to refresh: no token, or the session ended while the call was in flight.
    Unchanged,
    /// Profile replaced with the server's view.
    Updated(UserProfile),
    /// Server answered with a payload that does not normalize; prior state kept.
    InvalidPayload,
    /// The call failed. On `Unauthorized` the session has been cleared.
    Failed(ApiError),
}

impl SyncOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated(_))
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((idx, _)) if token.len() > 16 => format!("{}...", &token[..idx]),
        _ => "***".to_string(),
    }
}

/// Shared, single-instance session state.
///
/// All mutations take the lock once and finish before releasing it, so no
/// reader ever sees a half-applied login or logout. The lock is never held
/// across an await.
pub struct SessionStore {
    state: Mutex<SessionState>,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SessionStore")
            .field("token", &mask_token(&state.token))
            .field("profile", &state.profile)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Rebuilds the session from storage.
    ///
    /// Unreadable storage or a malformed `userInfo` record yields an absent
    /// value rather than an error.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(token) => token.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to read persisted token");
                String::new()
            }
        };

        let profile = match storage.get_item(USER_INFO_KEY) {
            Ok(Some(raw)) => {
                let parsed = serde_json::from_str::<Value>(&raw)
                    .ok()
                    .and_then(|value| normalize_profile(&value));
                if parsed.is_none() {
                    warn!("persisted userInfo is malformed, ignoring it");
                }
                parsed
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "failed to read persisted userInfo");
                None
            }
        };

        debug!(
            logged_in = !token.is_empty(),
            role = profile.as_ref().map_or("", |p| p.role.as_str()),
            "session restored"
        );

        Self {
            state: Mutex::new(SessionState { token, profile }),
            storage,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Establishes a session from a `/auth/login` payload.
    ///
    /// Validation happens before anything is touched; on error the store is
    /// exactly as it was.
    ///
    /// # Errors
    /// Returns `InvalidProfile` when the token is missing or the identity fields
    /// do not normalize.
    pub fn login(&self, payload: &Value) -> Result<UserProfile, ApiError> {
        let token = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::invalid_profile("login response did not include a token"))?;

        let profile = normalize_profile(payload).ok_or_else(|| {
            warn!("login response is missing user id, username or role");
            ApiError::invalid_profile("login response is missing user information")
        })?;

        let mut state = self.lock();
        state.token = token.to_string();
        state.profile = Some(profile.clone());
        self.persist(TOKEN_KEY, Some(token));
        self.persist_profile(Some(&profile));
        drop(state);

        info!(
            user = %profile.username,
            role = %profile.role,
            token = %mask_token(token),
            "logged in"
        );
        Ok(profile)
    }

    /// Clears the session from memory and storage.
    ///
    /// Returns whether a session was present. Calling it while logged out is a no-op.
    pub fn logout(&self) -> bool {
        let mut state = self.lock();
        let had_session = !state.token.is_empty() || state.profile.is_some();
        *state = SessionState::default();
        self.persist(TOKEN_KEY, None);
        self.persist(USER_INFO_KEY, None);
        drop(state);

        if had_session {
            info!("logged out");
        }
        had_session
    }

    /// Refreshes the profile from the server.
    ///
    /// Only `profile` is ever overwritten here; the token is cleared only when
    /// the server rejects it.
    pub async fn sync_user_info<S: ProfileSource + ?Sized>(&self, source: &S) -> SyncOutcome {
        if !self.is_logged_in() {
            return SyncOutcome::Unchanged;
        }

        let raw = match source.fetch_current_user().await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(kind = %err.kind, error = %err, "failed to sync user info");
                if err.kind == ApiErrorKind::Unauthorized {
                    self.logout();
                }
                return SyncOutcome::Failed(err);
            }
        };

        let Some(profile) = normalize_profile(&raw) else {
            warn!("current user payload is malformed, keeping existing session");
            return SyncOutcome::InvalidPayload;
        };

        let mut state = self.lock();
        if state.token.is_empty() {
            debug!("session ended during user info sync, discarding profile");
            return SyncOutcome::Unchanged;
        }
        state.profile = Some(profile.clone());
        self.persist_profile(Some(&profile));
        drop(state);

        debug!(user = %profile.username, role = %profile.role, "user info synced");
        SyncOutcome::Updated(profile)
    }

    fn persist_profile(&self, profile: Option<&UserProfile>) {
        match profile.map(serde_json::to_string).transpose() {
            Ok(serialized) => self.persist(USER_INFO_KEY, serialized.as_deref()),
            Err(err) => warn!(error = %err, "failed to serialize userInfo"),
        }
    }

    /// Best-effort write; memory stays authoritative when storage fails.
    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set_item(key, value),
            None => self.storage.remove_item(key),
        };
        if let Err(err) = result {
            warn!(key, error = %err, "failed to persist session state");
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn token(&self) -> String {
        self.lock().token.clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.lock().profile.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        !self.lock().token.is_empty()
    }

    fn has_role(&self, role: &Role) -> bool {
        self.lock().profile.as_ref().is_some_and(|p| &p.role == role)
    }

    pub fn is_player(&self) -> bool {
        self.has_role(&Role::Player)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role(&Role::Staff)
    }

    pub fn is_boss(&self) -> bool {
        self.has_role(&Role::Boss)
    }

    /// Current role name, empty when there is no profile.
    pub fn role(&self) -> String {
        self.lock()
            .profile
            .as_ref()
            .map(|p| p.role.to_string())
            .unwrap_or_default()
    }

    /// Current username, empty when there is no profile.
    pub fn username(&self) -> String {
        self.lock()
            .profile
            .as_ref()
            .map(|p| p.username.clone())
            .unwrap_or_default()
    }

    pub fn ref_id(&self) -> Option<String> {
        self.lock().profile.as_ref().and_then(|p| p.ref_id.clone())
    }
}
