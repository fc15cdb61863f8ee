//! Authentication state: token plus normalized profile, persisted to storage.

mod profile;
mod store;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiResult;

pub use profile::{
    REF_ID_ALIASES, ROLE_ALIASES, Role, USER_ID_ALIASES, USERNAME_ALIASES, UserProfile,
    normalize_profile,
};
pub use store::{SessionState, SessionStore, SyncOutcome, TOKEN_KEY, USER_INFO_KEY, mask_token};

/// Anything that can fetch the raw "current user" payload.
///
/// The request pipeline implements this against `GET /me`; tests use fakes.
pub trait ProfileSource: Send + Sync {
    fn fetch_current_user(&self) -> impl Future<Output = ApiResult<Value>> + Send;
}

impl<T: ProfileSource> ProfileSource for Arc<T> {
    fn fetch_current_user(&self) -> impl Future<Output = ApiResult<Value>> + Send {
        (**self).fetch_current_user()
    }
}
