//! Wiring of one session store, one pipeline, and one guard.

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::Config;
use crate::navigation::{Decision, NavigationGuard, NavigationRequest, Navigator, Notifier};
use crate::session::SessionStore;
use crate::storage::Storage;

/// Everything a front end needs, sharing a single [`SessionStore`].
pub struct Context {
    pub session: Arc<SessionStore>,
    pub api: Arc<ApiClient>,
    pub guard: NavigationGuard<ApiClient>,
}

impl Context {
    /// Restores the session from `storage` and builds the pipeline and guard
    /// on top of it.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let base_url = config.effective_base_url()?;
        Self::with_base_url(&base_url, config, storage, navigator, notifier)
    }

    /// Like [`Context::new`] but with an explicit base URL (CLI override).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        config: &Config,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = Arc::new(SessionStore::restore(storage));
        let api = Arc::new(ApiClient::new(
            base_url,
            config.timeout(),
            Arc::clone(&session),
            navigator,
        )?);
        let guard = NavigationGuard::new(Arc::clone(&session), Arc::clone(&api), notifier);

        Ok(Self {
            session,
            api,
            guard,
        })
    }

    /// Resolves `path` against the route table and runs the guard.
    ///
    /// Returns `None` for paths that match no view.
    pub async fn navigate(&self, path: &str) -> Option<Decision> {
        let request = NavigationRequest::for_path(path)?;
        Some(self.guard.evaluate(&request).await)
    }
}
