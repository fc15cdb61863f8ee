//! The request pipeline: the single choke point for calls to the booking API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{Instrument, debug, warn};
use uuid::Uuid;

use super::envelope::Envelope;
use super::error::{ApiError, ApiResult};
use crate::navigation::{Navigator, View};
use crate::session::{ProfileSource, SessionStore};

/// Standard User-Agent header for sks API requests.
pub const USER_AGENT: &str = concat!("sks/", env!("CARGO_PKG_VERSION"));

/// Path of the "current user" endpoint.
pub const CURRENT_USER_PATH: &str = "/me";

/// API client that decorates requests with the session credential and
/// normalizes every outcome into data or an [`ApiError`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` (e.g. `http://host/api`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Outbound stage: attaches the bearer credential when a session exists.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.session.token();
        if token.is_empty() {
            builder
        } else {
            builder.bearer_auth(token)
        }
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.request(Method::GET, path, query, None).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request(Method::POST, path, &[], body).await
    }

    /// # Errors
    /// Returns the normalized failure of the call.
    pub async fn put(&self, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request(Method::PUT, path, &[], body).await
    }

    /// Sends one request through the pipeline and unwraps the envelope.
    ///
    /// # Errors
    /// Returns the normalized failure of the call. A 401 also clears the
    /// session and signals a redirect to the login view before returning.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %Uuid::new_v4(),
            method = %method,
            path = %path,
        );

        async {
            let mut builder = self
                .http
                .request(method, self.url(path))
                .header("accept", "application/json");
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }
            let builder = self.authorize(builder);

            let response = builder.send().await.map_err(|e| {
                let err = ApiError::from_reqwest(&e);
                warn!(error = %err, "request failed without a response");
                err
            })?;

            self.handle_response(response).await
        }
        .instrument(span)
        .await
    }

    /// Inbound stage.
    async fn handle_response(&self, response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            return match Envelope::parse(&body) {
                Some(envelope) => envelope.into_data().inspect_err(|err| {
                    debug!(error = %err, "envelope rejected");
                }),
                None => Err(ApiError::server_rejected(None)
                    .with_details(String::from_utf8_lossy(&body).into_owned())),
            };
        }

        Err(self.status_failure(status, &body))
    }

    /// Maps a failing HTTP status onto the error taxonomy.
    fn status_failure(&self, status: StatusCode, body: &[u8]) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("credential rejected, clearing session");
                // Invalidation must land before the redirect so a guard that
                // runs next already sees a logged-out store.
                self.session.logout();
                self.navigator.redirect(View::Login);
                ApiError::unauthorized()
            }
            StatusCode::FORBIDDEN => ApiError::forbidden(),
            StatusCode::NOT_FOUND => ApiError::not_found(),
            _ => {
                let envelope = Envelope::parse(body);
                let message = envelope.as_ref().and_then(|e| e.message.as_deref());
                ApiError::server_rejected(message)
                    .with_details(format!("HTTP {}", status.as_u16()))
            }
        }
    }
}

impl ProfileSource for ApiClient {
    async fn fetch_current_user(&self) -> ApiResult<Value> {
        self.get(CURRENT_USER_PATH, &[]).await
    }
}
