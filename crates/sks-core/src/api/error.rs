use std::{error, fmt};

use serde::{Deserialize, Serialize};

/// Message surfaced when the server rejects the credential.
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired, please log in again";
/// Message for HTTP 403.
pub const FORBIDDEN_MESSAGE: &str = "access denied";
/// Message for HTTP 404.
pub const NOT_FOUND_MESSAGE: &str = "resource not found";
/// Fallback when the server gives no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Categories of client errors. Callers branch on these, never on raw status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Identity payload is missing the id, username, role or token
    InvalidProfile,
    /// Credential rejected or absent (HTTP 401)
    Unauthorized,
    /// Authenticated but not allowed (HTTP 403)
    Forbidden,
    /// HTTP 404
    NotFound,
    /// Envelope code other than 200, or any other failing status
    ServerRejected,
    /// No response was received
    Transport,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::InvalidProfile => write!(f, "invalid_profile"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::Forbidden => write!(f, "forbidden"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::ServerRejected => write!(f, "server_rejected"),
            ApiErrorKind::Transport => write!(f, "transport"),
        }
    }
}

/// Structured error with kind and a message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidProfile, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(ApiErrorKind::Unauthorized, SESSION_EXPIRED_MESSAGE)
    }

    pub fn forbidden() -> Self {
        Self::new(ApiErrorKind::Forbidden, FORBIDDEN_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::new(ApiErrorKind::NotFound, NOT_FOUND_MESSAGE)
    }

    /// Server-side rejection; blank messages fall back to "request failed".
    pub fn server_rejected(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE);
        Self::new(ApiErrorKind::ServerRejected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    /// Classifies a reqwest failure that produced no response.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::transport(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::transport(format!("Connection failed: {e}"))
        } else if e.is_request() {
            Self::transport(format!("Request error: {e}"))
        } else {
            Self::transport(format!("Network error: {e}"))
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for ApiError {}

/// Result type for pipeline and session operations.
pub type ApiResult<T> = Result<T, ApiError>;
