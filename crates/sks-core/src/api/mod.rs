//! Request pipeline and the booking API surface built on it.

mod client;
mod endpoints;
mod envelope;
mod error;

pub use client::{ApiClient, CURRENT_USER_PATH, USER_AGENT};
pub use endpoints::{
    AdminApi, AuthApi, LocksApi, OrdersApi, Query, ReportsApi, SchedulesApi, ScriptsApi,
};
pub use envelope::{Envelope, SUCCESS_CODE};
pub use error::{
    ApiError, ApiErrorKind, ApiResult, FORBIDDEN_MESSAGE, GENERIC_FAILURE_MESSAGE,
    NOT_FOUND_MESSAGE, SESSION_EXPIRED_MESSAGE,
};
