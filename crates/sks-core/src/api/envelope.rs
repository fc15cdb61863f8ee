//! The uniform `{ code, data, message }` wrapper around every API response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Envelope code that signals success.
pub const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Application status; only the number 200 means success.
    pub code: Value,
    pub data: Value,
    pub message: Option<String>,
}

impl Envelope {
    /// Parses a response body. Anything that is not a JSON object yields `None`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body).ok()? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// True when `code` is the number 200, whether sent as `200` or `200.0`.
    pub fn is_success(&self) -> bool {
        self.code.as_i64() == Some(SUCCESS_CODE)
            || self
                .code
                .as_f64()
                .is_some_and(|code| (code - 200.0).abs() < f64::EPSILON)
    }

    /// Unwraps `data` on success, otherwise rejects with the envelope message.
    ///
    /// # Errors
    /// Returns `ServerRejected` when `code` is anything but 200.
    pub fn into_data(self) -> ApiResult<Value> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::server_rejected(self.message.as_deref()))
        }
    }
}
