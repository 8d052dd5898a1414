//! Response envelope `{ success, data?, error?, message? }`.
//!
//! Most endpoints wrap their payload in the envelope. A few (the profile
//! endpoint among them) return the bare object, so decoding accepts both.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, DEFAULT_ERROR_MESSAGE};

/// Text fields of an error envelope.
#[derive(Debug, Default, Deserialize)]
struct ErrorFields {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Message for a failed response: `error`, then `message`, then the status
/// reason phrase, then [`DEFAULT_ERROR_MESSAGE`].
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let fields: ErrorFields = serde_json::from_str(body).unwrap_or_default();
    non_blank(fields.error)
        .or_else(|| non_blank(fields.message))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

/// Decode a success response body into `T`.
///
/// An object carrying a boolean `success` is treated as an envelope and its
/// `data` is decoded (a missing `data` decodes as `null`). Anything else is
/// decoded as-is. An envelope with `success: false` is reported as a failure
/// even though the HTTP status was a success.
pub(crate) fn decode<T>(status: StatusCode, body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::Decode {
            status: status.as_u16(),
            message: e.to_string(),
        })?
    };

    let payload = match value {
        Value::Object(mut map) if map.get("success").is_some_and(Value::is_boolean) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    message: error_message(status, body),
                });
            }
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Decode {
        status: status.as_u16(),
        message: e.to_string(),
    })
}
