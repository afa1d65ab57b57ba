//! HTTP error response handling
//!
//! Reads the error payloads the forum backend sends with non-success
//! responses. Two shapes are seen in practice:
//!
//! ```json
//! { "message": "Post not found" }
//! { "error": { "code": "UNAUTHORIZED", "message": "Token expired" } }
//! ```
//!
//! and a bare `{ "error": "..." }` from older routes.

use http::StatusCode;
use serde::Deserialize;

/// Error body sent by the backend
#[derive(Debug, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<ErrorField>,
}

/// `error` member of the payload, either plain text or an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    Text(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ErrorPayload {
    /// Parse a response body; `None` when it is not a JSON error object
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Best human-readable message in the payload
    pub fn message(&self) -> Option<String> {
        let nested = match &self.error {
            Some(ErrorField::Text(text)) => Some(text.as_str()),
            Some(ErrorField::Detailed { message, .. }) => message.as_deref(),
            None => None,
        };

        self.message
            .as_deref()
            .into_iter()
            .chain(nested)
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Machine-readable code, when the detailed shape is used
    pub fn code(&self) -> Option<&str> {
        match &self.error {
            Some(ErrorField::Detailed { code, .. }) => code.as_deref(),
            _ => None,
        }
    }
}

/// Extract the user-facing message from an error response body
pub fn error_message(body: &str) -> Option<String> {
    ErrorPayload::parse(body).and_then(|payload| payload.message())
}

/// 401 and 403 both mean the session is no longer accepted
pub fn is_auth_status(status: u16) -> bool {
    matches!(
        StatusCode::from_u16(status),
        Ok(StatusCode::UNAUTHORIZED) | Ok(StatusCode::FORBIDDEN)
    )
}
