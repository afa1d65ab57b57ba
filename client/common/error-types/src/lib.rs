//! Unified error types for the devsocial client
//!
//! Every client operation reports failures through [`ClientError`], which keeps
//! the four categories the UI cares about apart:
//!
//! 1. **Validation**: rejected locally, before any request is made
//! 2. **Backend / transport**: the request failed or the backend said no
//! 3. **Authorization**: a 401/403 from the backend; callers sign out locally
//! 4. **Persistence**: local storage failures, logged and never shown
//!
//! User-facing text comes from [`ClientError::user_message_or`], which prefers
//! the backend's own error message when one was sent.

use thiserror::Error;

pub mod http;
pub mod storage;
pub mod validation;

// Re-export common types
pub use storage::{StorageError, StorageResult};
pub use validation::ValidationError;

/// Fallback shown when neither the backend nor the caller has anything better.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Shown for any failed image upload, whatever the underlying cause.
pub const UPLOAD_FAILED_MESSAGE: &str = "Could not upload the image.";

/// Shown when an operation needs a session and there is none.
pub const SIGN_IN_REQUIRED_MESSAGE: &str = "You need to be signed in to do that.";

/// Core client error type used across all devsocial crates
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Operation needs a session token and none is held
    #[error("Sign-in required")]
    SignInRequired,

    /// Backend rejected the credentials (401) or the action (403)
    #[error("Request rejected with HTTP {status}")]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    /// Any other non-success response
    #[error("Backend returned HTTP {status}")]
    Backend {
        status: u16,
        message: Option<String>,
    },

    /// Image upload failed; the operation that needed it was aborted
    #[error("Image upload failed")]
    Upload {
        #[source]
        source: Box<ClientError>,
    },

    /// Connection, TLS, or protocol failure before a response arrived
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// A local file chosen for upload could not be read
    #[error("Cannot read attachment {path}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Durable local storage failed
    #[error("Storage error")]
    Storage(#[from] StorageError),

    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a non-success HTTP response.
    ///
    /// 401 and 403 become [`ClientError::Unauthorized`]; everything else is
    /// [`ClientError::Backend`]. The message is pulled from the JSON error
    /// payload when the body has one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = http::error_message(body);
        if http::is_auth_status(status) {
            Self::Unauthorized { status, message }
        } else {
            Self::Backend { status, message }
        }
    }

    /// Wrap the failure of an image upload
    pub fn upload(source: ClientError) -> Self {
        Self::Upload {
            source: Box::new(source),
        }
    }

    /// Transport failure with an underlying cause
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when the backend rejected the session, directly or through an upload.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Unauthorized { .. } => true,
            Self::Upload { source } => source.is_auth_failure(),
            _ => false,
        }
    }

    /// HTTP status of the backend response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Backend { status, .. } => Some(*status),
            Self::Upload { source } => source.status(),
            _ => None,
        }
    }

    /// Message the backend put in its error payload
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. } | Self::Backend { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Text to show the user, using `fallback` when nothing more specific exists.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::SignInRequired => SIGN_IN_REQUIRED_MESSAGE.to_string(),
            Self::Unauthorized { message, .. } | Self::Backend { message, .. } => message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            Self::Upload { .. } => UPLOAD_FAILED_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// [`Self::user_message_or`] with the generic fallback
    pub fn user_message(&self) -> String {
        self.user_message_or(GENERIC_MESSAGE)
    }

    /// Log error with appropriate level and context
    pub fn log(&self) {
        match self {
            Self::Validation(_) | Self::SignInRequired => {
                tracing::debug!(error = %self, "Rejected locally");
            }
            Self::Unauthorized { status, .. } => {
                tracing::warn!(status, error = %self, "Authorization failure");
            }
            Self::Backend { status, .. } => {
                tracing::warn!(status, error = %self, "Backend error");
            }
            Self::Upload { source } => {
                tracing::warn!(error = %source, "Upload failure");
            }
            Self::Transport { .. } | Self::Decode(_) => {
                tracing::warn!(error = ?self, "Dependency issue");
            }
            Self::Attachment { .. } | Self::Storage(_) | Self::Config(_) => {
                tracing::error!(error = ?self, "Local failure");
            }
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
