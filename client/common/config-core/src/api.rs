//! Forum backend connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// How to reach the forum REST API
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:3001`
    #[validate(url)]
    pub base_url: String,

    /// Whole-request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Connect timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[validate(length(min = 1))]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "devsocial-client".to_string()
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }

    /// Parsed base URL
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}
