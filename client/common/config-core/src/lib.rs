//! Unified configuration management for the devsocial client
//!
//! This library provides:
//! - The client configuration tree (API endpoint, local storage, logging)
//! - Environment-aware layered loading
//! - Validation before anything is used

use error_types::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

pub mod api;
pub mod observability;
pub mod storage;

// Re-export commonly used types
pub use api::ApiConfig;
pub use observability::{init_tracing, LogFormat, LogLevel, ObservabilityConfig};
pub use storage::StorageConfig;

const DEFAULTS: &str = include_str!("../config/defaults.toml");

/// Prefix of environment variable overrides, e.g. `DEVSOCIAL__API__BASE_URL`
pub const ENV_PREFIX: &str = "DEVSOCIAL";

/// Environment type for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    Local,
    /// Development server
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if this is a local development environment
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }

    /// Name used in environment-specific config file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Get environment from string
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "local" | "loc" => Ok(Environment::Local),
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "stg" => Ok(Environment::Staging),
            "production" | "prod" | "prd" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Client configuration root
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ClientConfig {
    /// Environment (local, dev, staging, prod)
    #[serde(default)]
    pub environment: Environment,

    /// Backend connection
    #[validate(nested)]
    pub api: ApiConfig,

    /// Durable local storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging
    #[validate(nested)]
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Load configuration from defaults, files and environment
    ///
    /// # Loading Order
    /// 1. Built-in defaults
    /// 2. Configuration file (if given and present)
    /// 3. Environment-specific file next to it (e.g. `config.production.toml`)
    /// 4. Environment variables (highest priority), `.env` included
    pub fn load(config_path: Option<&Path>) -> ClientResult<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let environment = std::env::var("ENVIRONMENT")
            .or_else(|_| std::env::var("ENV"))
            .ok()
            .map(|raw| Environment::parse(&raw))
            .transpose()
            .map_err(ClientError::Config)?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULTS,
            config::FileFormat::Toml,
        ));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(false));

            if let Some(env) = environment {
                let env_specific = path
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(format!("config.{}.toml", env.as_str()));
                builder = builder.add_source(config::File::from(env_specific).required(false));
            }
        }

        if let Some(env) = environment {
            builder = builder
                .set_override("environment", env.as_str())
                .map_err(|e| ClientError::Config(e.to_string()))?;
        }

        // Override with environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to load configuration: {}", e)))?;

        let config: ClientConfig = settings.try_deserialize().map_err(|e| {
            ClientError::Config(format!("Failed to deserialize configuration: {}", e))
        })?;

        config.check()?;
        Ok(config)
    }

    /// Defaults pointed at the given backend, for tests and embedders
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            environment: Environment::default(),
            api: ApiConfig::new(base_url),
            storage: StorageConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Validate configuration
    pub fn check(&self) -> ClientResult<()> {
        self.validate().map_err(|e| {
            ClientError::Config(format!("Configuration validation failed: {}", e))
        })?;

        if self.environment.is_production() && self.api.base_url.starts_with("http://") {
            tracing::warn!(
                base_url = %self.api.base_url,
                "Production configuration talks to the API over plain HTTP"
            );
        }

        Ok(())
    }
}
