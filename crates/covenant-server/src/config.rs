//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, extractor tuning,
//! validation rules and the extraction capability backend. Secrets are never
//! stored in the file; the API key is read from the environment variable the
//! file names.

use covenant_extractor::ExtractorConfig;
use covenant_gatekeeper::ValidationConfig;
use covenant_llm::openai::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Most rate-limit retries a provider may be configured for
pub const MAX_PROVIDER_RETRIES: u32 = 10;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Environment variable holding a secret is not set
    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    /// A section failed validation
    #[error("Invalid {section} configuration: {message}")]
    Invalid {
        /// Config table, e.g. "extractor"
        section: &'static str,
        /// Validation message
        message: String,
    },
}

/// Which extraction capability backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat-completions API
    OpenAi,
    /// Offline stub that classifies every document as irrelevant
    Mock,
}

/// `[provider]` table
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind (default: openai)
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Retries after rate limiting
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::OpenAi
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingEnv(self.api_key_env.clone())),
        }
    }
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// `[extractor]` table
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// `[validation]` table
    #[serde(default)]
    pub validation: ValidationConfig,

    /// `[provider]` table
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;

        // Validate required fields
        if config.bind_address.is_empty() {
            return Err(ConfigError::MissingField("bind_address".to_string()));
        }

        Ok(config)
    }

    /// Validate every section, including that the API key is available
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "extractor",
                message,
            })?;
        self.validation
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "validation",
                message,
            })?;

        if self.provider.max_retries > MAX_PROVIDER_RETRIES {
            return Err(ConfigError::Invalid {
                section: "provider",
                message: format!(
                    "max_retries must be at most {}, got {}",
                    MAX_PROVIDER_RETRIES, self.provider.max_retries
                ),
            });
        }

        if self.provider.kind == ProviderKind::OpenAi {
            if self.provider.model.trim().is_empty() {
                return Err(ConfigError::MissingField("provider.model".to_string()));
            }
            if self.provider.request_timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    section: "provider",
                    message: "request_timeout_secs must be greater than 0".to_string(),
                });
            }
            self.provider.api_key()?;
        }

        Ok(())
    }

    /// Create a default configuration for testing
    ///
    /// Uses the offline mock provider, so no API key is needed.
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            extractor: ExtractorConfig::default(),
            validation: ValidationConfig::default(),
            provider: ProviderConfig {
                kind: ProviderKind::Mock,
                ..ProviderConfig::default()
            },
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
