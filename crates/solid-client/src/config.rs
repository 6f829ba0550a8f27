//! Client configuration.
//!
//! Provides the settings shared by the resource client and the ACL
//! protocol: timeouts, credentials, the acting user and the ACL naming
//! convention. Configuration is loaded from environment variables with
//! defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings for talking to a Linked-Data server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Suffix appended to a resource URL to form its own ACL URL.
    pub acl_suffix: String,

    /// Bearer token sent with every request.
    pub access_token: Option<String>,

    /// WebID of the acting user; kept in control of every ACL it edits.
    pub current_user: Option<String>,

    /// Whether to verify TLS certificates (disable only for testing).
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            acl_suffix: ".acl".to_string(),
            access_token: None,
            current_user: None,
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SOLID_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    /// - `SOLID_ACL_SUFFIX`: ACL naming suffix (default: .acl)
    /// - `SOLID_ACCESS_TOKEN`: Bearer token
    /// - `SOLID_WEBID`: WebID of the acting user
    /// - `SOLID_VERIFY_TLS`: Whether to verify TLS (default: true)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            timeout_secs: std::env::var("SOLID_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            acl_suffix: std::env::var("SOLID_ACL_SUFFIX").unwrap_or(default.acl_suffix),
            access_token: std::env::var("SOLID_ACCESS_TOKEN").ok(),
            current_user: std::env::var("SOLID_WEBID").ok(),
            verify_tls: std::env::var("SOLID_VERIFY_TLS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.verify_tls),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The URL a resource's own ACL would have under the naming convention.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_client::ClientConfig;
    ///
    /// let config = ClientConfig::default();
    /// assert_eq!(config.default_acl_url("https://alice.example/docs/"), "https://alice.example/docs/.acl");
    /// assert_eq!(config.default_acl_url("https://alice.example/file#it"), "https://alice.example/file.acl");
    /// ```
    pub fn default_acl_url(&self, resource_url: &str) -> String {
        let resource = resource_url.split('#').next().unwrap_or(resource_url);
        format!("{}{}", resource, self.acl_suffix)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.acl_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "acl_suffix".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
