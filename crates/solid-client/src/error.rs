//! Error types for resource and ACL operations
//!
//! Transport and status errors are surfaced unchanged. Nothing in this crate
//! retries: an ACL write that failed may or may not have been applied.

use solid_acl::AclError;
use thiserror::Error;

use crate::config::ConfigError;

/// Client error types.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error ({status}) for {url}: {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
        /// Response body, if any
        message: String,
    },

    /// The resource itself does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource does not advertise an ACL
    #[error("No ACL link advertised for {0}")]
    AclUrlNotFound(String),

    /// Nowhere to save a permission set
    #[error("No ACL URL to save to")]
    NoTargetUrl,

    /// A URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration is unusable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model or RDF codec error
    #[error(transparent)]
    Acl(#[from] AclError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            ClientError::NotFound(_) => Some(404),
            ClientError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the error happened on the wire rather than in local logic.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ClientError::RequestFailed(_) | ClientError::ApiError { .. } | ClientError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = ClientError::ApiError {
            status: 409,
            url: "https://alice.example/file.acl".to_string(),
            message: "conflict".to_string(),
        };
        assert_eq!(err.status_code(), Some(409));
        assert!(err.is_transport_error());

        assert_eq!(ClientError::NotFound("x".to_string()).status_code(), Some(404));
        assert_eq!(ClientError::NoTargetUrl.status_code(), None);
        assert!(!ClientError::NoTargetUrl.is_transport_error());
    }

    #[test]
    fn test_acl_error_is_transparent() {
        let err: ClientError = AclError::SerializationError("bad".to_string()).into();
        assert_eq!(err.to_string(), "Serialization error: bad");
        assert!(!err.is_transport_error());
    }
}
