//! Error types for the ACL model
//!
//! This module defines the errors raised by authorization and permission set
//! operations, and by the RDF codec used to read and write ACL documents.

use thiserror::Error;

/// ACL model error types.
///
/// Validation errors indicate misuse of the model API and are never retried.
/// Serialization errors cover both reading and writing RDF text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Tried to set an agent on a group authorization, or the reverse
    #[error("Conflicting principal: already {existing}, cannot set {attempted}")]
    ConflictingPrincipal {
        /// Principal already held by the authorization
        existing: String,
        /// Principal that was rejected
        attempted: String,
    },

    /// Tried to merge two authorizations for different grants
    #[error("Identity mismatch: cannot merge {found} into {expected}")]
    IdentityMismatch {
        /// Identity key of the receiving authorization
        expected: String,
        /// Identity key of the authorization being merged in
        found: String,
    },

    /// Authorization lacks a principal or a resource URL
    #[error("Incomplete authorization: {0}")]
    IncompleteAuthorization(String),

    /// RDF text could not be produced or parsed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for ACL model operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Check if this error was caused by misuse of the model API.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AclError::ConflictingPrincipal { .. }
                | AclError::IdentityMismatch { .. }
                | AclError::IncompleteAuthorization(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::ConflictingPrincipal { .. } => "CONFLICTING_PRINCIPAL",
            AclError::IdentityMismatch { .. } => "IDENTITY_MISMATCH",
            AclError::IncompleteAuthorization(_) => "INCOMPLETE_AUTHORIZATION",
            AclError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let err = AclError::ConflictingPrincipal {
            existing: "agent".to_string(),
            attempted: "group".to_string(),
        };
        assert!(err.is_validation_error());
        assert_eq!(err.error_code(), "CONFLICTING_PRINCIPAL");

        let err = AclError::SerializationError("empty".to_string());
        assert!(!err.is_validation_error());
        assert_eq!(err.to_string(), "Serialization error: empty");
    }
}
