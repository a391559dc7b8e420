//! Unified error system for Agora
//!
//! A single error type shared by every library crate. Collaborator failures
//! arrive as `StoreError` and are folded into `AgoraError::Dependency` so that
//! callers can always tell "the store was unreachable" apart from "denied".

use crate::effects::StoreError;
use serde::{Deserialize, Serialize};

/// Unified error type for all Agora operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AgoraError {
    /// Item, story or user does not resolve to a live record
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Requester is known but policy denies the action
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message describing the denial
        message: String,
    },

    /// Malformed input or malformed stored document
    #[error("Validation failed: {message}")]
    Validation {
        /// Error message describing the invalid input
        message: String,
    },

    /// A collaborator (graph store, content registry, story store) failed
    #[error("Dependency {dependency} failed: {message}")]
    Dependency {
        /// Name of the failing collaborator
        dependency: String,
        /// Error message reported by the collaborator
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl AgoraError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a dependency error
    pub fn dependency(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dependency {
            dependency: dependency.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dependency { .. })
    }

    /// Wrap a store failure with the name of the collaborator that raised it.
    pub fn from_store(dependency: &str, err: StoreError) -> Self {
        Self::dependency(dependency, err.to_string())
    }
}

/// Standard Result type for Agora operations
pub type Result<T> = std::result::Result<T, AgoraError>;

impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for AgoraError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AgoraError::validation("missing visibility");
        assert!(matches!(err, AgoraError::Validation { .. }));
        assert_eq!(err.to_string(), "Validation failed: missing visibility");
    }

    #[test]
    fn test_only_dependency_is_retryable() {
        assert!(AgoraError::dependency("social-graph", "down").is_retryable());
        assert!(!AgoraError::forbidden("no").is_retryable());
        assert!(!AgoraError::not_found("gone").is_retryable());
    }

    #[test]
    fn test_store_error_conversion() {
        let err = AgoraError::from_store(
            "content-registry",
            StoreError::Unavailable("connection refused".into()),
        );
        match err {
            AgoraError::Dependency {
                dependency,
                message,
            } => {
                assert_eq!(dependency, "content-registry");
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(matches!(
            AgoraError::from(io_err),
            AgoraError::NotFound { .. }
        ));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(matches!(AgoraError::from(denied), AgoraError::Internal { .. }));
    }
}
