//! Unified error type for the restyle CLI boundary.
//!
//! Subsystem errors (parse failures, transform failures) are bridged
//! into [`RestyleError`] via `From` impls defined next to the subsystem
//! error types. Diagnostics are not errors and never pass through here.

use std::io;

use thiserror::Error;

/// Canonical error type surfaced by the CLI.
#[derive(Debug, Error)]
pub enum RestyleError {
    /// Invalid invocation (bad arguments from the caller).
    #[error("invalid arguments: {message}")]
    Usage { message: String },

    /// The requested transform is not registered.
    #[error("unknown transform '{name}' (registered: {registered})")]
    UnknownTransform { name: String, registered: String },

    /// Filesystem failure while reading or writing a source file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A bug or structurally impossible state.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RestyleError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        RestyleError::Usage {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RestyleError::Internal {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RestyleError::Usage { .. } | RestyleError::UnknownTransform { .. } => 2,
            RestyleError::Io(_) => 3,
            RestyleError::Internal { .. } => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_display() {
        let err = RestyleError::usage("missing directory");
        assert_eq!(err.to_string(), "invalid arguments: missing directory");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_transform_display() {
        let err = RestyleError::UnknownTransform {
            name: "nope".to_string(),
            registered: "emotion-to-linaria, apollo-hooks".to_string(),
        };
        assert!(err.to_string().contains("nope"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn internal_maps_to_ten() {
        assert_eq!(RestyleError::internal("bug").exit_code(), 10);
    }
}
