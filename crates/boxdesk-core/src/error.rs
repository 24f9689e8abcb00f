//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Remote Errors
    // ─────────────────────────────────────────────────────────────
    /// The remote side reported a failure for a specific request.
    #[error("{operation} failed for \"{path}\": {message}")]
    Remote {
        operation: String,
        path: String,
        message: String,
    },

    /// No response arrived for a request within the configured timeout.
    #[error("{operation} timed out for \"{path}\"")]
    TimedOut { operation: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Terminal session already open: {id}")]
    DuplicateSession { id: String },

    // ─────────────────────────────────────────────────────────────
    // Local State Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed local state: {message}")]
    MalformedState { message: String },

    #[error("Storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    #[error("Failed to decode payload: {message}")]
    Decode { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn remote(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn timed_out(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::TimedOut {
            operation: operation.into(),
            path: path.into(),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    pub fn duplicate_session(id: impl Into<String>) -> Self {
        Self::DuplicateSession { id: id.into() }
    }

    pub fn malformed_state(message: impl Into<String>) -> Self {
        Self::MalformedState {
            message: message.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// Errors the user should see as a blocking notification.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Remote { .. } | Error::TimedOut { .. } | Error::Decode { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigInvalid { .. } | Error::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_names_operation_and_path() {
        let err = Error::remote("Open file", "src/main.py", "No such file");
        assert_eq!(
            err.to_string(),
            "Open file failed for \"src/main.py\": No such file"
        );
    }

    #[test]
    fn test_timed_out_display() {
        let err = Error::timed_out("List files", "/");
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("List files"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::remote("Delete", "a.txt", "denied").is_user_facing());
        assert!(Error::timed_out("Download", "a.txt").is_user_facing());
        assert!(!Error::malformed_state("bad json").is_user_facing());
        assert!(!Error::session_not_found("t1").is_user_facing());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::ChannelClosed.is_fatal());
        assert!(Error::config_invalid("endpoint missing").is_fatal());
        assert!(!Error::remote("Delete", "a", "b").is_fatal());
    }
}
