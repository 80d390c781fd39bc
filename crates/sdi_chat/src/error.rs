//! Error types for the chat system.

use std::fmt;

use sdi_core::CoreError;

use crate::session::SessionError;

/// Chat system errors
#[derive(Debug)]
pub enum ChatError {
    /// Submitted text was empty after trimming
    EmptySubmission,
    /// Session gate refused the operation
    Session(SessionError),
    /// Workflow engine error
    Core(CoreError),
    /// File system error
    IoError(std::io::Error),
    /// Serialization error
    SerializationError(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySubmission => write!(f, "Describe your process before submitting"),
            Self::Session(e) => write!(f, "{}", e),
            Self::Core(e) => write!(f, "{}", e),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Session(e) => Some(e),
            Self::Core(e) => Some(e),
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<CoreError> for ChatError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<SessionError> for ChatError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;
