//! Error handling for mathtutor
//!
//! Malformed input text is never an error: the formatting pipeline degrades
//! to plain text instead. The variants here cover the plumbing around it
//! (generation service, identity provider, dataset, configuration).

use thiserror::Error;

/// Unified error type
#[derive(Debug, Clone, Error)]
pub enum TutorError {
    /// Generation service failed (transport, status, or payload)
    #[error("{message}")]
    Service { message: String },
    /// Service answered but the payload lacked the expected fields
    #[error("Invalid response format from API")]
    InvalidResponse,
    /// Identity provider rejected the request
    #[error("Authentication failed: {message}")]
    Auth { message: String },
    /// Problem dataset could not be read or is inconsistent
    #[error("Dataset error: {message}")]
    Dataset { message: String },
    /// Configuration file or environment is invalid
    #[error("Config error: {message}")]
    Config { message: String },
    /// IO error (for file operations)
    #[error("IO error: {message}")]
    Io { message: String },
    /// Practice command could not be parsed
    #[error("{message}")]
    Command { message: String },
    /// An operation needed a current problem but the filtered list is empty
    #[error("No problem is currently selected")]
    NoCurrentProblem,
}

impl From<std::io::Error> for TutorError {
    fn from(err: std::io::Error) -> Self {
        TutorError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for mathtutor operations
pub type TutorResult<T> = Result<T, TutorError>;

// Convenience constructors for errors
impl TutorError {
    pub fn service(message: impl Into<String>) -> Self {
        TutorError::Service {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        TutorError::Auth {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        TutorError::Dataset {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        TutorError::Config {
            message: message.into(),
        }
    }

    pub fn command(message: impl Into<String>) -> Self {
        TutorError::Command {
            message: message.into(),
        }
    }

    /// Prefix the message with the action that failed, keeping one error
    /// per user action.
    pub fn in_action(self, action: &str) -> Self {
        TutorError::Service {
            message: format!("Failed to {}: {}", action, self),
        }
    }
}
