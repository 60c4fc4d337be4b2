//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use learning_path_core::{LearningError, PortError};

/// Shown to the client when the LLM provider could not be reached.
const SERVICE_UNAVAILABLE: &str = "The AI service is unavailable right now. Please try again.";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a rejected step of the learning flow.
    #[error("Learning Error: {0}")]
    Learning(#[from] LearningError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error related to the WebSocket connection.
    #[error("WebSocket Error: {0}")]
    Websocket(#[from] axum::Error),

    /// Represents a client frame that is not part of the protocol.
    #[error("Invalid message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// The text sent to the client in an `error` frame.
    ///
    /// Rejected steps are explained as-is; infrastructure failures are reduced to a
    /// generic message and only logged in full.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Learning(LearningError::Port(port)) | ApiError::Port(port) => match port {
                PortError::Malformed(message) => message.clone(),
                PortError::Unexpected(_) => SERVICE_UNAVAILABLE.to_string(),
            },
            ApiError::Learning(e) => e.to_string(),
            ApiError::Protocol(_) => "Unrecognised message.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn learning_errors_are_shown_verbatim() {
        let err = ApiError::from(LearningError::InvalidInput(
            "Please enter a subject to learn.".to_string(),
        ));
        assert_eq!(err.client_message(), "Please enter a subject to learn.");

        let id = Uuid::new_v4();
        let err = ApiError::from(LearningError::TopicLocked(id));
        assert_eq!(err.client_message(), format!("Topic {} is locked", id));
    }

    #[test]
    fn malformed_generation_keeps_its_message() {
        let err = ApiError::from(LearningError::from(PortError::Malformed(
            "Failed to generate a valid quiz.".to_string(),
        )));
        assert_eq!(err.client_message(), "Failed to generate a valid quiz.");
    }

    #[test]
    fn provider_failures_are_not_leaked() {
        let err = ApiError::from(PortError::Unexpected("401 invalid api key sk-...".to_string()));
        assert_eq!(err.client_message(), SERVICE_UNAVAILABLE);
    }
}
