//! Custom error types for the analysis session
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors that occupy the session's single user-visible error slot.
///
/// Every variant is recoverable: the session returns to `AwaitingInput` or
/// keeps its current result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Invalid file type ({mime_type}). Please upload or paste an image.")]
    InvalidInputType { mime_type: String },

    #[error("No input data provided.")]
    EmptyInput,

    #[error("No analysis generated")]
    AnalysisUnavailable,

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("Model request failed: {0}")]
    ModelRequest(String),

    #[error("Communication failed: {0}")]
    ChatTurnFailed(String),
}

impl SessionError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidInputType { .. } => "invalid_input_type",
            SessionError::EmptyInput => "empty_input",
            SessionError::AnalysisUnavailable => "analysis_unavailable",
            SessionError::MalformedResponse(_) => "malformed_response",
            SessionError::ModelRequest(_) => "model_request",
            SessionError::ChatTurnFailed(_) => "chat_turn_failed",
        }
    }

    /// True for errors caused by what the user supplied rather than the model
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidInputType { .. } | SessionError::EmptyInput
        )
    }
}

impl Serialize for SessionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Errors raised by a model backend while talking to the external service
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("OpenAI client error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("No API key configured for provider {provider}")]
    MissingApiKey { provider: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
