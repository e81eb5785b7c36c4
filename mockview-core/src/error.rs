use mockview_llm::LlmError;
use thiserror::Error;

/// Failures surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed or missing input, correctable by the caller
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown, closed or expired session id
    #[error("session not found or has expired: {0}")]
    NotFound(String),

    /// Completion or speech backend unreachable or errored
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend answered without usable content
    #[error("backend returned no usable content")]
    EmptyResult,
}

impl SessionError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SessionError::InvalidInput(message.into())
    }

    pub fn not_found(session_id: impl Into<String>) -> Self {
        SessionError::NotFound(session_id.into())
    }
}

impl From<LlmError> for SessionError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyResponse => SessionError::EmptyResult,
            other => SessionError::BackendUnavailable(other.to_string()),
        }
    }
}
