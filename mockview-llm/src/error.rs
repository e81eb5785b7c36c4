use thiserror::Error;

/// Errors raised by the completion and speech backends
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed before a response was received
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server-sent event stream broke mid-way
    #[error("stream error: {0}")]
    Stream(String),

    /// Audio payload was not valid base64
    #[error("invalid audio payload: {0}")]
    Audio(#[from] base64::DecodeError),

    /// Backend answered but returned nothing usable
    #[error("backend returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    pub(crate) fn from_eventsource(err: reqwest_eventsource::Error) -> Self {
        match err {
            reqwest_eventsource::Error::Transport(e) => LlmError::Request(e),
            reqwest_eventsource::Error::InvalidStatusCode(status, _) => LlmError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            },
            other => LlmError::Stream(other.to_string()),
        }
    }
}
