use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mockview_core::SessionError;
use mockview_llm::LlmError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response structure for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: String, error_type: String, code: Option<String>) -> Self {
        Self {
            error: ErrorDetail {
                message,
                r#type: error_type,
                code,
            },
        }
    }

    pub fn not_found(message: String) -> Self {
        Self::new(message, "not_found".to_string(), Some("session_not_found".to_string()))
    }

    pub fn invalid_request(message: String) -> Self {
        Self::new(message, "invalid_request".to_string(), None)
    }

    pub fn backend_unavailable(message: String) -> Self {
        Self::new(message, "backend_unavailable".to_string(), None)
    }

    pub fn empty_result(message: String) -> Self {
        Self::new(message, "empty_result".to_string(), None)
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(message, "internal_error".to_string(), None)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.r#type.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "invalid_request" => StatusCode::BAD_REQUEST,
            "backend_unavailable" | "empty_result" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<SessionError> for ErrorResponse {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::InvalidInput(_) => ErrorResponse::invalid_request(message),
            SessionError::NotFound(_) => ErrorResponse::not_found(message),
            // backend details stay in the logs
            SessionError::BackendUnavailable(detail) => {
                error!("Backend failure: {}", detail);
                ErrorResponse::backend_unavailable("The interviewer is unavailable right now, please retry".to_string())
            }
            SessionError::EmptyResult => ErrorResponse::empty_result(message),
        }
    }
}

impl From<LlmError> for ErrorResponse {
    fn from(err: LlmError) -> Self {
        SessionError::from(err).into()
    }
}

impl From<MultipartError> for ErrorResponse {
    fn from(err: MultipartError) -> Self {
        error!("Multipart error: {}", err);
        ErrorResponse::invalid_request(err.body_text())
    }
}

/// Custom JSON extractor that returns our ErrorResponse on deserialization failures
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ErrorResponse))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        error!("JSON deserialization error: {}", message);
        ErrorResponse::invalid_request(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_statuses() {
        let cases = [
            (SessionError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (SessionError::not_found("abc"), StatusCode::NOT_FOUND),
            (SessionError::BackendUnavailable("down".into()), StatusCode::BAD_GATEWAY),
            (SessionError::EmptyResult, StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(ErrorResponse::from(err).status(), status);
        }
    }

    #[test]
    fn backend_detail_is_not_exposed() {
        let response = ErrorResponse::from(SessionError::BackendUnavailable("api key rejected".into()));
        assert!(!response.error.message.contains("api key"));
        assert_eq!(response.error.r#type, "backend_unavailable");
    }

    #[test]
    fn envelope_omits_missing_code() {
        let json = serde_json::to_value(ErrorResponse::invalid_request("bad".into())).unwrap();
        assert_eq!(json["error"]["message"], "bad");
        assert_eq!(json["error"]["type"], "invalid_request");
        assert!(json["error"].get("code").is_none());
    }
}
