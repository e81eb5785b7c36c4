use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mockview_core::SessionView;
use tracing::info;
use uuid::Uuid;

use super::types::{ChatRequest, StartRequest, TurnResponse};
use crate::streaming::{sse_response, turn_to_sse_stream};
use crate::{ApiJson, ErrorResponse, ServerState};

/// Start an interview about the given article
pub async fn handle_start(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<StartRequest>,
) -> Result<Response, ErrorResponse> {
    let request_id = Uuid::new_v4();
    let stream = payload.stream.unwrap_or(state.stream_by_default);
    info!(
        "[{}] POST /start articleLink={} timeLimitSeconds={:?} stream={}",
        request_id, payload.article_link, payload.time_limit_seconds, stream
    );

    if stream {
        let (session_id, turn) = state
            .controller
            .start_session_streaming(&payload.article_link, payload.time_limit_seconds)
            .await?;
        info!("[{}] - [{}] Streaming opening question", request_id, session_id);
        return Ok(sse_response(turn_to_sse_stream(session_id, true, turn)));
    }

    let output = state
        .controller
        .start_session(&payload.article_link, payload.time_limit_seconds)
        .await?;
    info!("[{}] - [{}] Opening question delivered", request_id, output.session_id);
    Ok(Json(TurnResponse::from(output)).into_response())
}

/// Submit the candidate's reply
pub async fn handle_chat(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Response, ErrorResponse> {
    let request_id = Uuid::new_v4();
    let stream = payload.stream.unwrap_or(state.stream_by_default);
    info!("[{}] - [{}] POST /chat stream={}", request_id, session_id, stream);

    if stream {
        let turn = state
            .controller
            .submit_message_streaming(&session_id, &payload.user_message)
            .await?;
        return Ok(sse_response(turn_to_sse_stream(session_id, false, turn)));
    }

    let output = state
        .controller
        .submit_message(&session_id, &payload.user_message)
        .await?;
    info!("[{}] - [{}] Reply delivered", request_id, session_id);
    Ok(Json(TurnResponse::from(output)).into_response())
}

/// Session status and committed transcript
pub async fn handle_get_session(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ErrorResponse> {
    let request_id = Uuid::new_v4();
    info!("[{}] - [{}] GET /chat", request_id, session_id);

    let view = state.controller.session_view(&session_id).await?;
    Ok(Json(view))
}

/// End an interview early
pub async fn handle_close_session(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    let request_id = Uuid::new_v4();
    info!("[{}] - [{}] DELETE /chat", request_id, session_id);

    state.controller.close_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
