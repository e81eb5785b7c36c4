use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{SynthesisRequest, TranscriptionResponse};
use crate::{ApiJson, ErrorResponse, ServerState};

const AUDIO_FIELD: &str = "audio";

/// Transcribe the uploaded `audio` field
pub async fn handle_stt(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ErrorResponse> {
    let request_id = Uuid::new_v4();

    let mut audio = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(AUDIO_FIELD) {
            audio = Some(field.bytes().await?);
            break;
        }
    }

    let audio = match audio {
        Some(audio) if !audio.is_empty() => audio,
        _ => {
            warn!("[{}] POST /stt without audio", request_id);
            return Err(ErrorResponse::invalid_request("No audio file uploaded".to_string()));
        }
    };
    info!("[{}] POST /stt ({} bytes)", request_id, audio.len());

    let text = state.stt.transcribe(&audio).await?;
    Ok(Json(TranscriptionResponse { text }))
}

/// Synthesize speech for the given text
pub async fn handle_tts(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<SynthesisRequest>,
) -> Result<Response, ErrorResponse> {
    let request_id = Uuid::new_v4();
    if payload.text.trim().is_empty() {
        return Err(ErrorResponse::invalid_request("Text is required".to_string()));
    }
    info!("[{}] POST /tts ({} chars)", request_id, payload.text.chars().count());

    let audio = state.tts.synthesize(&payload.text).await?;
    let content_type = state.tts.content_type().to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], audio).into_response())
}
