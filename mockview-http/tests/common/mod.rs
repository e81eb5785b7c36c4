//! Common test utilities.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use futures::stream;
use mockview_http::{router, ServerConfig, ServerState};
use mockview_llm::{
    CompletionProvider, CompletionRequest, FragmentStream, LlmError, SpeechToText, TextToSpeech,
};

/// How the fake interviewer answers
#[derive(Clone)]
pub enum Reply {
    /// "reply to: <last user text>", streamed as a single fragment
    Echo,
    /// Stream these items; `Err` entries become stream errors
    Fragments(Vec<Result<String, String>>),
    /// Every call fails
    Unavailable,
}

pub struct FakeCompletion {
    reply: Reply,
}

impl FakeCompletion {
    pub fn new(reply: Reply) -> Self {
        Self { reply }
    }
}

fn backend_down() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "backend down".to_string(),
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        match &self.reply {
            Reply::Echo => Ok(format!("reply to: {}", request.last_user_text().unwrap_or_default())),
            Reply::Fragments(items) => Ok(items.iter().filter_map(|i| i.as_ref().ok()).cloned().collect()),
            Reply::Unavailable => Err(backend_down()),
        }
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        match &self.reply {
            Reply::Echo => {
                let text = self.complete(request).await?;
                Ok(Box::pin(stream::iter(vec![Ok(text)])))
            }
            Reply::Fragments(items) => {
                let items: Vec<Result<String, LlmError>> =
                    items.iter().map(|i| i.clone().map_err(LlmError::Stream)).collect();
                Ok(Box::pin(stream::iter(items)))
            }
            Reply::Unavailable => Err(backend_down()),
        }
    }
}

pub struct FakeSpeech;

pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3-bytes";

#[async_trait]
impl SpeechToText for FakeSpeech {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, LlmError> {
        Ok(format!("heard {} bytes", audio.len()))
    }
}

#[async_trait]
impl TextToSpeech for FakeSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, LlmError> {
        Ok(FAKE_AUDIO.to_vec())
    }
}

/// Create a test app answering with `reply`, buffered unless a request asks for streaming.
pub fn test_app(reply: Reply) -> Router {
    let config = ServerConfig::new("127.0.0.1:0".to_string())
        .with_stream_by_default(false)
        .with_max_audio_bytes(1024);
    let speech = Arc::new(FakeSpeech);
    let state = ServerState::new(
        &config,
        Arc::new(FakeCompletion::new(reply)),
        speech.clone(),
        speech,
    );
    router(state)
}

/// Parse SSE events from a response body into `(event, data)` pairs.
pub fn parse_sse_events(body: &str) -> Vec<(String, String)> {
    let mut events = Vec::new();
    let mut current_event = String::new();
    let mut current_data = String::new();

    for line in body.lines() {
        if let Some(event_name) = line.strip_prefix("event:") {
            current_event = event_name.trim().to_string();
        } else if let Some(data) = line.strip_prefix("data:") {
            current_data = data.trim().to_string();
        } else if line.is_empty() && !current_event.is_empty() {
            events.push((current_event.clone(), current_data.clone()));
            current_event.clear();
            current_data.clear();
        }
    }

    if !current_event.is_empty() {
        events.push((current_event, current_data));
    }

    events
}
