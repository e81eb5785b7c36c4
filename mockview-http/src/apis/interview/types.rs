use mockview_core::TurnOutput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(default)]
    pub article_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<i64>,
    /// Overrides the server's default response mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Buffered response of `/start` and `/chat/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub session_id: String,
    pub message: String,
}

impl From<TurnOutput> for TurnResponse {
    fn from(output: TurnOutput) -> Self {
        Self {
            session_id: output.session_id,
            message: output.message,
        }
    }
}

/// Data of an SSE `chunk` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkData {
    pub text: String,
}

/// Data of an SSE `done` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneData {
    pub session_id: String,
    pub message: String,
}
