//! Gemini `generateContent` client.
//!
//! Buffered calls go to `models/{model}:generateContent`, streaming calls to
//! `models/{model}:streamGenerateContent?alt=sse`, where every SSE message
//! carries one partial `GenerateContentResponse`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::CompletionProvider;
use crate::types::{ChatMessage, CompletionRequest, FragmentStream};
use crate::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Connection settings for the Gemini API
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Enable the url_context tool so the model can read linked pages
    pub url_context: bool,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            url_context: true,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_url_context(mut self, url_context: bool) -> Self {
        self.url_context = url_context;
        self
    }
}

pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, self.config.model, method)
    }

    fn request(&self, url: String, request: &CompletionRequest) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentBody::from_request(request, self.config.url_context))
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = self.endpoint("generateContent");
        debug!("POST {} ({} messages)", url, request.messages.len());

        let response = self.request(url, &request).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        debug!("POST {} ({} messages, streaming)", url, request.messages.len());

        let mut source = self
            .request(url, &request)
            .eventsource()
            .map_err(|e| LlmError::Stream(e.to_string()))?;

        let fragments = async_stream::stream! {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => continue,
                    Ok(Event::Message(message)) => {
                        match serde_json::from_str::<GenerateContentResponse>(&message.data) {
                            Ok(chunk) => {
                                let text = chunk.text();
                                if !text.is_empty() {
                                    yield Ok(text);
                                }
                            }
                            Err(e) => {
                                source.close();
                                yield Err(LlmError::Decode(e));
                                return;
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(e) => {
                        source.close();
                        yield Err(LlmError::from_eventsource(e));
                        return;
                    }
                }
            }
            source.close();
        };

        Ok(Box::pin(fragments))
    }
}

// Wire format

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
}

impl GenerateContentBody {
    fn from_request(request: &CompletionRequest, url_context: bool) -> Self {
        let system_instruction = if request.system_instruction.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: request.system_instruction.iter().map(|t| Part::text(t)).collect(),
            })
        };

        let tools = if url_context {
            vec![serde_json::json!({ "url_context": {} })]
        } else {
            Vec::new()
        };

        Self {
            system_instruction,
            contents: request.messages.iter().map(Content::from).collect(),
            tools,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl From<&ChatMessage> for Content {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            parts: message.parts.iter().map(|t| Part::text(t)).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
