//! Google Cloud Speech-to-Text and Text-to-Speech over their REST APIs.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{SpeechToText, TextToSpeech};
use crate::LlmError;

pub const SPEECH_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";
pub const SYNTHESIS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Recognition and voice parameters
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub api_key: String,
    pub language_code: String,
    /// Recognition model hint, e.g. "telephony"
    pub recognition_model: String,
    /// Encoding of uploaded audio
    pub audio_encoding: String,
    pub voice_name: String,
    /// Encoding of synthesized audio
    pub synthesis_encoding: String,
    pub recognize_url: String,
    pub synthesize_url: String,
}

impl SpeechConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            language_code: "en-US".to_string(),
            recognition_model: "telephony".to_string(),
            audio_encoding: "WEBM_OPUS".to_string(),
            voice_name: "en-US-Wavenet-F".to_string(),
            synthesis_encoding: "MP3".to_string(),
            recognize_url: SPEECH_URL.to_string(),
            synthesize_url: SYNTHESIS_URL.to_string(),
        }
    }

    pub fn with_language_code(mut self, language_code: String) -> Self {
        self.language_code = language_code;
        self
    }

    pub fn with_recognition_model(mut self, model: String) -> Self {
        self.recognition_model = model;
        self
    }

    pub fn with_voice(mut self, voice_name: String) -> Self {
        self.voice_name = voice_name;
        self
    }
}

pub struct GoogleSpeechClient {
    client: Client,
    config: SpeechConfig,
}

impl GoogleSpeechClient {
    pub fn new(client: Client, config: SpeechConfig) -> Self {
        Self { client, config }
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R, LlmError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    fn recognize_body(&self, audio: &[u8]) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: self.config.audio_encoding.clone(),
                language_code: self.config.language_code.clone(),
                model: self.config.recognition_model.clone(),
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        }
    }

    fn synthesize_body(&self, text: &str) -> SynthesizeRequest {
        SynthesizeRequest {
            input: SynthesisInput { text: text.to_string() },
            voice: VoiceSelection {
                language_code: self.config.language_code.clone(),
                name: self.config.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: self.config.synthesis_encoding.clone(),
            },
        }
    }
}

#[async_trait]
impl SpeechToText for GoogleSpeechClient {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, LlmError> {
        debug!("Recognizing {} bytes of {}", audio.len(), self.config.audio_encoding);
        let response: RecognizeResponse = self.post(&self.config.recognize_url, &self.recognize_body(audio)).await?;
        response.transcript().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl TextToSpeech for GoogleSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, LlmError> {
        debug!("Synthesizing {} chars with voice {}", text.len(), self.config.voice_name);
        let response: SynthesizeResponse = self.post(&self.config.synthesize_url, &self.synthesize_body(text)).await?;
        let audio = STANDARD.decode(response.audio_content)?;
        if audio.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(audio)
    }

    fn content_type(&self) -> &str {
        match self.config.synthesis_encoding.as_str() {
            "OGG_OPUS" => "audio/ogg",
            "LINEAR16" => "audio/wav",
            _ => "audio/mpeg",
        }
    }
}

#[derive(Debug, Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: String,
    language_code: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Best alternative of the first result
    fn transcript(&self) -> Option<String> {
        self.results
            .first()
            .and_then(|r| r.alternatives.first())
            .map(|a| a.transcript.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleSpeechClient {
        GoogleSpeechClient::new(Client::new(), SpeechConfig::new("key".into()))
    }

    #[test]
    fn recognize_body_encodes_audio_and_hints() {
        let body = serde_json::to_value(client().recognize_body(b"abc")).unwrap();
        assert_eq!(body["config"]["encoding"], "WEBM_OPUS");
        assert_eq!(body["config"]["languageCode"], "en-US");
        assert_eq!(body["config"]["model"], "telephony");
        assert_eq!(body["audio"]["content"], "YWJj");
    }

    #[test]
    fn synthesize_body_uses_configured_voice() {
        let speech = GoogleSpeechClient::new(
            Client::new(),
            SpeechConfig::new("key".into()).with_voice("en-GB-Wavenet-B".into()),
        );
        let body = serde_json::to_value(speech.synthesize_body("hello")).unwrap();
        assert_eq!(body["input"]["text"], "hello");
        assert_eq!(body["voice"]["name"], "en-GB-Wavenet-B");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn transcript_takes_first_alternative() {
        let response: RecognizeResponse = serde_json::from_str(
            r#"{"results": [{"alternatives": [{"transcript": "use a queue", "confidence": 0.9}, {"transcript": "use a cue"}]}]}"#,
        )
        .unwrap();
        assert_eq!(response.transcript().as_deref(), Some("use a queue"));
    }

    #[test]
    fn missing_results_means_no_transcript() {
        let response: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.transcript(), None);
    }

    #[test]
    fn content_type_follows_encoding() {
        assert_eq!(client().content_type(), "audio/mpeg");
    }
}
