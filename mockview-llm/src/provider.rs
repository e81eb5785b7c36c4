use async_trait::async_trait;
use futures::stream;

use crate::types::{CompletionRequest, FragmentStream};
use crate::LlmError;

/// Text-completion backend. Stateless across calls: every request carries the
/// full conversation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Block until the whole response text is available
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Open a stream of text fragments.
    ///
    /// The default calls `complete` and emits the result as a single fragment.
    /// Backends with native streaming override this.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        let text = self.complete(request).await?;
        Ok(Box::pin(stream::iter(vec![Ok(text)])))
    }
}

/// Speech recognition backend
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe encoded audio into text
    async fn transcribe(&self, audio: &[u8]) -> Result<String, LlmError>;
}

/// Speech synthesis backend
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text into encoded audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, LlmError>;

    /// MIME type of the bytes returned by `synthesize`
    fn content_type(&self) -> &str {
        "audio/mpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct Fixed;

    #[async_trait]
    impl CompletionProvider for Fixed {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
            Ok("whole answer".to_string())
        }
    }

    #[tokio::test]
    async fn default_stream_emits_single_fragment() {
        let stream = Fixed.complete_stream(CompletionRequest::default()).await.unwrap();
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["whole answer".to_string()]);
    }
}
