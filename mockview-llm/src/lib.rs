pub mod error;
pub mod gemini;
pub mod provider;
pub mod speech;
pub mod types;

pub use error::LlmError;
pub use gemini::{GeminiConfig, GeminiProvider};
pub use provider::{CompletionProvider, SpeechToText, TextToSpeech};
pub use speech::{GoogleSpeechClient, SpeechConfig};
pub use types::{ChatMessage, CompletionRequest, FragmentStream, Role};
