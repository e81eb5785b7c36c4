pub mod handler;
pub mod types;

pub use handler::{handle_stt, handle_tts};
pub use types::{SynthesisRequest, TranscriptionResponse};
