pub mod apis;
pub mod error;
pub mod http;
pub mod streaming;

pub use error::{ApiJson, ErrorResponse};
pub use http::{router, start_server, ServerConfig, ServerState, DEFAULT_MAX_AUDIO_BYTES};
pub use streaming::{sse_response, turn_to_sse_stream};
