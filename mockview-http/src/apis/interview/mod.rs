pub mod handler;
pub mod types;

pub use handler::{handle_chat, handle_close_session, handle_get_session, handle_start};
pub use types::{ChatRequest, ChunkData, DoneData, StartRequest, TurnResponse};
