pub mod budget;
pub mod controller;
pub mod directives;
pub mod error;
pub mod generator;
pub mod logging;
pub mod session;
pub mod transcript;

#[cfg(test)]
mod testing;

pub use controller::{ControllerConfig, SessionController, SessionView, TurnOutput, TurnView, DEFAULT_TIME_LIMIT};
pub use directives::{Directives, PacingTier};
pub use error::SessionError;
pub use generator::{TurnEvent, TurnGenerator, TurnInput, TurnState, TurnStream};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use session::{Session, SessionRegistry};
pub use transcript::{Transcript, Turn};

pub use mockview_llm::Role;
