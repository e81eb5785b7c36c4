//! Turn Generator: one request/response exchange against the completion
//! backend, buffered or streamed, committed to the transcript only when whole.
//!
//! In streaming mode fragments reach the caller before the turn commits. If
//! the backend fails or the caller disconnects mid-stream, whatever was
//! already forwarded stands on the client side while the server-side
//! transcript stays as it was before the call.

mod lifecycle;

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use mockview_llm::{CompletionProvider, CompletionRequest};
use tokio::sync::OwnedMutexGuard;

use crate::directives::Directives;
use crate::session::Session;
use crate::transcript::Transcript;
use crate::SessionError;

pub use lifecycle::{TurnInput, TurnLifecycle, TurnState};

/// What the caller observes while a streamed turn runs
#[derive(Debug)]
pub enum TurnEvent {
    /// Backend fragment, forwarded in emission order
    Fragment(String),
    /// Turn is in the transcript; `text` is the concatenation of all fragments
    Committed { text: String },
    /// Turn ended without a commit
    Failed(SessionError),
}

pub type TurnStream = Pin<Box<dyn Stream<Item = TurnEvent> + Send>>;

#[derive(Clone)]
pub struct TurnGenerator {
    provider: Arc<dyn CompletionProvider>,
    directives: Arc<Directives>,
}

impl TurnGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_directives(provider, Directives::default())
    }

    pub fn with_directives(provider: Arc<dyn CompletionProvider>, directives: Directives) -> Self {
        Self {
            provider,
            directives: Arc::new(directives),
        }
    }

    fn build_request(&self, lifecycle: &TurnLifecycle) -> CompletionRequest {
        CompletionRequest::new(
            self.directives.render(lifecycle.session().time_limit()),
            lifecycle.messages(),
        )
    }

    /// Buffered mode: wait for the full answer, commit one model turn, return its text
    pub async fn generate(
        &self,
        session: Arc<Session>,
        transcript: OwnedMutexGuard<Transcript>,
        input: TurnInput,
    ) -> Result<String, SessionError> {
        let mut lifecycle = TurnLifecycle::new(session, transcript, input);
        let request = self.build_request(&lifecycle);

        lifecycle.transition(TurnState::Requesting);
        match self.provider.complete(request).await {
            Ok(text) if !text.trim().is_empty() => {
                lifecycle.commit(text.clone());
                Ok(text)
            }
            Ok(_) => {
                let err = SessionError::EmptyResult;
                lifecycle.discard(TurnState::Failed, &err);
                Err(err)
            }
            Err(e) => {
                let err = SessionError::from(e);
                lifecycle.discard(TurnState::Failed, &err);
                Err(err)
            }
        }
    }

    /// Streaming mode: forward fragments as they arrive, commit on clean end.
    ///
    /// Dropping the returned stream drops the backend stream with it, so no
    /// further fragments are consumed, and releases the transcript lock.
    pub fn stream(
        &self,
        session: Arc<Session>,
        transcript: OwnedMutexGuard<Transcript>,
        input: TurnInput,
    ) -> TurnStream {
        let mut lifecycle = TurnLifecycle::new(session, transcript, input);
        let request = self.build_request(&lifecycle);
        let provider = self.provider.clone();

        Box::pin(async_stream::stream! {
            lifecycle.transition(TurnState::Requesting);
            let mut fragments = match provider.complete_stream(request).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    let err = SessionError::from(e);
                    lifecycle.discard(TurnState::Failed, &err);
                    yield TurnEvent::Failed(err);
                    return;
                }
            };

            lifecycle.transition(TurnState::Streaming);
            let mut accumulated = String::new();
            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(fragment) => {
                        if fragment.is_empty() {
                            continue;
                        }
                        accumulated.push_str(&fragment);
                        yield TurnEvent::Fragment(fragment);
                    }
                    Err(e) => {
                        let err = SessionError::from(e);
                        lifecycle.discard(TurnState::Aborted, &err);
                        yield TurnEvent::Failed(err);
                        return;
                    }
                }
            }

            if accumulated.trim().is_empty() {
                let err = SessionError::EmptyResult;
                lifecycle.discard(TurnState::Failed, &err);
                yield TurnEvent::Failed(err);
                return;
            }

            lifecycle.commit(accumulated.clone());
            yield TurnEvent::Committed { text: accumulated };
        })
    }
}
