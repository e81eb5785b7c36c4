//! Scripted completion backend for engine tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use mockview_llm::{CompletionProvider, CompletionRequest, FragmentStream, LlmError};

pub(crate) enum Script {
    /// Answer "reply to: <last user text>", streamed as two fragments
    Echo,
    /// Stream these items; `Err` entries become stream errors
    Fragments(Vec<Result<String, String>>),
    /// Stream these fragments, then never finish
    HangAfter(Vec<String>),
    /// Fail before producing anything
    Unavailable,
    /// Succeed with no content
    Empty,
}

pub(crate) struct ScriptedProvider {
    script: Script,
    delay: Duration,
    requests: Mutex<Vec<CompletionRequest>>,
    pub stream_dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            stream_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sleep before answering, to let concurrent callers interleave
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    async fn record(&self, request: &CompletionRequest) {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn echo(request: &CompletionRequest) -> String {
        format!("reply to: {}", request.last_user_text().unwrap_or_default())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.record(&request).await;
        match &self.script {
            Script::Echo => Ok(Self::echo(&request)),
            Script::Fragments(items) => Ok(items.iter().filter_map(|i| i.as_ref().ok()).cloned().collect()),
            Script::HangAfter(_) => futures::future::pending().await,
            Script::Unavailable => Err(LlmError::Api {
                status: 503,
                message: "backend down".into(),
            }),
            Script::Empty => Ok(String::new()),
        }
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        self.record(&request).await;
        let flag = DropFlag(self.stream_dropped.clone());

        let items: Vec<Result<String, LlmError>> = match &self.script {
            Script::Echo => {
                let text = Self::echo(&request);
                let (head, tail) = text.split_at(text.len() / 2);
                vec![Ok(head.to_string()), Ok(tail.to_string())]
            }
            Script::Fragments(items) => items
                .iter()
                .map(|i| i.clone().map_err(LlmError::Stream))
                .collect(),
            Script::HangAfter(fragments) => {
                let head = stream::iter(fragments.clone().into_iter().map(Ok::<String, LlmError>));
                let hanging = head.chain(stream::pending()).map(move |item| {
                    let _flag = &flag;
                    item
                });
                return Ok(Box::pin(hanging));
            }
            Script::Unavailable => {
                return Err(LlmError::Api {
                    status: 503,
                    message: "backend down".into(),
                })
            }
            Script::Empty => Vec::new(),
        };

        Ok(Box::pin(stream::iter(items).map(move |item| {
            let _flag = &flag;
            item
        })))
    }
}
