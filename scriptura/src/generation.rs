//! Answer generation seam.
//!
//! The pipeline talks to the remote language model through an object-safe
//! [`AnswerModel`] with two invocation modes that share the same prompt:
//! whole-response ([`AnswerModel::complete`]) and streaming
//! ([`AnswerModel::stream`]). A stream is a finite, non-restartable,
//! consumer-paced sequence of text increments whose concatenation equals
//! the whole response.
//!
//! Failures during a generation call never crash the chat: callers render
//! [`failure_message`] in the answer channel instead (see
//! [`crate::pipeline::RagPipeline::answer`]). Mid-stream failures become
//! one final in-band increment.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use rig::agent::{Agent, MultiTurnStreamItem};
use rig::completion::{CompletionModel, Prompt};
use rig::message::Text;
use rig::streaming::{StreamedAssistantContent, StreamingPrompt};
use tokio::sync::mpsc;

use crate::types::RagError;

/// Channel depth for streamed increments; small so the producer stays
/// paced by the consumer.
const STREAM_BUFFER: usize = 8;

/// In-band text shown in place of an answer when generation fails.
#[must_use]
pub fn failure_message(err: &impl Display) -> String {
    format!("I could not generate an answer: {err}")
}

/// A lazy, finite sequence of answer increments.
///
/// Pull increments with [`AnswerStream::next`]; the sequence ends with
/// `None`. Dropping the stream stops pulling — no cancel signal is sent
/// upstream.
pub struct AnswerStream {
    rx: mpsc::Receiver<String>,
}

impl AnswerStream {
    /// Creates a stream together with the sender side that feeds it.
    pub fn channel() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (tx, Self { rx })
    }

    /// A stream that yields `text` as its single increment.
    #[must_use]
    pub fn once(text: String) -> Self {
        let (tx, stream) = Self::channel();
        // Buffered channel: the single send cannot block.
        let _ = tx.try_send(text);
        stream
    }

    /// Waits for the next increment; `None` when the answer is complete.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drains the stream and concatenates every increment.
    pub async fn collect_text(mut self) -> String {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            text.push_str(&chunk);
        }
        text
    }
}

/// Invokes the remote language model with an already-rendered prompt.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// Blocks until the whole response is available.
    async fn complete(&self, prompt: &str) -> Result<String, RagError>;

    /// Starts a streaming invocation of the same prompt path.
    async fn stream(&self, prompt: &str) -> Result<AnswerStream, RagError>;
}

/// Adapter over a rig [`Agent`] (Gemini in production).
pub struct RigAnswerModel<M>
where
    M: CompletionModel,
{
    agent: Arc<Agent<M>>,
    label: String,
}

impl<M> RigAnswerModel<M>
where
    M: CompletionModel,
{
    pub fn new(agent: Agent<M>, label: impl Into<String>) -> Self {
        Self {
            agent: Arc::new(agent),
            label: label.into(),
        }
    }
}

#[async_trait]
impl<M> AnswerModel for RigAnswerModel<M>
where
    M: CompletionModel + 'static,
{
    async fn complete(&self, prompt: &str) -> Result<String, RagError> {
        self.agent
            .prompt(prompt)
            .await
            .map_err(|err| RagError::provider(&self.label, err))
    }

    async fn stream(&self, prompt: &str) -> Result<AnswerStream, RagError> {
        let agent = Arc::clone(&self.agent);
        let label = self.label.clone();
        let prompt = prompt.to_string();
        let (tx, stream) = AnswerStream::channel();

        tokio::spawn(async move {
            let mut upstream = agent.stream_prompt(prompt).await;
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(
                        Text { text },
                    ))) => {
                        if tx.send(text).await.is_err() {
                            // Consumer stopped pulling.
                            return;
                        }
                    }
                    Ok(MultiTurnStreamItem::FinalResponse(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        let failure = failure_message(&RagError::provider(&label, err));
                        let _ = tx.send(failure).await;
                        return;
                    }
                }
            }
        });

        Ok(stream)
    }
}

/// Scripted model for tests and offline runs: returns a fixed response,
/// streamed in fixed-size increments, or fails on demand.
#[derive(Clone, Debug)]
pub struct MockAnswerModel {
    behavior: MockBehavior,
    chunk_chars: usize,
}

#[derive(Clone, Debug)]
enum MockBehavior {
    Respond(String),
    Fail(String),
}

impl MockAnswerModel {
    /// Always answers with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Respond(response.into()),
            chunk_chars: 12,
        }
    }

    /// Always fails with a provider error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.into()),
            chunk_chars: 12,
        }
    }

    /// Overrides the streaming increment size.
    #[must_use]
    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    fn error(&self, message: &str) -> RagError {
        RagError::provider("mock", message)
    }
}

#[async_trait]
impl AnswerModel for MockAnswerModel {
    async fn complete(&self, _prompt: &str) -> Result<String, RagError> {
        match &self.behavior {
            MockBehavior::Respond(response) => Ok(response.clone()),
            MockBehavior::Fail(message) => Err(self.error(message)),
        }
    }

    async fn stream(&self, _prompt: &str) -> Result<AnswerStream, RagError> {
        match &self.behavior {
            MockBehavior::Respond(response) => {
                let (tx, stream) = AnswerStream::channel();
                let response = response.clone();
                let chunk_chars = self.chunk_chars;
                tokio::spawn(async move {
                    let chars: Vec<char> = response.chars().collect();
                    for piece in chars.chunks(chunk_chars) {
                        let increment: String = piece.iter().collect();
                        if tx.send(increment).await.is_err() {
                            return;
                        }
                    }
                });
                Ok(stream)
            }
            MockBehavior::Fail(message) => Err(self.error(message)),
        }
    }
}
