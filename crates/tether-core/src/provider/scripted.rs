//! Deterministic provider for demos and tests
//!
//! Plays back pre-scripted exchanges instead of talking to a real model
//! endpoint. When the script is exhausted it falls back to echoing the
//! last user message, so an interactive driver keeps working.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;

use super::{ChatMessage, ChatRole, Provider, ProviderEvent, ProviderStream, ToolRequest};
use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// One scripted provider exchange
#[derive(Debug, Clone)]
pub struct ScriptedTurn {
    /// Answer text, chunk-split on emission
    pub response: String,
    /// Tool calls to request; when non-empty the exchange ends without a
    /// final answer and the session is expected to come back with results
    pub tool_calls: Vec<ToolRequest>,
    /// Fail the exchange instead of answering
    pub error: Option<String>,
}

impl ScriptedTurn {
    /// An exchange that answers with the given text
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            tool_calls: Vec::new(),
            error: None,
        }
    }

    /// An exchange that requests tool calls and no answer
    pub fn tool_calls(calls: Vec<ToolRequest>) -> Self {
        Self {
            response: String::new(),
            tool_calls: calls,
            error: None,
        }
    }

    /// An exchange that fails
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response: String::new(),
            tool_calls: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Provider that replays scripted exchanges in order
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    chunk_size: usize,
}

impl ScriptedProvider {
    /// Create an empty script; exchanges echo the last user message
    pub fn new() -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            chunk_size: 1,
        }
    }

    /// Set how many characters each emitted chunk carries
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Append an exchange to the script
    pub fn push_turn(&self, turn: ScriptedTurn) {
        self.turns.lock().push_back(turn);
    }

    fn chunk_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn stream_exchange(
        &self,
        _config: &SessionConfig,
        history: &[ChatMessage],
    ) -> Result<ProviderStream> {
        let turn = self.turns.lock().pop_front().unwrap_or_else(|| {
            let last_user = history
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.as_str())
                .unwrap_or_default();
            ScriptedTurn::reply(format!("Echo: {last_user}"))
        });

        if let Some(message) = turn.error {
            let events = vec![Err(Error::Provider(message))];
            return Ok(futures::stream::iter(events).boxed());
        }

        let mut events: Vec<Result<ProviderEvent>> = Vec::new();
        if turn.tool_calls.is_empty() {
            for chunk in self.chunk_split(&turn.response) {
                events.push(Ok(ProviderEvent::Chunk(chunk)));
            }
            events.push(Ok(ProviderEvent::Final(turn.response)));
        } else {
            for call in turn.tool_calls {
                events.push(Ok(ProviderEvent::ToolCall(call)));
            }
        }
        Ok(futures::stream::iter(events).boxed())
    }
}
