//! Model provider abstraction
//!
//! The actual transport to a model provider is an external collaborator:
//! this module only defines the seam the session runtime drives. A provider
//! answers one model exchange at a time as a stream of [`ProviderEvent`]s —
//! text chunks, tool-call requests, and a final assembled message.

mod scripted;

pub use scripted::{ScriptedProvider, ScriptedTurn};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::Result;

/// Role of a message in the conversation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    Tool,
}

/// One entry in the conversation history handed to the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// For tool results: the id of the tool call this answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a tool result message
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool invocation requested by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Provider-assigned call id; must be unique among outstanding calls
    pub call_id: String,
    /// Tool name to invoke
    pub name: String,
    /// Tool arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// Incremental output of one model exchange
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// A fragment of the answer text, in order
    Chunk(String),
    /// The provider wants a tool executed
    ToolCall(ToolRequest),
    /// The complete answer text; ends the exchange
    Final(String),
}

/// Stream of events for one model exchange
pub type ProviderStream = BoxStream<'static, Result<ProviderEvent>>;

/// Seam to the underlying model provider
///
/// `stream_exchange` is called once per provider round trip within a turn.
/// Implementations must emit chunks in order and end with exactly one
/// `Final` event (or an `Err` item, which aborts the turn with an error).
#[async_trait]
pub trait Provider: Send + Sync {
    async fn stream_exchange(
        &self,
        config: &SessionConfig,
        history: &[ChatMessage],
    ) -> Result<ProviderStream>;
}
