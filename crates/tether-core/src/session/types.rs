//! Session event types and the sink contract
//!
//! These types define the output protocol between the session runtime and
//! whatever boundary layer (UI, FFI shim, test harness) registered a sink.

use serde::{Deserialize, Serialize};

/// Events emitted by a session toward the registered sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Complete answer for a turn (terminal)
    Message { text: String },
    /// Ordered fragment of the answer in progress
    StreamChunk { text: String },
    /// A tool invocation is starting
    ToolStart { tool_name: String, tool_id: String },
    /// A previously started tool invocation finished
    ToolComplete { tool_id: String, result: String },
    /// The turn failed (terminal); the session stays usable
    Error { message: String },
}

impl Event {
    /// Create a terminal message event
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    /// Create a stream chunk event
    pub fn stream_chunk(text: impl Into<String>) -> Self {
        Self::StreamChunk { text: text.into() }
    }

    /// Create a tool start event
    pub fn tool_start(tool_name: impl Into<String>, tool_id: impl Into<String>) -> Self {
        Self::ToolStart {
            tool_name: tool_name.into(),
            tool_id: tool_id.into(),
        }
    }

    /// Create a tool complete event
    pub fn tool_complete(tool_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self::ToolComplete {
            tool_id: tool_id.into(),
            result: result.into(),
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Message { .. } | Self::Error { .. })
    }

    /// Invoke the matching sink callback for this event
    pub fn dispatch_to(&self, sink: &dyn EventSink) {
        match self {
            Self::Message { text } => sink.on_message(text),
            Self::StreamChunk { text } => sink.on_stream_chunk(text),
            Self::ToolStart { tool_name, tool_id } => sink.on_tool_start(tool_name, tool_id),
            Self::ToolComplete { tool_id, result } => sink.on_tool_complete(tool_id, result),
            Self::Error { message } => sink.on_error(message),
        }
    }
}

/// The registered listener receiving session events
///
/// Callbacks are synchronous and run on a runtime worker thread, serialized
/// through the dispatch lock; implementations should hand work off rather
/// than block.
pub trait EventSink: Send + Sync {
    fn on_message(&self, text: &str);
    fn on_stream_chunk(&self, text: &str);
    fn on_tool_start(&self, tool_name: &str, tool_id: &str);
    fn on_tool_complete(&self, tool_id: &str, result: &str);
    fn on_error(&self, message: &str);
}
