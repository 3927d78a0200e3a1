//! Tether Core - embeddable streaming session runtime
//!
//! This crate provides the core behind a managed-runtime/native bridge:
//! - Boundary config handling (structured text in, typed config inside)
//! - A single replaceable event sink with mutex-serialized dispatch
//! - A streaming session turn loop with tool round trips
//! - A provider seam for plugging in the actual model transport

pub mod config;
pub mod error;
pub mod provider;
pub mod session;
pub mod tools;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use provider::{
    ChatMessage, ChatRole, Provider, ProviderEvent, ProviderStream, ScriptedProvider,
    ScriptedTurn, ToolRequest,
};
pub use session::{Event, EventSink, SessionManager, SinkRegistry, StreamingSession};
pub use tools::{ToolExecutor, ToolRegistry};
