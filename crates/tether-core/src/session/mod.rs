//! Session module - streaming session runtime
//!
//! Key components:
//!
//! - `SessionManager`: boundary-facing owner of at most one active session
//! - `StreamingSession`: per-session background task running the turn loop
//! - `Event`/`EventSink`: the callback contract toward the embedder
//! - `SinkRegistry`: single mutual-exclusion point for sink registration
//!   and event delivery
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     SessionManager                      │
//! │                                                         │
//! │  send_message(text) ──▶ input_tx ──▶ [StreamingSession] │
//! │                                            │            │
//! │                                         event_tx        │
//! │                                            ▼            │
//! │  set_callback(sink) ──▶ [SinkRegistry] ◀─ [Dispatcher]  │
//! │                              │                          │
//! └──────────────────────────────┼──────────────────────────┘
//!                                ▼
//!                      sink.on_stream_chunk(..)
//!                      sink.on_tool_start(..) ...
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tether_core::provider::ScriptedProvider;
//! use tether_core::session::SessionManager;
//! use tether_core::tools::ToolRegistry;
//!
//! let manager = SessionManager::new(Arc::new(ScriptedProvider::new()), ToolRegistry::new());
//! manager.set_callback(Some(my_sink));
//! assert!(manager.initialize(r#"{"model":"gpt-4"}"#));
//! manager.send_message("Hello!");
//! // ... events arrive on my_sink from a background task ...
//! manager.cleanup();
//! ```

mod dispatch;
mod manager;
mod streaming;
mod types;

pub use dispatch::SinkRegistry;
pub use manager::SessionManager;
pub use streaming::StreamingSession;
pub use types::{Event, EventSink};
