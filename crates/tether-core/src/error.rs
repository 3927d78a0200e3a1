//! Error types for Tether Core

use thiserror::Error;

/// Result type alias using Tether Error
pub type Result<T> = std::result::Result<T, Error>;

/// Tether error types
///
/// Nothing in this taxonomy ever crosses the manager boundary as a panic:
/// boundary operations translate errors into a boolean, a logged no-op, or
/// an `Event::Error` delivered to the sink.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Operation requested in a state that cannot honor it
    /// (e.g. `send_message` before `initialize`)
    #[error("State error: {0}")]
    State(String),

    /// Failure reported by the model provider; recoverable, the
    /// session stays usable for the next turn
    #[error("Provider error: {0}")]
    Provider(String),

    /// Tool execution failure
    #[error("Tool error: {0}")]
    Tool(String),

    /// Invariant violation inside the runtime (logic defect)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,
}
