//! Tool execution seam
//!
//! Tools are sub-operations the session delegates out on the provider's
//! request. The runtime only defines the seam; concrete tools are supplied
//! by the embedder when the session is built.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A named sub-operation the session can delegate to
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute with the provider-supplied arguments, returning the result
    /// text that is fed back into the conversation
    async fn execute(&self, arguments: serde_json::Value) -> Result<String>;
}

/// Registry of tools available to a session, keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the given name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, tool: Arc<dyn ToolExecutor>) {
        self.tools.insert(name.into(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
