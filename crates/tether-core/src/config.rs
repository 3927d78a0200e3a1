//! Session configuration
//!
//! Configuration crosses the boundary as a JSON document. It is parsed into
//! this typed form immediately on entry; the raw text never travels further
//! into the runtime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default cap on provider/tool round trips within a single turn
pub const DEFAULT_MAX_TURN_ITERATIONS: u32 = 25;

/// Typed session configuration
///
/// Immutable once applied to a turn: the session snapshots the shared
/// config slot at turn start, so a concurrent `set_config` is only
/// visible to subsequent turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Model name (required, non-empty)
    pub model: String,
    /// Provider endpoint URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key, if not supplied out of band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Response token cap passed through to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Cap on provider/tool round trips within one turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turn_iterations: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            endpoint: None,
            api_key: None,
            max_tokens: None,
            max_turn_iterations: None,
        }
    }
}

impl SessionConfig {
    /// Create a config for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the response token cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the per-turn iteration cap
    pub fn with_max_turn_iterations(mut self, cap: u32) -> Self {
        self.max_turn_iterations = Some(cap);
        self
    }

    /// Parse a boundary JSON document into a validated config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to the boundary JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate required fields and numeric limits
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("missing required field: model".to_string()));
        }
        if self.max_tokens == Some(0) {
            return Err(Error::Config("max_tokens must be positive".to_string()));
        }
        if self.max_turn_iterations == Some(0) {
            return Err(Error::Config(
                "max_turn_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective per-turn iteration cap
    pub fn turn_iteration_cap(&self) -> u32 {
        self.max_turn_iterations
            .unwrap_or(DEFAULT_MAX_TURN_ITERATIONS)
    }
}
