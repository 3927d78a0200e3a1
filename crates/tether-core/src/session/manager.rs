//! Session Manager - the boundary-facing owner of the active session
//!
//! An explicit object, constructed at process start and handed to whatever
//! boundary layer needs it; there is no global state. It owns at most one
//! active [`StreamingSession`] plus the sink registry, and exposes the
//! boundary operations: initialize, send_message, set_config, get_config,
//! set_callback, cleanup.
//!
//! Boundary operations never panic and never block on in-flight work:
//! failures become a boolean, a logged no-op, or an `Error` event.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::dispatch::{spawn_dispatcher, SinkRegistry};
use super::streaming::StreamingSession;
use super::types::EventSink;
use crate::config::SessionConfig;
use crate::provider::Provider;
use crate::tools::ToolRegistry;

/// Buffer size for the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

struct ActiveSession {
    session_id: String,
    input_tx: mpsc::UnboundedSender<String>,
    /// Shared with the session task; guarded for atomic hot-swap
    config: Arc<RwLock<SessionConfig>>,
    session_task: JoinHandle<()>,
    dispatcher_task: JoinHandle<()>,
}

/// Owner of at most one active streaming session and one sink registration
pub struct SessionManager {
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    sinks: Arc<SinkRegistry>,
    active: Mutex<Option<ActiveSession>>,
    /// Runtime handle captured at construction so boundary calls stay
    /// synchronous and work from any thread
    runtime: Handle,
}

impl SessionManager {
    /// Create a manager; must be called within a tokio runtime
    pub fn new(provider: Arc<dyn Provider>, tools: ToolRegistry) -> Self {
        Self {
            provider,
            tools,
            sinks: Arc::new(SinkRegistry::new()),
            active: Mutex::new(None),
            runtime: Handle::current(),
        }
    }

    /// Initialize a session from boundary JSON config
    ///
    /// Returns false when the config is malformed or incomplete. An already
    /// active session is torn down first; the sink registration survives.
    pub fn initialize(&self, config_json: &str) -> bool {
        let config = match SessionConfig::from_json(config_json) {
            Ok(config) => config,
            Err(e) => {
                error!("initialize rejected: {e}");
                return false;
            }
        };

        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            info!("Replacing active session: {}", previous.session_id);
            self.teardown(previous, false);
        }

        let session_id = Uuid::new_v4().to_string();
        let config = Arc::new(RwLock::new(config));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let dispatcher_task = {
            let _guard = self.runtime.enter();
            spawn_dispatcher(self.sinks.clone(), self.sinks.current_epoch(), event_rx)
        };

        let session = StreamingSession::new(
            session_id.clone(),
            input_rx,
            event_tx,
            self.provider.clone(),
            self.tools.clone(),
            config.clone(),
        );
        let session_task = self.runtime.spawn(session.run());

        info!("Session initialized: {}", session_id);
        *active = Some(ActiveSession {
            session_id,
            input_tx,
            config,
            session_task,
            dispatcher_task,
        });
        true
    }

    /// Whether a session is currently active
    pub fn is_initialized(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Queue a message for the active session; fire-and-forget
    ///
    /// Results arrive through the registered sink. Logged no-op when no
    /// session is active.
    pub fn send_message(&self, text: &str) {
        let active = self.active.lock();
        match active.as_ref() {
            Some(session) => {
                if session.input_tx.send(text.to_string()).is_err() {
                    error!(
                        "send_message dropped: session {} is no longer running",
                        session.session_id
                    );
                }
            }
            None => error!("send_message ignored: no active session"),
        }
    }

    /// Atomically swap the active session's config
    ///
    /// Logged no-op when the JSON is invalid or no session is active.
    /// In-flight turns keep the snapshot they started with.
    pub fn set_config(&self, config_json: &str) {
        let config = match SessionConfig::from_json(config_json) {
            Ok(config) => config,
            Err(e) => {
                error!("set_config rejected: {e}");
                return;
            }
        };
        let active = self.active.lock();
        match active.as_ref() {
            Some(session) => {
                *session.config.write() = config;
                info!("Session config updated: {}", session.session_id);
            }
            None => error!("set_config ignored: no active session"),
        }
    }

    /// Snapshot the current config as boundary JSON
    ///
    /// Returns the default config serialization when uninitialized; never
    /// a torn value under concurrent `set_config`.
    pub fn get_config(&self) -> String {
        let snapshot = {
            let active = self.active.lock();
            match active.as_ref() {
                Some(session) => session.config.read().clone(),
                None => SessionConfig::default(),
            }
        };
        snapshot.to_json().unwrap_or_else(|e| {
            error!("Config serialization failed: {e}");
            "{}".to_string()
        })
    }

    /// Replace or detach the registered sink
    ///
    /// Passing `None` detaches: events produced afterwards are dropped,
    /// not queued. Safe concurrently with an in-flight dispatch.
    pub fn set_callback(&self, sink: Option<Arc<dyn EventSink>>) {
        self.sinks.set(sink);
    }

    /// Tear down the active session and release the sink reference
    ///
    /// Idempotent; safe when never initialized. Cancels in-flight
    /// background work; once this returns, no further sink dispatch occurs.
    pub fn cleanup(&self) {
        let mut active = self.active.lock();
        if let Some(session) = active.take() {
            info!("Cleaning up session: {}", session.session_id);
            self.teardown(session, true);
        } else {
            // Still release any sink so late events can never deliver
            self.sinks.retire_and_clear();
        }
    }

    /// Must run under the `active` guard (lock order: `active`, then the
    /// sink registry). A teardown outside the guard could interleave with
    /// `initialize` and bump the epoch out from under the new session's
    /// dispatcher, permanently fencing it.
    fn teardown(&self, session: ActiveSession, clear_sink: bool) {
        // Abort cancels in-flight provider and tool work; dropping the
        // ActiveSession afterwards closes the input queue.
        session.session_task.abort();
        session.dispatcher_task.abort();
        // Bumping the epoch under the registry lock waits out an in-flight
        // delivery and fences any event this session already queued.
        if clear_sink {
            self.sinks.retire_and_clear();
        } else {
            self.sinks.retire();
        }
    }
}
