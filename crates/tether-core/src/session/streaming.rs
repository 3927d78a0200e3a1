//! Streaming session - the per-session turn loop
//!
//! Each session runs as a background task owning the conversation history.
//! Turns are serialized: a `send_message` while a turn is in flight queues
//! on the input channel and starts once the current turn's terminal event
//! has been emitted. Within a turn the session drives the provider, fans
//! tool requests out onto a `JoinSet`, and feeds results back until the
//! provider produces a final answer or the turn fails.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::types::Event;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::provider::{ChatMessage, Provider, ProviderEvent, ToolRequest};
use crate::tools::{ToolExecutor, ToolRegistry};

/// Result of one spawned tool execution
struct ToolOutcome {
    tool_id: String,
    result: String,
}

/// Execute one tool request and build its outcome
async fn execute_tool_task(
    tool: Option<Arc<dyn ToolExecutor>>,
    request: ToolRequest,
) -> ToolOutcome {
    let result = match tool {
        Some(tool) => match tool.execute(request.arguments).await {
            Ok(output) => output,
            Err(e) => format!("Error: {e}"),
        },
        None => format!("Error: unknown tool: {}", request.name),
    };
    ToolOutcome {
        tool_id: request.call_id,
        result,
    }
}

/// Per-turn event emitter enforcing the terminal-event contract
///
/// Once a `Message` or `Error` has been emitted for the turn, any further
/// emission is a logic defect: it is logged and dropped, never delivered.
pub(crate) struct TurnEvents {
    event_tx: mpsc::Sender<Event>,
    terminal: bool,
}

impl TurnEvents {
    pub(crate) fn new(event_tx: mpsc::Sender<Event>) -> Self {
        Self {
            event_tx,
            terminal: false,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) async fn emit(&mut self, event: Event) {
        if self.terminal {
            error!(?event, "Dropped event emitted after the turn's terminal event");
            return;
        }
        if event.is_terminal() {
            self.terminal = true;
        }
        if let Err(e) = self.event_tx.send(event).await {
            debug!("Event channel closed, emission dropped: {e}");
        }
    }
}

/// A single logical conversation and its in-flight request state
pub struct StreamingSession {
    session_id: String,
    message_rx: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::Sender<Event>,
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    /// Shared with the manager for atomic hot-swap; snapshotted per turn
    config: Arc<RwLock<SessionConfig>>,
    history: Vec<ChatMessage>,
    /// Tool ids started in this session lifetime, for pairing enforcement
    started_tool_ids: HashSet<String>,
}

impl StreamingSession {
    pub fn new(
        session_id: String,
        message_rx: mpsc::UnboundedReceiver<String>,
        event_tx: mpsc::Sender<Event>,
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
        config: Arc<RwLock<SessionConfig>>,
    ) -> Self {
        Self {
            session_id,
            message_rx,
            event_tx,
            provider,
            tools,
            config,
            history: Vec::new(),
            started_tool_ids: HashSet::new(),
        }
    }

    /// Run until the input channel closes
    pub async fn run(mut self) {
        info!("Session loop starting: {}", self.session_id);

        while let Some(text) = self.message_rx.recv().await {
            let mut turn = TurnEvents::new(self.event_tx.clone());
            if let Err(e) = self.handle_turn(&mut turn, text).await {
                // Transient failures surface as an Error event; the session
                // stays usable for the next message.
                turn.emit(Event::error(e.to_string())).await;
            }
            if !turn.is_terminal() {
                error!(
                    session_id = %self.session_id,
                    "Turn ended without a terminal event"
                );
                turn.emit(Event::error("turn produced no result")).await;
            }
        }

        info!("Session loop ended: {} (input channel closed)", self.session_id);
    }

    /// Run one turn: provider exchanges interleaved with tool round trips
    async fn handle_turn(&mut self, turn: &mut TurnEvents, text: String) -> Result<()> {
        if text.trim().is_empty() {
            turn.emit(Event::error("empty input")).await;
            return Ok(());
        }

        // Atomic snapshot; a concurrent set_config applies to the next turn
        let config = self.config.read().clone();
        let iteration_cap = config.turn_iteration_cap();

        self.history.push(ChatMessage::user(&text));

        let mut iteration = 0u32;
        loop {
            iteration += 1;
            if iteration > iteration_cap {
                warn!(
                    session_id = %self.session_id,
                    iteration_cap,
                    "Turn iteration limit reached"
                );
                turn.emit(Event::error("turn iteration limit reached")).await;
                return Ok(());
            }

            let mut stream = self
                .provider
                .stream_exchange(&config, &self.history)
                .await?;

            let mut streamed = String::new();
            let mut final_text: Option<String> = None;
            let mut requests: Vec<ToolRequest> = Vec::new();

            while let Some(event) = stream.next().await {
                match event? {
                    ProviderEvent::Chunk(chunk) => {
                        streamed.push_str(&chunk);
                        turn.emit(Event::stream_chunk(chunk)).await;
                    }
                    ProviderEvent::ToolCall(request) => requests.push(request),
                    ProviderEvent::Final(text) => final_text = Some(text),
                }
            }

            if requests.is_empty() {
                let answer = final_text.unwrap_or(streamed);
                self.history.push(ChatMessage::assistant(&answer));
                turn.emit(Event::message(answer)).await;
                return Ok(());
            }

            if !streamed.is_empty() {
                self.history.push(ChatMessage::assistant(&streamed));
            }
            self.run_tool_round(turn, requests).await;
        }
    }

    /// Execute one batch of tool requests concurrently
    ///
    /// Each request is strictly ToolStart then ToolComplete; completions
    /// arrive in finish order across the batch.
    async fn run_tool_round(&mut self, turn: &mut TurnEvents, requests: Vec<ToolRequest>) {
        let mut join_set: JoinSet<ToolOutcome> = JoinSet::new();
        let mut outstanding: HashSet<String> = HashSet::new();

        for request in requests {
            // A call id equal to a still-outstanding one is a provider
            // logic defect: log and drop the request, but answer it in the
            // history so the exchange loop can continue.
            if outstanding.contains(&request.call_id) {
                error!(
                    session_id = %self.session_id,
                    tool_id = %request.call_id,
                    "Duplicate tool call id from provider, dropping request"
                );
                self.history.push(ChatMessage::tool_result(
                    &request.call_id,
                    "Error: duplicate tool call id",
                ));
                continue;
            }
            outstanding.insert(request.call_id.clone());
            self.started_tool_ids.insert(request.call_id.clone());

            turn.emit(Event::tool_start(&request.name, &request.call_id))
                .await;
            let tool = self.tools.get(&request.name);
            if tool.is_none() {
                warn!(
                    session_id = %self.session_id,
                    tool_name = %request.name,
                    "Unknown tool requested"
                );
            }
            join_set.spawn(execute_tool_task(tool, request));
        }

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(outcome) => {
                    debug_assert!(self.started_tool_ids.contains(&outcome.tool_id));
                    outstanding.remove(&outcome.tool_id);
                    self.history.push(ChatMessage::tool_result(
                        &outcome.tool_id,
                        &outcome.result,
                    ));
                    turn.emit(Event::tool_complete(&outcome.tool_id, &outcome.result))
                        .await;
                }
                Err(e) => {
                    error!("Tool task failed: {e:?}");
                }
            }
        }
    }
}
