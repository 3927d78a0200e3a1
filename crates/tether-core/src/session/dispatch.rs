//! Sink registration and event dispatch
//!
//! All sink registration changes and all deliveries serialize through the
//! single mutex inside [`SinkRegistry`]. A dispatcher task drains a
//! session's event channel and delivers under that lock, so a sink swap
//! either happens before a delivery starts or strictly after it finishes —
//! never against a stale reference mid-call.
//!
//! The epoch counter fences off torn-down sessions: each dispatcher is
//! created against the epoch current at session start, and teardown bumps
//! the epoch under the lock. A dispatcher holding an already-dequeued event
//! from a dead session finds the epoch stale and drops it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::types::{Event, EventSink};

struct SinkSlot {
    sink: Option<Arc<dyn EventSink>>,
    epoch: u64,
}

/// Holder of the single replaceable sink reference
pub struct SinkRegistry {
    slot: Mutex<SinkSlot>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(SinkSlot {
                sink: None,
                epoch: 0,
            }),
        }
    }

    /// Replace or detach the sink; safe at any time, including mid-dispatch
    pub fn set(&self, sink: Option<Arc<dyn EventSink>>) {
        let mut slot = self.slot.lock();
        debug!(registered = sink.is_some(), "Sink registration changed");
        slot.sink = sink;
    }

    /// Whether a sink is currently registered
    pub fn is_registered(&self) -> bool {
        self.slot.lock().sink.is_some()
    }

    /// Epoch to hand to a newly spawned dispatcher
    pub fn current_epoch(&self) -> u64 {
        self.slot.lock().epoch
    }

    /// Invalidate all dispatchers spawned before this call
    pub fn retire(&self) {
        let mut slot = self.slot.lock();
        slot.epoch += 1;
    }

    /// Invalidate dispatchers and release the sink reference in one
    /// critical section; blocks until any in-flight delivery completes
    pub fn retire_and_clear(&self) {
        let mut slot = self.slot.lock();
        slot.epoch += 1;
        slot.sink = None;
    }

    /// Deliver an event on behalf of a dispatcher running at `epoch`
    ///
    /// Returns false when the event was dropped (stale epoch or no sink).
    fn deliver(&self, epoch: u64, event: &Event) -> bool {
        let slot = self.slot.lock();
        if slot.epoch != epoch {
            return false;
        }
        match &slot.sink {
            Some(sink) => {
                event.dispatch_to(sink.as_ref());
                true
            }
            None => false,
        }
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the dispatcher task for one session
///
/// Drains the session's event channel and delivers each event under the
/// registry lock. Ends when the channel closes (session task dropped its
/// sender) or when aborted during teardown.
pub(crate) fn spawn_dispatcher(
    registry: Arc<SinkRegistry>,
    epoch: u64,
    mut event_rx: mpsc::Receiver<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(epoch, "Dispatcher started");
        while let Some(event) = event_rx.recv().await {
            if !registry.deliver(epoch, &event) {
                debug!(epoch, ?event, "Dropped event (no sink or retired epoch)");
            }
        }
        debug!(epoch, "Dispatcher ended (event channel closed)");
    })
}
