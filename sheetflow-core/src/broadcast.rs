//! Event broadcaster
//!
//! Fans pipeline lifecycle events out to every connected WebSocket
//! session. Sending with no subscribers attached is fine; the event is
//! simply dropped.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::event::PipelineEvent;

/// Broadcasts pipeline events for streaming
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Arc<broadcast::Sender<PipelineEvent>>,
}

impl EventBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers
    pub fn send(&self, event: PipelineEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
