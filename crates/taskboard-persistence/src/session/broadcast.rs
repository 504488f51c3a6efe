use taskboard_domain::{SignalEvent, SignalSink};
use tokio::sync::broadcast;

/// Fans advisory signals out to any number of async listeners. Sending
/// never blocks; slow receivers lag and lose old events.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<SignalEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SignalEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SignalSink for BroadcastSink {
    fn notify(&self, event: &SignalEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::debug!(task_id = %event.task_id, "No listeners for {} signal", event.signal);
        }
    }
}
