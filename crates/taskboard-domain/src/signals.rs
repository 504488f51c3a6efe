use serde::Serialize;

use crate::side_effects::AdvisorySignal;
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalEvent {
    pub signal: AdvisorySignal,
    pub task_id: TaskId,
}

/// Host callback for advisory signals. Must not block; a sink that cannot
/// deliver simply drops the event.
pub trait SignalSink: Send + Sync {
    fn notify(&self, event: &SignalEvent);
}

impl<F> SignalSink for F
where
    F: Fn(&SignalEvent) + Send + Sync,
{
    fn notify(&self, event: &SignalEvent) {
        self(event)
    }
}

pub struct NoopSink;

impl SignalSink for NoopSink {
    fn notify(&self, _event: &SignalEvent) {}
}
