use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, info_span, warn, Instrument};

use super::completion::{CompletionGuard, Scope};
use super::dispatcher::{CancelSlot, NodeLimits};
use super::event::{Event, EventAction, EventContext, EventDone};
use crate::core::errors::{FlowError, Result};

struct EventEntry {
    event: Event,
    action: Arc<dyn EventAction>,
}

/// Leaf node: runs its events one after another
pub struct LeafFlow<T> {
    pub(crate) tag: T,
    pub(crate) cancel: CancelSlot,
    events: Vec<EventEntry>,
    limits: NodeLimits,
}

impl<T> LeafFlow<T> {
    pub(crate) fn new(tag: T, limits: NodeLimits) -> Self {
        Self {
            tag,
            cancel: CancelSlot::default(),
            events: Vec::new(),
            limits,
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|entry| &entry.event)
    }

    pub(crate) fn push_event(
        &mut self,
        node: String,
        event: Event,
        action: Arc<dyn EventAction>,
    ) -> Result<()> {
        if let Some(limit) = self.limits.max_events {
            if self.events.len() >= limit {
                return Err(FlowError::limit_exceeded(
                    node,
                    "events",
                    self.events.len(),
                    limit,
                ));
            }
        }
        self.events.push(EventEntry { event, action });
        Ok(())
    }
}

impl<T> LeafFlow<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    /// Start each action on its own task and wait for its completion or for
    /// the scope to be cancelled. A cancelled leaf returns at once and leaves
    /// the in-flight action running.
    pub(crate) async fn run_scoped(&self, scope: Scope, _done: CompletionGuard) {
        debug!(tag = ?self.tag, events = self.events.len(), "leaf flow started");

        for (index, entry) in self.events.iter().enumerate() {
            let (tx, rx) = oneshot::channel();
            let ctx = EventContext::new(entry.event.clone(), scope.clone(), EventDone::new(tx));
            let action = entry.action.clone();
            let span = info_span!("event", tag = ?self.tag, event = %entry.event, index);
            tokio::spawn(
                async move {
                    if let Err(e) = action.execute(ctx).await {
                        warn!(error = %e, "event action failed");
                    }
                }
                .instrument(span),
            );

            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    info!(tag = ?self.tag, event = %entry.event, index, "leaf flow cancelled");
                    return;
                }
                _ = rx => {
                    debug!(tag = ?self.tag, event = %entry.event, index, "event done");
                }
            }
        }

        info!(tag = ?self.tag, "leaf flow done");
    }
}
