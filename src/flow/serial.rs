use std::fmt;
use tracing::{debug, info, warn};

use super::completion::{completion_channel, CompletionGuard, Scope};
use super::dispatcher::{CancelSlot, Children, NodeLimits};

/// Serial composite: runs its children one at a time, in order
pub struct SerialFlow<T> {
    pub(crate) tag: T,
    pub(crate) cancel: CancelSlot,
    pub(crate) children: Children<T>,
}

impl<T> SerialFlow<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn new(tag: T, limits: NodeLimits) -> Self {
        Self {
            tag,
            cancel: CancelSlot::default(),
            children: Children::new(limits),
        }
    }

    /// Cancellation is checked between children only. A child that is
    /// already running is waited for; it sees the cancelled scope itself.
    pub(crate) async fn run_scoped(&self, scope: Scope, _done: CompletionGuard) {
        debug!(tag = ?self.tag, children = self.children.len(), "serial flow started");

        for (index, child) in self.children.as_slice().iter().enumerate() {
            if scope.is_cancelled() {
                info!(tag = ?self.tag, index, "serial flow cancelled");
                return;
            }

            let (tx, mut rx) = completion_channel();
            tokio::spawn(child.clone().run_owned(&scope, tx));
            if rx.recv().await.is_none() {
                warn!(tag = ?self.tag, index, "child closed its completion channel without a token");
            }
            debug!(tag = ?self.tag, index, "serial child done");
        }

        info!(tag = ?self.tag, "serial flow done");
    }
}
