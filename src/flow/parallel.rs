use std::fmt;
use tracing::{debug, info, warn};

use super::completion::{completion_channel, CompletionGuard, Scope};
use super::dispatcher::{CancelSlot, Children, NodeLimits};

/// Parallel composite: starts every child at once and waits for all of them
pub struct ParallelFlow<T> {
    pub(crate) tag: T,
    pub(crate) cancel: CancelSlot,
    pub(crate) children: Children<T>,
}

impl<T> ParallelFlow<T>
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

    /// All children share one completion channel; each token counts one
    /// child down. On cancellation the parent returns without waiting for
    /// stragglers, which observe the same cancelled scope on their own.
    pub(crate) async fn run_scoped(&self, scope: Scope, _done: CompletionGuard) {
        let (tx, mut rx) = completion_channel();
        let mut remaining = self.children.len();
        debug!(tag = ?self.tag, children = remaining, "parallel flow started");

        for child in self.children.as_slice() {
            tokio::spawn(child.clone().run_owned(&scope, tx.clone()));
        }
        // only the children hold senders now
        drop(tx);

        while remaining > 0 {
            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    info!(tag = ?self.tag, remaining, "parallel flow cancelled");
                    return;
                }
                token = rx.recv() => match token {
                    Some(()) => {
                        remaining -= 1;
                        debug!(tag = ?self.tag, remaining, "parallel child done");
                    }
                    None => {
                        warn!(tag = ?self.tag, remaining, "completion channel closed before all children finished");
                        return;
                    }
                }
            }
        }

        info!(tag = ?self.tag, "parallel flow done");
    }
}
