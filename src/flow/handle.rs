use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::completion::{completion_channel, CompletionReceiver, Scope};
use super::dispatcher::Dispatcher;

/// A root node running on its own task
pub struct RunHandle<T> {
    run_id: Uuid,
    node: Arc<Dispatcher<T>>,
    done: CompletionReceiver,
    finished: bool,
}

impl<T> Dispatcher<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    /// Spawn `run` for this node under a scope derived from `parent`.
    ///
    /// The run is wrapped in a `run` span carrying a fresh run id so every
    /// log line from the tree can be correlated.
    pub fn start(self: Arc<Self>, parent: &Scope) -> RunHandle<T> {
        let run_id = Uuid::new_v4();
        let (tx, rx) = completion_channel();
        let span = info_span!("run", run_id = %run_id, tag = ?self.tag());
        tokio::spawn(self.clone().run_owned(parent, tx).instrument(span));
        RunHandle {
            run_id,
            node: self,
            done: rx,
            finished: false,
        }
    }
}

impl<T> RunHandle<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn node(&self) -> &Arc<Dispatcher<T>> {
        &self.node
    }

    /// Cancel the root and with it the whole tree
    pub fn cancel(&self) {
        self.node.cancel();
    }

    /// Wait for the root's completion token
    pub async fn wait(&mut self) {
        if !self.finished {
            let _ = self.done.recv().await;
            self.finished = true;
        }
    }

    /// Check for the completion token without waiting
    pub fn is_finished(&mut self) -> bool {
        if !self.finished {
            match self.done.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => self.finished = true,
                Err(TryRecvError::Empty) => {}
            }
        }
        self.finished
    }
}

impl<T> fmt::Debug for RunHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("run_id", &self.run_id)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
