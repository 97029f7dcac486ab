//! Completion signalling between a node and whoever started it
//!
//! Every `run` writes exactly one token to the sender it was handed. The
//! channel is unbounded so a late child never blocks on a parent that has
//! already returned because of cancellation.

use tokio::sync::mpsc;

/// Scope type threaded through the tree. Cancelling a scope cancels every
/// scope derived from it with `child_token()`.
pub type Scope = tokio_util::sync::CancellationToken;

/// Sending half of a completion channel
pub type CompletionSender = mpsc::UnboundedSender<()>;

/// Receiving half of a completion channel
pub type CompletionReceiver = mpsc::UnboundedReceiver<()>;

/// Create a completion channel. Parallel composites clone the sender once
/// per child, everything else uses it for a single node.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}

/// Writes the completion token when dropped.
///
/// Built before a node's future is first polled and moved into it, so the
/// token goes out on normal return, on cancellation, while unwinding from a
/// panic, and when the runtime drops the future unpolled.
pub(crate) struct CompletionGuard {
    done: Option<CompletionSender>,
}

impl CompletionGuard {
    pub(crate) fn new(done: CompletionSender) -> Self {
        Self { done: Some(done) }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            // receiver gone means nobody is waiting any more
            let _ = done.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guard_sends_exactly_once() {
        let (tx, mut rx) = completion_channel();
        {
            let _guard = CompletionGuard::new(tx);
        }
        assert_eq!(rx.recv().await, Some(()));
        // sender dropped with the guard, so the channel is closed
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_guard_tolerates_closed_receiver() {
        let (tx, rx) = completion_channel();
        drop(rx);
        let guard = CompletionGuard::new(tx);
        drop(guard);
    }

    #[tokio::test]
    async fn test_guard_sends_on_panic() {
        let (tx, mut rx) = completion_channel();
        let guard = CompletionGuard::new(tx);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("action blew up");
        });
        assert!(handle.await.is_err());
        assert_eq!(rx.recv().await, Some(()));
    }
}
