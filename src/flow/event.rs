//! Named leaf events and the actions bound to them
//!
//! Cancellation is cooperative only. An action is handed the leaf's scope
//! and is expected to watch it (`ctx.cancelled().await` in a `select!`, or
//! `ctx.is_cancelled()` between steps). Nothing in the tree preempts a
//! running action; a leaf that is cancelled stops waiting for it and moves
//! on, but the action task keeps running until it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tokio::sync::oneshot;

use super::completion::Scope;

/// A named unit of leaf work. Names are not validated or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    name: String,
}

impl Event {
    pub const ENTER: &'static str = "enter";
    pub const RUN: &'static str = "run";
    pub const QUIT: &'static str = "quit";

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn enter() -> Self {
        Self::named(Self::ENTER)
    }

    pub fn run() -> Self {
        Self::named(Self::RUN)
    }

    pub fn quit() -> Self {
        Self::named(Self::QUIT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Completion handle for one event start.
///
/// `complete()` lets the leaf advance while the action keeps doing
/// background work. Dropping the handle without completing also releases
/// the leaf: the action has returned and cannot signal any more.
#[derive(Debug)]
pub struct EventDone {
    tx: oneshot::Sender<()>,
}

impl EventDone {
    pub(crate) fn new(tx: oneshot::Sender<()>) -> Self {
        Self { tx }
    }

    /// Signal the leaf that this event is finished
    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

/// Everything an action gets for one execution
#[derive(Debug)]
pub struct EventContext {
    /// The event being executed
    pub event: Event,
    /// The leaf's derived scope; cancelled when the leaf or any ancestor is
    pub scope: Scope,
    /// Completion handle for this start
    pub done: EventDone,
}

impl EventContext {
    pub(crate) fn new(event: Event, scope: Scope, done: EventDone) -> Self {
        Self { event, scope, done }
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Resolves once the scope is cancelled
    pub async fn cancelled(&self) {
        self.scope.cancelled().await
    }

    /// Signal completion, consuming the context
    pub fn complete(self) {
        self.done.complete()
    }
}

/// Caller-supplied work bound to a leaf event.
///
/// Errors are logged by the leaf and otherwise treated as completion; the
/// tree does not propagate them. Actions that need to report failures must
/// do so through their own channel.
#[async_trait]
pub trait EventAction: Send + Sync + 'static {
    async fn execute(&self, ctx: EventContext) -> anyhow::Result<()>;
}

/// Wrapper turning an async closure into an [`EventAction`]
pub struct FnAction<F> {
    func: F,
}

#[async_trait]
impl<F, Fut> EventAction for FnAction<F>
where
    F: Fn(EventContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn execute(&self, ctx: EventContext) -> anyhow::Result<()> {
        (self.func)(ctx).await
    }
}

/// Build an action from an async closure
///
/// ```ignore
/// leaf.push_event(Event::run(), action_fn(|ctx| async move {
///     tokio::select! {
///         _ = ctx.cancelled() => {}
///         _ = tokio::time::sleep(Duration::from_secs(2)) => ctx.complete(),
///     }
///     Ok(())
/// }))?;
/// ```
pub fn action_fn<F, Fut>(func: F) -> FnAction<F>
where
    F: Fn(EventContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnAction { func }
}
