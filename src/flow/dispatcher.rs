//! The dispatch contract shared by every node in a tree
//!
//! A tree is built bottom-up (leaves first, then composites wrapping them)
//! and executed top-down by running the root. Building needs `&mut`, running
//! and cancelling only `&`, so a tree that is running behind an `Arc` can no
//! longer be modified.

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::completion::{completion_channel, CompletionGuard, CompletionSender, Scope};
use super::event::{Event, EventAction};
use super::factory::FlowFactory;
use super::leaf::LeafFlow;
use super::parallel::ParallelFlow;
use super::serial::SerialFlow;
use crate::core::errors::{FlowError, Result};

/// Which variant a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Serial,
    Parallel,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => f.write_str("leaf"),
            NodeKind::Serial => f.write_str("serial"),
            NodeKind::Parallel => f.write_str("parallel"),
        }
    }
}

/// Assembly limits stamped into each node by its factory; `None` is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeLimits {
    pub max_events: Option<usize>,
    pub max_children: Option<usize>,
    pub max_depth: Option<usize>,
}

/// Holds the cancel handle of the scope derived by the latest `run`
#[derive(Debug, Default)]
pub(crate) struct CancelSlot {
    scope: Mutex<Option<Scope>>,
}

impl CancelSlot {
    /// Derive a fresh child scope of `parent` and remember it
    pub(crate) fn derive(&self, parent: &Scope) -> Scope {
        let scope = parent.child_token();
        *self.scope.lock() = Some(scope.clone());
        scope
    }

    pub(crate) fn cancel(&self) {
        if let Some(scope) = self.scope.lock().as_ref() {
            scope.cancel();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.scope.lock().is_some()
    }
}

/// A node of the dispatch tree.
///
/// `T` is the caller's tag. The tree never looks at it except to print it
/// in logs and error messages.
pub enum Dispatcher<T> {
    Leaf(LeafFlow<T>),
    Serial(SerialFlow<T>),
    Parallel(ParallelFlow<T>),
}

impl<T> Dispatcher<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    /// Leaf with no event limit
    pub fn leaf(tag: T) -> Self {
        FlowFactory::default().leaf(tag)
    }

    /// Serial composite with no width or depth limit
    pub fn serial(tag: T) -> Self {
        FlowFactory::default().serial(tag)
    }

    /// Parallel composite with no width or depth limit
    pub fn parallel(tag: T) -> Self {
        FlowFactory::default().parallel(tag)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Dispatcher::Leaf(_) => NodeKind::Leaf,
            Dispatcher::Serial(_) => NodeKind::Serial,
            Dispatcher::Parallel(_) => NodeKind::Parallel,
        }
    }

    /// The tag supplied at construction
    pub fn tag(&self) -> &T {
        match self {
            Dispatcher::Leaf(leaf) => &leaf.tag,
            Dispatcher::Serial(serial) => &serial.tag,
            Dispatcher::Parallel(parallel) => &parallel.tag,
        }
    }

    fn cancel_slot(&self) -> &CancelSlot {
        match self {
            Dispatcher::Leaf(leaf) => &leaf.cancel,
            Dispatcher::Serial(serial) => &serial.cancel,
            Dispatcher::Parallel(parallel) => &parallel.cancel,
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!("{} {:?}", self.kind(), self.tag())
    }

    /// Attach an action to a leaf event
    pub fn push_event<A: EventAction>(&mut self, event: Event, action: A) -> Result<()> {
        self.push_shared_event(event, Arc::new(action))
    }

    /// Attach an already shared action, e.g. one taken from a registry
    pub fn push_shared_event(&mut self, event: Event, action: Arc<dyn EventAction>) -> Result<()> {
        let node = self.describe();
        match self {
            Dispatcher::Leaf(leaf) => leaf.push_event(node, event, action),
            Dispatcher::Serial(_) => Err(FlowError::usage(
                node,
                "push_event",
                "serial flow can not push event",
            )),
            Dispatcher::Parallel(_) => Err(FlowError::usage(
                node,
                "push_event",
                "parallel flow can not push event",
            )),
        }
    }

    /// Take ownership of `child` and append it to a composite
    pub fn append_child(&mut self, child: Dispatcher<T>) -> Result<()> {
        let node = self.describe();
        match self {
            Dispatcher::Leaf(_) => Err(FlowError::usage(
                node,
                "append_child",
                "leaf flow can not append child",
            )),
            Dispatcher::Serial(serial) => serial.children.append(node, child),
            Dispatcher::Parallel(parallel) => parallel.children.append(node, child),
        }
    }

    /// Names of a leaf's events in execution order, empty for composites
    pub fn event_names(&self) -> Vec<&str> {
        match self {
            Dispatcher::Leaf(leaf) => leaf.events().map(Event::name).collect(),
            _ => Vec::new(),
        }
    }

    pub fn children(&self) -> &[Arc<Dispatcher<T>>] {
        match self {
            Dispatcher::Leaf(_) => &[],
            Dispatcher::Serial(serial) => serial.children.as_slice(),
            Dispatcher::Parallel(parallel) => parallel.children.as_slice(),
        }
    }

    /// Height of this subtree; a lone node is 1
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// True once `run` has been called at least once
    pub fn has_run(&self) -> bool {
        self.cancel_slot().is_armed()
    }

    /// Run this node under a scope derived from `parent`.
    ///
    /// Exactly one token is written to `done` when the node finishes or is
    /// cancelled, whichever way the returned future ends. The derived scope
    /// is installed before this returns, so `cancel()` reaches it even if the
    /// future has not been polled yet.
    pub fn run<'a>(&'a self, parent: &Scope, done: CompletionSender) -> BoxFuture<'a, ()> {
        let guard = CompletionGuard::new(done);
        let scope = self.cancel_slot().derive(parent);
        self.run_scoped(scope, guard)
    }

    /// Owned variant of [`run`](Self::run) for spawning
    pub fn run_owned(self: Arc<Self>, parent: &Scope, done: CompletionSender) -> BoxFuture<'static, ()> {
        let guard = CompletionGuard::new(done);
        let scope = self.cancel_slot().derive(parent);
        async move { self.run_scoped(scope, guard).await }.boxed()
    }

    fn run_scoped<'a>(&'a self, scope: Scope, guard: CompletionGuard) -> BoxFuture<'a, ()> {
        match self {
            Dispatcher::Leaf(leaf) => leaf.run_scoped(scope, guard).boxed(),
            Dispatcher::Serial(serial) => serial.run_scoped(scope, guard).boxed(),
            Dispatcher::Parallel(parallel) => parallel.run_scoped(scope, guard).boxed(),
        }
    }

    /// Run to completion on the current task
    pub async fn execute(&self, parent: &Scope) {
        let (tx, mut rx) = completion_channel();
        self.run(parent, tx).await;
        let _ = rx.recv().await;
    }

    /// Request cooperative cancellation of the active scope and, through
    /// it, every descendant. A no-op before the first `run`; idempotent.
    pub fn cancel(&self) {
        self.cancel_slot().cancel();
    }
}

impl<T: fmt::Debug> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatcher::Leaf(leaf) => f
                .debug_struct("Leaf")
                .field("tag", &leaf.tag)
                .field("events", &leaf.events().collect::<Vec<_>>())
                .finish(),
            Dispatcher::Serial(serial) => f
                .debug_struct("Serial")
                .field("tag", &serial.tag)
                .field("children", &serial.children.nodes)
                .finish(),
            Dispatcher::Parallel(parallel) => f
                .debug_struct("Parallel")
                .field("tag", &parallel.tag)
                .field("children", &parallel.children.nodes)
                .finish(),
        }
    }
}

/// Child list shared by both composites; append-only while building
pub(crate) struct Children<T> {
    nodes: Vec<Arc<Dispatcher<T>>>,
    limits: NodeLimits,
}

impl<T> Children<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn new(limits: NodeLimits) -> Self {
        Self {
            nodes: Vec::new(),
            limits,
        }
    }

    fn append(&mut self, node: String, child: Dispatcher<T>) -> Result<()> {
        if let Some(limit) = self.limits.max_children {
            if self.nodes.len() >= limit {
                return Err(FlowError::limit_exceeded(
                    node,
                    "children",
                    self.nodes.len(),
                    limit,
                ));
            }
        }
        if let Some(limit) = self.limits.max_depth {
            let depth = child.depth() + 1;
            if depth > limit {
                return Err(FlowError::limit_exceeded(node, "depth", depth, limit));
            }
        }
        self.nodes.push(Arc::new(child));
        Ok(())
    }

    pub(crate) fn as_slice(&self) -> &[Arc<Dispatcher<T>>] {
        &self.nodes
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
