//! flowtree - a small hierarchical task-dispatch tree on tokio.
//!
//! Nodes are leaves running a sequence of named event actions, or
//! composites running their children serially or in parallel. Running the
//! root runs the tree; cancelling any node cancels its subtree. Cancellation
//! is cooperative: actions watch the scope they are given, nothing is ever
//! forcibly stopped.

pub mod core;
pub mod flow;

pub use crate::core::config::FlowConfig;
pub use crate::core::errors::{FlowError, Result};
pub use crate::core::telemetry::init_tracing;
pub use flow::*;
