//! Hierarchical task dispatch: leaves run named events in order, serial
//! composites run children one at a time, parallel composites run them all
//! at once. Cancellation flows from any node to its whole subtree.

pub mod completion;
pub mod definition;
pub mod dispatcher;
pub mod event;
pub mod factory;
pub mod handle;
pub mod leaf;
pub mod parallel;
pub mod registry;
pub mod serial;

pub use completion::{completion_channel, CompletionReceiver, CompletionSender, Scope};
pub use definition::{EventDefinition, TreeDefinition};
pub use dispatcher::{Dispatcher, NodeKind};
pub use event::{action_fn, Event, EventAction, EventContext, EventDone, FnAction};
pub use factory::FlowFactory;
pub use handle::RunHandle;
pub use leaf::LeafFlow;
pub use parallel::ParallelFlow;
pub use registry::ActionRegistry;
pub use serial::SerialFlow;
