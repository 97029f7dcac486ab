// Infrastructure shared by the dispatch tree

pub mod config;
pub mod errors;
pub mod telemetry;

pub use config::{FlowConfig, FlowConfigBuilder};
pub use errors::{FlowError, Result};
pub use telemetry::init_tracing;
