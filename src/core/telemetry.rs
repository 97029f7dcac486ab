//! Log subscriber setup for binaries and tests embedding flowtree

use crate::core::config::FlowConfig;
use crate::core::errors::Result;

/// Install a `tracing_subscriber::fmt` subscriber configured from `config`.
///
/// Returns `Ok(false)` when a global subscriber is already installed, so
/// repeated calls (one per test, say) are harmless.
pub fn init_tracing(config: &FlowConfig) -> Result<bool> {
    let level = config.level()?;
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(config.log_source_location)
        .with_line_number(config.log_source_location)
        .with_target(false)
        .try_init()
        .is_ok();
    Ok(installed)
}
