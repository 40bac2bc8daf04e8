//! CLI command handlers.

pub mod start;
pub mod upload;

use bramble_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: LoadedConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}
