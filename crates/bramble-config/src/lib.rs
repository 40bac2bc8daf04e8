//! Configuration system for the Bramble server.
//!
//! Provides TOML-based configuration with:
//! - `[server]`: listener, timeouts, uploads
//! - `[session]`: provider selection, cookie name, session lifetime
//! - `[logging]`: optional rolling file log and filter override
//!
//! Config file layering: user config directory, then `./bramble.toml`.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options, xdg_config_dir,
    xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
