//! Configuration system for Keyway.
//!
//! Provides TOML-based configuration with:
//! - Credential directory connection settings (`[server]`)
//! - OAuth callback and per-provider authorization endpoints (`[oauth]`)
//! - Extra provider registry entries (`[[providers]]`)
//! - Config file layering (XDG user config + project-local overrides)
//! - Directory token resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    load_config, load_config_file, load_config_with_options, xdg_config_dir,
    xdg_config_path, ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use secrets::{resolve_server_token, ResolvedSecret, SecretSource};
pub use types::*;
