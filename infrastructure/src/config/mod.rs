//! Configuration file loading for skybit
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SKYBIT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./skybit.toml`
//! 4. Global: `~/.config/skybit/config.toml`
//! 5. Default values
//!
//! Brokerage credentials are not part of this file; see
//! [`crate::brokerage::config`].

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileBrokerageConfig, FileConfig, FileServerConfig,
};
pub use loader::ConfigLoader;
