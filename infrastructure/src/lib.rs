//! Infrastructure layer for skybit
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the tool registry and its handlers, the SnapTrade HTTP
//! client, the JSONL audit log, and configuration file loading.

pub mod brokerage;
pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use brokerage::{
    SnapTradeClient, SnapTradeConfig, SnapTradeConfigError, SnapTradeEnv, connect_brokerage,
};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::JsonlAuditLog;
pub use tools::{
    GatewayDependencies, RegistryError, RegistryStats, ToolRegistry, ToolRegistryBuilder,
    default_registry,
};
