//! Presentation layer for skybit
//!
//! This crate contains the HTTP tool-call transport, CLI definitions, and
//! console output formatting.

pub mod cli;
pub mod output;
pub mod server;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use output::console::ConsoleFormatter;
pub use server::{GatewayServer, ServerHandle, ToolRequest, ToolResponse};
