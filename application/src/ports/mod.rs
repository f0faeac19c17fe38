//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_sink;
pub mod brokerage;
pub mod tool_executor;
pub mod tool_handler;
