//! Application layer for skybit
//!
//! This crate contains the dispatch use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_CALL_TIMEOUT, DispatchParams};
pub use ports::{
    audit_sink::{AuditError, AuditSink, NoAuditSink},
    brokerage::{BrokerageError, BrokeragePort, UnconfiguredBrokerage},
    tool_executor::ToolExecutorPort,
    tool_handler::{CallContext, ToolHandler},
};
pub use use_cases::dispatch_call::{DispatchInput, DispatchToolCallUseCase};
