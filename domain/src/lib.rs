//! Domain layer for skybit
//!
//! This crate contains the core types and pure logic of the tool gateway.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool**: a named capability an agent can invoke with a dynamic
//!   argument map, producing exactly one [`CallOutcome`].
//! - **Brokerage**: accounts, positions and orders exchanged with an
//!   external broker.
//! - **Trading**: local, deterministic quote and preview logic.
//! - **Policy**: allow/deny rules consulted before side-effecting calls.
//! - **Audit**: append-only records of notable actions.

pub mod audit;
pub mod brokerage;
pub mod policy;
pub mod tool;
pub mod trading;

// Re-export commonly used types
pub use audit::AuditRecord;
pub use brokerage::{Account, BrokerageEnvironment, OrderRequest, PlaceOrderResponse, Position};
pub use policy::{PolicyDecision, PolicyRequest, PolicyRules};
pub use tool::{
    CallArgs, CallOutcome, ErrorKind, RiskLevel, ToolCall, ToolDefinition, ToolError,
    ToolParameter, ToolSpec,
};
pub use trading::{Quote, TradePreview, preview_orders};
