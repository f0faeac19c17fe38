//! Tool domain module
//!
//! Core abstractions for the gateway's **tool plane**: how an agent names a
//! capability, what arguments it sends, and how the outcome is reported.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ CallOutcome  │
//! │ (registry)   │    │ (name+args)  │    │ value | error│
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Risk-Based Gating
//!
//! Each tool has a [`RiskLevel`](entities::RiskLevel). High-risk tools place
//! or cancel orders at a broker and are checked against the policy rules
//! before they execute.
//!
//! | Risk | Examples | Policy gate |
//! |------|----------|-------------|
//! | **Low** | `data.snapshot`, `trade.preview`, `audit.log` | No |
//! | **High** | `broker.place_order`, `trade.cancel_all` | Yes |
//!
//! # Key Types
//!
//! - [`ToolSpec`]: Advertised tool catalogue
//! - [`ToolDefinition`]: Schema for a single tool (name, params, risk level)
//! - [`CallArgs`]: Dynamically-typed argument map supplied by the caller
//! - [`ToolCall`]: An invocation request
//! - [`ToolError`] / [`ErrorKind`]: Typed failure
//! - [`CallOutcome`]: Result value or failure, never both

pub mod entities;
pub mod value_objects;

pub use entities::{CallArgs, RiskLevel, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use value_objects::{CallOutcome, ErrorKind, ToolError};
