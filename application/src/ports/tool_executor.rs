//! Tool Executor port
//!
//! Defines the interface for resolving a tool name and executing it.

use async_trait::async_trait;
use serde_json::Value;
use skybit_domain::tool::{CallArgs, ToolDefinition, ToolError, ToolSpec};

use super::tool_handler::CallContext;

/// Port for tool execution
///
/// This port defines how the application layer reaches tools.
/// The registry adapter lives in the infrastructure layer.
///
/// Implementations must be safe to call from many tasks at once and must
/// not enforce timeouts themselves; deadlines belong to the dispatcher.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Resolve `name` and run its handler, returning exactly what the
    /// handler returns. Unknown names fail with `NOT_FOUND` and run nothing.
    async fn call(
        &self,
        ctx: &CallContext,
        name: &str,
        args: &CallArgs,
    ) -> Result<Value, ToolError>;
}
