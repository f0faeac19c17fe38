//! policy.check tool: evaluate the configured rules without acting

use async_trait::async_trait;
use serde_json::Value;
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::policy::{PolicyRequest, PolicyRules};
use skybit_domain::tool::{CallArgs, RiskLevel, ToolDefinition, ToolError, ToolParameter};
use std::sync::Arc;

/// Tool name constant
pub const POLICY_CHECK: &str = "policy.check";

/// Handler for `policy.check`
#[derive(Debug, Clone, Default)]
pub struct PolicyCheckTool {
    rules: Arc<PolicyRules>,
}

impl PolicyCheckTool {
    pub fn new(rules: PolicyRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }
}

#[async_trait]
impl ToolHandler for PolicyCheckTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            POLICY_CHECK,
            "Check orders against the configured trading policy. \
             Returns allowed, reason and violations.",
            RiskLevel::Low,
        )
        .with_parameter(
            ToolParameter::new("order", "Single order to check", false).with_type("object"),
        )
        .with_parameter(ToolParameter::new("orders", "Orders to check", false).with_type("array"))
        .with_parameter(ToolParameter::new(
            "tool",
            "Tool the orders are destined for",
            false,
        ))
    }

    async fn invoke(&self, _ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let tool = args.get_string("tool").unwrap_or_default();
        let decision = self.rules.evaluate(&PolicyRequest::from_args(tool, args));
        serde_json::to_value(decision)
            .map_err(|e| ToolError::internal(format!("failed to encode decision: {}", e)))
    }
}
