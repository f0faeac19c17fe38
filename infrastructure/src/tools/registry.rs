//! Tool Registry
//!
//! The [`ToolRegistry`] binds tool names to [`ToolHandler`]s and implements
//! [`ToolExecutorPort`]. It is assembled once by [`ToolRegistryBuilder`] at
//! process start and is read-only afterwards, so it can be shared across
//! every concurrent call without locking.
//!
//! # Usage
//!
//! ```ignore
//! use skybit_infrastructure::tools::{ToolRegistryBuilder, market::DataSnapshotTool};
//!
//! let registry = ToolRegistryBuilder::new()
//!     .register(DataSnapshotTool::new())
//!     .register(TradePreviewTool::new())
//!     .build()?;
//!
//! let value = registry.call(&ctx, "data.snapshot", &args).await?;
//! ```
//!
//! # Duplicate Names
//!
//! Registering two handlers under the same name is a construction-time
//! error: [`ToolRegistryBuilder::build`] returns
//! [`RegistryError::DuplicateTool`]. There is no last-write-wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use skybit_application::ports::tool_executor::ToolExecutorPort;
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::tool::{CallArgs, RiskLevel, ToolError, ToolSpec};
use thiserror::Error;

/// Errors raised while assembling a registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' registered more than once")]
    DuplicateTool(String),

    #[error("tool name cannot be empty")]
    EmptyName,
}

/// Collects handlers and validates them into a [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistryBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool handler
    pub fn register<H: ToolHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Validate names and freeze the registry.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> =
            HashMap::with_capacity(self.handlers.len());
        let mut tool_spec = ToolSpec::new();

        for handler in self.handlers {
            let definition = handler.definition();
            if definition.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if handlers.contains_key(&definition.name) {
                return Err(RegistryError::DuplicateTool(definition.name));
            }
            tracing::debug!(
                tool = %definition.name,
                risk = %definition.risk_level,
                "Registered tool"
            );
            handlers.insert(definition.name.clone(), handler);
            tool_spec = tool_spec.register(definition);
        }

        Ok(ToolRegistry {
            handlers,
            tool_spec,
        })
    }
}

/// Immutable name → handler table
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    tool_spec: ToolSpec,
}

impl ToolRegistry {
    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.tool_spec.names().collect()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        let mut tools_per_risk = BTreeMap::new();
        for definition in self.tool_spec.all() {
            *tools_per_risk.entry(definition.risk_level).or_insert(0) += 1;
        }

        RegistryStats {
            total_tools: self.handlers.len(),
            tools_per_risk,
        }
    }
}

/// Statistics about the registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub tools_per_risk: BTreeMap<RiskLevel, usize>,
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn call(
        &self,
        ctx: &CallContext,
        name: &str,
        args: &CallArgs,
    ) -> Result<Value, ToolError> {
        match self.handlers.get(name) {
            Some(handler) => handler.invoke(ctx, args).await,
            None => Err(ToolError::not_found(name)),
        }
    }
}
