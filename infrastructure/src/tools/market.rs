//! data.snapshot tool: synthetic quotes for a list of symbols
//!
//! Read-only and non-authoritative, so malformed input degrades to an empty
//! quote map instead of failing.

use async_trait::async_trait;
use serde_json::{Value, json};
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::tool::{CallArgs, RiskLevel, ToolDefinition, ToolError, ToolParameter};
use skybit_domain::trading::Quote;
use std::collections::BTreeMap;

use super::rfc3339_now;

/// Tool name constant
pub const DATA_SNAPSHOT: &str = "data.snapshot";

/// Get the tool definition for data.snapshot
pub fn data_snapshot_definition() -> ToolDefinition {
    ToolDefinition::new(
        DATA_SNAPSHOT,
        "Return a quote snapshot (bid, ask, mid, timestamp) for each requested symbol.",
        RiskLevel::Low,
    )
    .with_parameter(
        ToolParameter::new("symbols", "Symbols to quote, e.g. [\"BTC-USD\"]", false)
            .with_type("array"),
    )
}

/// Arguments after coercion: only non-empty string symbols survive.
#[derive(Debug, Default, PartialEq)]
struct SnapshotArgs {
    symbols: Vec<String>,
}

impl SnapshotArgs {
    fn from_args(args: &CallArgs) -> Self {
        let symbols = args
            .get_array("symbols")
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { symbols }
    }
}

/// Handler for `data.snapshot`
#[derive(Debug, Clone, Default)]
pub struct DataSnapshotTool;

impl DataSnapshotTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolHandler for DataSnapshotTool {
    fn definition(&self) -> ToolDefinition {
        data_snapshot_definition()
    }

    async fn invoke(&self, _ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let args = SnapshotArgs::from_args(args);
        let now = rfc3339_now();

        let quotes: BTreeMap<String, Quote> = args
            .symbols
            .into_iter()
            .map(|symbol| (symbol, Quote::stub(now.clone())))
            .collect();

        Ok(json!({ "quotes": quotes }))
    }
}
