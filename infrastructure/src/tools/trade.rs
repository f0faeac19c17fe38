//! trade.* tools: order preview and the local stub broker
//!
//! `trade.preview` is pure arithmetic. The placement and cancel tools stand in
//! for a real brokerage: they keep no state and only guarantee a stable
//! response shape and unique order ids.

use async_trait::async_trait;
use serde_json::{Value, json};
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::tool::{CallArgs, RiskLevel, ToolDefinition, ToolError, ToolParameter};
use skybit_domain::trading::preview_orders;
use std::sync::atomic::{AtomicU64, Ordering};

use super::rfc3339_now;

/// Tool name constants
pub const TRADE_PREVIEW: &str = "trade.preview";
pub const TRADE_PLACE_ORDER: &str = "trade.place_order";
pub const TRADE_CANCEL: &str = "trade.cancel";
pub const TRADE_CANCEL_ALL: &str = "trade.cancel_all";

pub fn trade_preview_definition() -> ToolDefinition {
    ToolDefinition::new(
        TRADE_PREVIEW,
        "Estimate totals, commission and fees for a list of orders without placing them.",
        RiskLevel::Low,
    )
    .with_parameter(
        ToolParameter::new(
            "orders",
            "Orders as objects with qty and limit_price; other fields are echoed back",
            true,
        )
        .with_type("array"),
    )
}

pub fn trade_place_order_definition() -> ToolDefinition {
    ToolDefinition::new(
        TRADE_PLACE_ORDER,
        "Place an order with the local stub broker. Always accepted.",
        RiskLevel::High,
    )
    .with_parameter(ToolParameter::new("order", "Order to place", true).with_type("object"))
}

pub fn trade_cancel_definition() -> ToolDefinition {
    ToolDefinition::new(
        TRADE_CANCEL,
        "Cancel an order with the local stub broker.",
        RiskLevel::High,
    )
    .with_parameter(ToolParameter::new(
        "broker_order_id",
        "Order id returned at placement",
        false,
    ))
}

pub fn trade_cancel_all_definition() -> ToolDefinition {
    ToolDefinition::new(
        TRADE_CANCEL_ALL,
        "Cancel every open order with the local stub broker.",
        RiskLevel::High,
    )
}

/// Handler for `trade.preview`
#[derive(Debug, Clone, Default)]
pub struct TradePreviewTool;

impl TradePreviewTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolHandler for TradePreviewTool {
    fn definition(&self) -> ToolDefinition {
        trade_preview_definition()
    }

    async fn invoke(&self, _ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let orders = args.get_array("orders").map(Vec::as_slice).unwrap_or(&[]);
        let preview = preview_orders(orders);
        serde_json::to_value(preview)
            .map_err(|e| ToolError::internal(format!("failed to encode preview: {}", e)))
    }
}

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Next `SNAP-<unix-nanos>-<seq>` id.
///
/// `<seq>` is a process-wide counter, so two ids never collide even when the
/// clock reads the same value twice.
pub fn next_order_id() -> String {
    let seq = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("SNAP-{}-{}", nanos, seq)
}

/// Handler for `trade.place_order`
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPlaceOrderTool;

#[async_trait]
impl ToolHandler for StubPlaceOrderTool {
    fn definition(&self) -> ToolDefinition {
        trade_place_order_definition()
    }

    async fn invoke(&self, _ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let echo = args
            .get("order")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "broker_order_id": next_order_id(),
            "status": "ACCEPTED",
            "submitted_at": rfc3339_now(),
            "echo": echo,
        }))
    }
}

/// Handler for `trade.cancel`
#[derive(Debug, Clone, Default)]
pub struct StubCancelTool;

#[async_trait]
impl ToolHandler for StubCancelTool {
    fn definition(&self) -> ToolDefinition {
        trade_cancel_definition()
    }

    async fn invoke(&self, _ctx: &CallContext, _args: &CallArgs) -> Result<Value, ToolError> {
        Ok(json!({ "status": "CANCELED" }))
    }
}

/// Handler for `trade.cancel_all`
#[derive(Debug, Clone, Default)]
pub struct StubCancelAllTool;

#[async_trait]
impl ToolHandler for StubCancelAllTool {
    fn definition(&self) -> ToolDefinition {
        trade_cancel_all_definition()
    }

    async fn invoke(&self, _ctx: &CallContext, _args: &CallArgs) -> Result<Value, ToolError> {
        Ok(json!({ "status": "CANCELED_ALL" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ctx() -> CallContext {
        CallContext::background()
    }

    #[tokio::test]
    async fn test_preview_prices_orders() {
        let args = CallArgs::new().with_arg("orders", json!([{"qty": 10, "limit_price": 5.0}]));
        let value = TradePreviewTool::new().invoke(&ctx(), &args).await.unwrap();

        assert_eq!(value["orders"][0]["estimated_total"], 50.0);
        assert_eq!(value["impact"]["total_value"], 50.0);
        let total_cost = value["impact"]["total_cost"].as_f64().unwrap();
        assert!((total_cost - 51.47).abs() < 1e-9);
        assert_eq!(value["impact"]["fees"][1]["type"], "TAF");
    }

    #[tokio::test]
    async fn test_preview_without_orders_is_empty() {
        let value = TradePreviewTool::new()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap();
        assert_eq!(value["orders"], json!([]));
        assert_eq!(value["impact"]["total_value"], 0.0);
    }

    #[tokio::test]
    async fn test_stub_placement_accepts_and_echoes() {
        let order = json!({"symbol": "AAPL", "side": "BUY", "qty": 1});
        let args = CallArgs::new().with_arg("order", order.clone());
        let value = StubPlaceOrderTool.invoke(&ctx(), &args).await.unwrap();

        assert_eq!(value["status"], "ACCEPTED");
        assert_eq!(value["echo"], order);
        assert!(value["broker_order_id"].as_str().unwrap().starts_with("SNAP-"));
        assert!(value["submitted_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_stub_placement_ids_are_unique() {
        let tool = StubPlaceOrderTool;
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let value = tool.invoke(&ctx(), &CallArgs::new()).await.unwrap();
            assert!(seen.insert(value["broker_order_id"].as_str().unwrap().to_string()));
        }
    }

    #[tokio::test]
    async fn test_concurrent_stub_placements_never_collide() {
        let calls = (0..64).map(|_| async {
            StubPlaceOrderTool
                .invoke(&CallContext::background(), &CallArgs::new())
                .await
        });
        let results = futures::future::join_all(calls).await;

        let unique: HashSet<String> = results
            .into_iter()
            .map(|r| r.unwrap()["broker_order_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(unique.len(), 64);
    }

    #[tokio::test]
    async fn test_stub_cancels_are_idempotent() {
        for _ in 0..2 {
            let value = StubCancelTool
                .invoke(&ctx(), &CallArgs::new().with_arg("broker_order_id", "SNAP-1"))
                .await
                .unwrap();
            assert_eq!(value, json!({"status": "CANCELED"}));

            let value = StubCancelAllTool.invoke(&ctx(), &CallArgs::new()).await.unwrap();
            assert_eq!(value, json!({"status": "CANCELED_ALL"}));
        }
    }
}
