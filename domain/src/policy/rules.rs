//! Policy rules evaluated before side-effecting calls
//!
//! An empty [`PolicyRules`] allows everything. Each configured limit adds a
//! check; every failing check is reported as a violation and the first one
//! becomes the decision's reason.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::CallArgs;
use crate::tool::entities::value_to_display_string;

/// Configured limits for order-affecting tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRules {
    /// Maximum `qty × limit_price` for a single order; orders whose notional
    /// can't be computed (market orders) are rejected while this is set
    pub max_order_notional: Option<f64>,
    /// Maximum quantity for a single order
    pub max_order_quantity: Option<f64>,
    /// Symbols that may not be traded (case-insensitive)
    pub blocked_symbols: Vec<String>,
    /// Reject orders without an idempotency `client_id`
    pub require_client_id: bool,
    /// Tools that are denied outright
    pub denied_tools: Vec<String>,
}

impl PolicyRules {
    /// Rules that allow every call
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_permissive(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate a call against the rules.
    pub fn evaluate(&self, request: &PolicyRequest) -> PolicyDecision {
        let mut violations = Vec::new();

        if self.denied_tools.iter().any(|t| t == &request.tool) {
            violations.push(format!("tool '{}' is disabled by policy", request.tool));
        }

        for order in &request.orders {
            if let Some(symbol) = &order.symbol
                && self
                    .blocked_symbols
                    .iter()
                    .any(|blocked| blocked.eq_ignore_ascii_case(symbol))
            {
                violations.push(format!("symbol {} is blocked", symbol));
            }

            if let (Some(max), Some(qty)) = (self.max_order_quantity, order.qty)
                && qty > max
            {
                violations.push(format!("quantity {} exceeds limit {}", qty, max));
            }

            if let Some(max) = self.max_order_notional {
                match order.notional() {
                    Some(notional) if notional > max => violations.push(format!(
                        "notional {:.2} exceeds limit {:.2}",
                        notional, max
                    )),
                    Some(_) => {}
                    None => violations.push(
                        "notional cannot be determined without qty and limit_price".to_string(),
                    ),
                }
            }

            if self.require_client_id && order.client_id.as_deref().is_none_or(str::is_empty) {
                violations.push("order is missing client_id".to_string());
            }
        }

        if violations.is_empty() {
            PolicyDecision::allow()
        } else {
            PolicyDecision::deny(violations)
        }
    }
}

/// The subset of an order the rules look at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderIntent {
    pub symbol: Option<String>,
    pub qty: Option<f64>,
    pub limit_price: Option<f64>,
    pub client_id: Option<String>,
}

impl OrderIntent {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).filter(|v| !v.is_null());
        Self {
            symbol: field("symbol").map(value_to_display_string),
            qty: field("qty").and_then(Value::as_f64),
            limit_price: field("limit_price").and_then(Value::as_f64),
            client_id: field("client_id").map(value_to_display_string),
        }
    }

    pub fn notional(&self) -> Option<f64> {
        Some(self.qty? * self.limit_price?)
    }
}

/// A call about to be evaluated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyRequest {
    /// Tool being checked (may be empty for ad-hoc checks)
    pub tool: String,
    pub orders: Vec<OrderIntent>,
}

impl PolicyRequest {
    /// Extract orders from `order` (single object) and `orders` (array).
    pub fn from_args(tool: impl Into<String>, args: &CallArgs) -> Self {
        let mut orders = Vec::new();
        if let Some(order) = args.get("order").filter(|v| v.is_object()) {
            orders.push(OrderIntent::from_value(order));
        }
        if let Some(list) = args.get_array("orders") {
            orders.extend(
                list.iter()
                    .filter(|v| v.is_object())
                    .map(OrderIntent::from_value),
            );
        }
        Self {
            tool: tool.into(),
            orders,
        }
    }
}

/// Allow/deny verdict with the reasons behind a deny
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub violations: Vec<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            violations: Vec::new(),
        }
    }

    pub fn deny(violations: Vec<String>) -> Self {
        Self {
            allowed: false,
            reason: violations.first().cloned(),
            violations,
        }
    }
}
