//! Trade preview arithmetic
//!
//! Pure and deterministic: each order's `estimated_total` is
//! `qty × limit_price`, and a single commission plus the fixed fee schedule
//! is charged once per preview.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat commission charged per preview
pub const COMMISSION: f64 = 1.00;

/// Fixed regulatory fee schedule
pub const FEE_SCHEDULE: [(&str, f64); 2] = [("SEC", 0.46), ("TAF", 0.01)];

/// One itemized fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(rename = "type")]
    pub fee_type: String,
    pub amount: f64,
}

/// Aggregate cost impact of a set of orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewImpact {
    pub total_value: f64,
    pub commission: f64,
    pub fees: Vec<Fee>,
    pub total_cost: f64,
    pub slippage_bps: f64,
    pub pnl_impact: f64,
}

/// Priced orders plus their aggregate impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePreview {
    /// Input orders, every field preserved, with `estimated_total` added
    pub orders: Vec<Map<String, Value>>,
    pub impact: PreviewImpact,
}

/// Price a batch of order specifications.
///
/// Orders that are not JSON objects are priced as empty orders. Missing or
/// non-numeric `qty` / `limit_price` count as zero.
pub fn preview_orders(orders: &[Value]) -> TradePreview {
    let mut total_value = 0.0;
    let mut priced = Vec::with_capacity(orders.len());

    for order in orders {
        let mut fields = order.as_object().cloned().unwrap_or_default();
        let qty = fields.get("qty").and_then(Value::as_f64).unwrap_or(0.0);
        let limit = fields
            .get("limit_price")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let estimated_total = qty * limit;
        total_value += estimated_total;
        fields.insert("estimated_total".to_string(), Value::from(estimated_total));
        priced.push(fields);
    }

    let fees: Vec<Fee> = FEE_SCHEDULE
        .iter()
        .map(|(fee_type, amount)| Fee {
            fee_type: (*fee_type).to_string(),
            amount: *amount,
        })
        .collect();
    let fee_total: f64 = fees.iter().map(|f| f.amount).sum();

    TradePreview {
        orders: priced,
        impact: PreviewImpact {
            total_value,
            commission: COMMISSION,
            total_cost: total_value + COMMISSION + fee_total,
            fees,
            slippage_bps: 0.0,
            pnl_impact: 0.0,
        },
    }
}
