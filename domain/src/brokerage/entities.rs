//! Brokerage entities
//!
//! Transient values that flow through a single call; the gateway never
//! persists them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which brokerage deployment to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerageEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl BrokerageEnvironment {
    pub fn as_str(&self) -> &str {
        match self {
            BrokerageEnvironment::Sandbox => "sandbox",
            BrokerageEnvironment::Production => "production",
        }
    }
}

impl std::fmt::Display for BrokerageEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrokerageEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sandbox" => Ok(BrokerageEnvironment::Sandbox),
            "production" | "prod" => Ok(BrokerageEnvironment::Production),
            other => Err(format!(
                "unknown brokerage environment '{}' (expected sandbox or production)",
                other
            )),
        }
    }
}

/// A linked brokerage account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A holding within an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub avg_price: f64,
}

/// Order placement request as sent to the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
    pub tif: String,
    /// Idempotency key; a retried placement with the same id must not
    /// double-submit at the broker.
    pub client_id: String,
}

impl OrderRequest {
    /// Notional value of the order, when it can be priced
    pub fn notional(&self) -> Option<f64> {
        self.limit_price.map(|price| price * self.quantity)
    }
}

/// Broker acknowledgement of a placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub broker_order_id: String,
    pub status: String,
}
