//! Brokerage port
//!
//! The contract brokerage-backed tool handlers depend on. The SnapTrade HTTP
//! client implements it in the infrastructure layer; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use skybit_domain::brokerage::{Account, OrderRequest, PlaceOrderResponse, Position};
use skybit_domain::tool::ToolError;
use thiserror::Error;

use super::tool_handler::CallContext;

/// Errors surfaced by a brokerage integration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerageError {
    #[error("{operation}: request failed: {message}")]
    Transport { operation: String, message: String },

    #[error("{operation}: brokerage returned HTTP {status}")]
    Status { operation: String, status: u16 },

    #[error("{operation}: malformed response: {message}")]
    Decode { operation: String, message: String },

    #[error("{operation}: cancelled")]
    Cancelled { operation: String },

    #[error("{operation}: deadline exceeded")]
    DeadlineExceeded { operation: String },

    #[error("brokerage not configured: {0}")]
    NotConfigured(String),
}

impl BrokerageError {
    pub fn operation(&self) -> Option<&str> {
        match self {
            BrokerageError::Transport { operation, .. }
            | BrokerageError::Status { operation, .. }
            | BrokerageError::Decode { operation, .. }
            | BrokerageError::Cancelled { operation }
            | BrokerageError::DeadlineExceeded { operation } => Some(operation),
            BrokerageError::NotConfigured(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerageError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<BrokerageError> for ToolError {
    fn from(err: BrokerageError) -> Self {
        match &err {
            BrokerageError::Cancelled { operation } => ToolError::cancelled(operation.clone()),
            BrokerageError::DeadlineExceeded { operation } => ToolError::timeout(operation.clone()),
            BrokerageError::NotConfigured(_) => ToolError::unavailable(err.to_string()),
            _ => ToolError::backend(err.to_string()),
        }
    }
}

/// Authenticated access to one brokerage.
///
/// Every method is a single request/response round trip that honors the
/// context's cancellation.
#[async_trait]
pub trait BrokeragePort: Send + Sync {
    async fn list_accounts(&self, ctx: &CallContext) -> Result<Vec<Account>, BrokerageError>;

    async fn list_positions(
        &self,
        ctx: &CallContext,
        account_id: &str,
    ) -> Result<Vec<Position>, BrokerageError>;

    async fn place_order(
        &self,
        ctx: &CallContext,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<PlaceOrderResponse, BrokerageError>;

    async fn cancel_order(
        &self,
        ctx: &CallContext,
        account_id: &str,
        broker_order_id: &str,
    ) -> Result<(), BrokerageError>;

    async fn cancel_all(&self, ctx: &CallContext, account_id: &str) -> Result<(), BrokerageError>;
}

/// Stand-in used when credentials are missing: every call fails with
/// `NotConfigured` so broker tools stay listed but report why they can't run.
#[derive(Debug, Clone)]
pub struct UnconfiguredBrokerage {
    reason: String,
}

impl UnconfiguredBrokerage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> BrokerageError {
        BrokerageError::NotConfigured(self.reason.clone())
    }
}

#[async_trait]
impl BrokeragePort for UnconfiguredBrokerage {
    async fn list_accounts(&self, _ctx: &CallContext) -> Result<Vec<Account>, BrokerageError> {
        Err(self.error())
    }

    async fn list_positions(
        &self,
        _ctx: &CallContext,
        _account_id: &str,
    ) -> Result<Vec<Position>, BrokerageError> {
        Err(self.error())
    }

    async fn place_order(
        &self,
        _ctx: &CallContext,
        _account_id: &str,
        _order: &OrderRequest,
    ) -> Result<PlaceOrderResponse, BrokerageError> {
        Err(self.error())
    }

    async fn cancel_order(
        &self,
        _ctx: &CallContext,
        _account_id: &str,
        _broker_order_id: &str,
    ) -> Result<(), BrokerageError> {
        Err(self.error())
    }

    async fn cancel_all(
        &self,
        _ctx: &CallContext,
        _account_id: &str,
    ) -> Result<(), BrokerageError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybit_domain::tool::ErrorKind;

    #[test]
    fn test_status_error_maps_to_backend() {
        let err = BrokerageError::Status {
            operation: "list accounts".into(),
            status: 503,
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.operation(), Some("list accounts"));

        let tool_err: ToolError = err.into();
        assert_eq!(tool_err.kind, ErrorKind::Backend);
        assert_eq!(
            tool_err.message,
            "list accounts: brokerage returned HTTP 503"
        );
    }

    #[test]
    fn test_cancel_and_config_errors_keep_their_kind() {
        let cancelled: ToolError = BrokerageError::Cancelled {
            operation: "place order".into(),
        }
        .into();
        assert_eq!(cancelled.kind, ErrorKind::Cancelled);

        let expired: ToolError = BrokerageError::DeadlineExceeded {
            operation: "list accounts".into(),
        }
        .into();
        assert_eq!(expired.kind, ErrorKind::Timeout);

        let unconfigured: ToolError = BrokerageError::NotConfigured("missing id".into()).into();
        assert_eq!(unconfigured.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_unconfigured_brokerage_fails_every_call() {
        let broker = UnconfiguredBrokerage::new("missing SNAPTRADE_CLIENT_ID/SECRET envs");
        let ctx = CallContext::background();

        let err = broker.list_accounts(&ctx).await.unwrap_err();
        assert!(matches!(err, BrokerageError::NotConfigured(_)));
        assert!(broker.cancel_all(&ctx, "acc").await.is_err());
    }
}
