//! broker.* tools: account, position and order operations against the
//! configured [`BrokeragePort`]
//!
//! Each handler resolves the target account, coerces its arguments into a
//! typed request, forwards one call to the brokerage, and converts any
//! brokerage failure into a `BACKEND_ERROR` (or `UNAVAILABLE` when
//! credentials are missing). A backend failure is never turned into a
//! fabricated success.
//!
//! # Account Resolution
//!
//! ```text
//! args.account_id (non-empty) ─▶ configured override ─▶ first listed account ─▶ NO_LINKED_ACCOUNT
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use skybit_application::ports::brokerage::BrokeragePort;
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::brokerage::OrderRequest;
use skybit_domain::tool::entities::value_to_display_string;
use skybit_domain::tool::{CallArgs, RiskLevel, ToolDefinition, ToolError, ToolParameter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool name constants
pub const BROKER_ACCOUNTS: &str = "broker.accounts";
pub const BROKER_POSITIONS: &str = "broker.positions";
pub const BROKER_PLACE_ORDER: &str = "broker.place_order";
pub const BROKER_CANCEL: &str = "broker.cancel";
pub const BROKER_CANCEL_ALL: &str = "broker.cancel_all";

const DEFAULT_TIF: &str = "Day";

fn account_id_parameter() -> ToolParameter {
    ToolParameter::new(
        "account_id",
        "Brokerage account id (defaults to the configured or first linked account)",
        false,
    )
}

/// Shared state for every broker tool: the brokerage and the account
/// override loaded at startup.
#[derive(Clone)]
pub struct BrokerTools {
    brokerage: Arc<dyn BrokeragePort>,
    default_account_id: Option<String>,
}

impl BrokerTools {
    pub fn new(brokerage: Arc<dyn BrokeragePort>) -> Self {
        Self {
            brokerage,
            default_account_id: None,
        }
    }

    /// Account used when a call names none (`SNAPTRADE_ACCOUNT_ID`)
    pub fn with_default_account(mut self, account_id: Option<String>) -> Self {
        self.default_account_id = account_id.filter(|id| !id.is_empty());
        self
    }

    pub fn accounts(&self) -> BrokerAccountsTool {
        BrokerAccountsTool(self.clone())
    }

    pub fn positions(&self) -> BrokerPositionsTool {
        BrokerPositionsTool(self.clone())
    }

    pub fn place_order(&self) -> BrokerPlaceOrderTool {
        BrokerPlaceOrderTool(self.clone())
    }

    pub fn cancel(&self) -> BrokerCancelTool {
        BrokerCancelTool(self.clone())
    }

    pub fn cancel_all(&self) -> BrokerCancelAllTool {
        BrokerCancelAllTool(self.clone())
    }

    /// Resolve the account a call targets.
    async fn resolve_account(
        &self,
        ctx: &CallContext,
        args: &CallArgs,
    ) -> Result<String, ToolError> {
        if let Some(id) = args.get_non_empty_string("account_id") {
            return Ok(id.to_string());
        }
        if let Some(id) = &self.default_account_id {
            return Ok(id.clone());
        }

        let accounts = self.brokerage.list_accounts(ctx).await.map_err(|e| {
            warn!(error = %e, "Account lookup failed");
            ToolError::from(e)
        })?;
        match accounts.into_iter().next() {
            Some(account) => {
                debug!(account_id = %account.id, "Defaulted to first linked account");
                Ok(account.id)
            }
            None => Err(ToolError::no_linked_account()),
        }
    }
}

fn backend_failure(tool: &str, err: skybit_application::BrokerageError) -> ToolError {
    warn!(tool, error = %err, "Brokerage call failed");
    ToolError::from(err)
}

/// Handler for `broker.accounts`
pub struct BrokerAccountsTool(BrokerTools);

#[async_trait]
impl ToolHandler for BrokerAccountsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROKER_ACCOUNTS,
            "List brokerage accounts linked to this user.",
            RiskLevel::Low,
        )
    }

    async fn invoke(&self, ctx: &CallContext, _args: &CallArgs) -> Result<Value, ToolError> {
        ctx.ensure_active(BROKER_ACCOUNTS)?;
        let accounts = self
            .0
            .brokerage
            .list_accounts(ctx)
            .await
            .map_err(|e| backend_failure(BROKER_ACCOUNTS, e))?;
        Ok(json!({ "accounts": accounts }))
    }
}

/// Handler for `broker.positions`
pub struct BrokerPositionsTool(BrokerTools);

#[async_trait]
impl ToolHandler for BrokerPositionsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROKER_POSITIONS,
            "List positions held in a brokerage account.",
            RiskLevel::Low,
        )
        .with_parameter(account_id_parameter())
    }

    async fn invoke(&self, ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        ctx.ensure_active(BROKER_POSITIONS)?;
        let account_id = self.0.resolve_account(ctx, args).await?;
        let positions = self
            .0
            .brokerage
            .list_positions(ctx, &account_id)
            .await
            .map_err(|e| backend_failure(BROKER_POSITIONS, e))?;
        Ok(json!({ "positions": positions }))
    }
}

/// Build an [`OrderRequest`] from the `order` argument.
///
/// Text fields accept any JSON scalar and are rendered to strings; `qty`
/// must be a positive number; `limit_price` is optional. The `client_id`
/// idempotency key is mandatory so a retried call cannot double-submit.
pub fn order_request_from_args(args: &CallArgs) -> Result<OrderRequest, ToolError> {
    let order = args
        .get_object("order")
        .ok_or_else(|| ToolError::invalid_argument("order must be an object"))?;

    let symbol = required_text(order, "symbol")?;
    let side = required_text(order, "side")?;
    let client_id = required_text(order, "client_id")?;
    let tif = optional_text(order, "tif").unwrap_or_else(|| DEFAULT_TIF.to_string());

    let quantity = order
        .get("qty")
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid_argument("order.qty must be a number"))?;
    if quantity <= 0.0 {
        return Err(ToolError::invalid_argument("order.qty must be positive"));
    }

    let limit_price = match order.get("limit_price") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_f64().ok_or_else(|| {
            ToolError::invalid_argument("order.limit_price must be a number")
        })?),
    };

    let order_type = optional_text(order, "type").unwrap_or_else(|| {
        if limit_price.is_some() {
            "Limit".to_string()
        } else {
            "Market".to_string()
        }
    });

    Ok(OrderRequest {
        symbol,
        side,
        quantity,
        order_type,
        limit_price,
        tif,
        client_id,
    })
}

fn optional_text(order: &Map<String, Value>, key: &str) -> Option<String> {
    order
        .get(key)
        .filter(|v| !v.is_null())
        .map(value_to_display_string)
        .filter(|s| !s.is_empty())
}

fn required_text(order: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    optional_text(order, key)
        .ok_or_else(|| ToolError::invalid_argument(format!("order.{} is required", key)))
}

/// Handler for `broker.place_order`
pub struct BrokerPlaceOrderTool(BrokerTools);

#[async_trait]
impl ToolHandler for BrokerPlaceOrderTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROKER_PLACE_ORDER,
            "Place an order at the brokerage. Requires order.client_id as an idempotency key.",
            RiskLevel::High,
        )
        .with_parameter(account_id_parameter())
        .with_parameter(
            ToolParameter::new(
                "order",
                "{symbol, side, qty, type, limit_price?, tif, client_id}",
                true,
            )
            .with_type("object"),
        )
    }

    async fn invoke(&self, ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        // Validate before touching the network
        let order = order_request_from_args(args)?;
        ctx.ensure_active(BROKER_PLACE_ORDER)?;
        let account_id = self.0.resolve_account(ctx, args).await?;

        let placed = self
            .0
            .brokerage
            .place_order(ctx, &account_id, &order)
            .await
            .map_err(|e| backend_failure(BROKER_PLACE_ORDER, e))?;
        Ok(json!({
            "broker_order_id": placed.broker_order_id,
            "status": placed.status,
        }))
    }
}

/// Handler for `broker.cancel`
pub struct BrokerCancelTool(BrokerTools);

#[async_trait]
impl ToolHandler for BrokerCancelTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROKER_CANCEL,
            "Cancel one order at the brokerage.",
            RiskLevel::High,
        )
        .with_parameter(account_id_parameter())
        .with_parameter(ToolParameter::new(
            "broker_order_id",
            "Order id returned by broker.place_order",
            true,
        ))
    }

    async fn invoke(&self, ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let broker_order_id = args
            .get_non_empty_string("broker_order_id")
            .ok_or_else(|| ToolError::invalid_argument("broker_order_id required"))?;
        ctx.ensure_active(BROKER_CANCEL)?;
        let account_id = self.0.resolve_account(ctx, args).await?;

        self.0
            .brokerage
            .cancel_order(ctx, &account_id, broker_order_id)
            .await
            .map_err(|e| backend_failure(BROKER_CANCEL, e))?;
        Ok(json!({ "status": "CANCELED" }))
    }
}

/// Handler for `broker.cancel_all`
pub struct BrokerCancelAllTool(BrokerTools);

#[async_trait]
impl ToolHandler for BrokerCancelAllTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROKER_CANCEL_ALL,
            "Cancel every open order in a brokerage account.",
            RiskLevel::High,
        )
        .with_parameter(account_id_parameter())
    }

    async fn invoke(&self, ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        ctx.ensure_active(BROKER_CANCEL_ALL)?;
        let account_id = self.0.resolve_account(ctx, args).await?;

        self.0
            .brokerage
            .cancel_all(ctx, &account_id)
            .await
            .map_err(|e| backend_failure(BROKER_CANCEL_ALL, e))?;
        Ok(json!({ "status": "CANCELED_ALL" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybit_application::ports::brokerage::{BrokerageError, UnconfiguredBrokerage};
    use skybit_domain::brokerage::{Account, PlaceOrderResponse, Position};
    use skybit_domain::tool::ErrorKind;
    use std::sync::Mutex;

    /// In-memory brokerage that records every call it receives.
    #[derive(Default)]
    struct FakeBrokerage {
        accounts: Vec<Account>,
        fail_with: Option<BrokerageError>,
        calls: Mutex<Vec<String>>,
        placed: Mutex<Vec<(String, OrderRequest)>>,
    }

    impl FakeBrokerage {
        fn with_accounts(ids: &[&str]) -> Self {
            Self {
                accounts: ids
                    .iter()
                    .map(|id| Account {
                        id: id.to_string(),
                        name: format!("Account {}", id),
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn failing(err: BrokerageError) -> Self {
            Self {
                fail_with: Some(err),
                ..Default::default()
            }
        }

        fn record(&self, call: String) -> Result<(), BrokerageError> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BrokeragePort for FakeBrokerage {
        async fn list_accounts(&self, _ctx: &CallContext) -> Result<Vec<Account>, BrokerageError> {
            self.record("list_accounts".into())?;
            Ok(self.accounts.clone())
        }

        async fn list_positions(
            &self,
            _ctx: &CallContext,
            account_id: &str,
        ) -> Result<Vec<Position>, BrokerageError> {
            self.record(format!("list_positions:{}", account_id))?;
            Ok(vec![Position {
                symbol: "AAPL".into(),
                quantity: 3.0,
                avg_price: 190.5,
            }])
        }

        async fn place_order(
            &self,
            _ctx: &CallContext,
            account_id: &str,
            order: &OrderRequest,
        ) -> Result<PlaceOrderResponse, BrokerageError> {
            self.record(format!("place_order:{}", account_id))?;
            self.placed
                .lock()
                .unwrap()
                .push((account_id.to_string(), order.clone()));
            Ok(PlaceOrderResponse {
                broker_order_id: "BRK-1".into(),
                status: "PENDING".into(),
            })
        }

        async fn cancel_order(
            &self,
            _ctx: &CallContext,
            account_id: &str,
            broker_order_id: &str,
        ) -> Result<(), BrokerageError> {
            self.record(format!("cancel_order:{}:{}", account_id, broker_order_id))
        }

        async fn cancel_all(
            &self,
            _ctx: &CallContext,
            account_id: &str,
        ) -> Result<(), BrokerageError> {
            self.record(format!("cancel_all:{}", account_id))
        }
    }

    fn tools(fake: &Arc<FakeBrokerage>) -> BrokerTools {
        BrokerTools::new(fake.clone())
    }

    fn ctx() -> CallContext {
        CallContext::background()
    }

    fn valid_order() -> Value {
        json!({
            "symbol": "AAPL",
            "side": "BUY",
            "qty": 2,
            "type": "Limit",
            "limit_price": 180.25,
            "tif": "GTC",
            "client_id": "cid-42"
        })
    }

    #[tokio::test]
    async fn test_accounts_forwards_list() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1", "acc-2"]));
        let value = tools(&fake)
            .accounts()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap();

        assert_eq!(value["accounts"].as_array().unwrap().len(), 2);
        assert_eq!(value["accounts"][0]["id"], "acc-1");
    }

    #[tokio::test]
    async fn test_positions_prefers_explicit_account() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let args = CallArgs::new().with_arg("account_id", "acc-9");
        let value = tools(&fake)
            .with_default_account(Some("acc-env".into()))
            .positions()
            .invoke(&ctx(), &args)
            .await
            .unwrap();

        assert_eq!(value["positions"][0]["symbol"], "AAPL");
        assert_eq!(fake.calls(), vec!["list_positions:acc-9"]);
    }

    #[tokio::test]
    async fn test_positions_uses_configured_override_before_listing() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        tools(&fake)
            .with_default_account(Some("acc-env".into()))
            .positions()
            .invoke(&ctx(), &CallArgs::new().with_arg("account_id", ""))
            .await
            .unwrap();

        assert_eq!(fake.calls(), vec!["list_positions:acc-env"]);
    }

    #[tokio::test]
    async fn test_positions_defaults_to_first_account() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1", "acc-2"]));
        tools(&fake)
            .positions()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap();

        assert_eq!(fake.calls(), vec!["list_accounts", "list_positions:acc-1"]);
    }

    #[tokio::test]
    async fn test_no_linked_account_for_positions_and_orders() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&[]));
        let broker = tools(&fake);

        let err = broker
            .positions()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoLinkedAccount);

        let args = CallArgs::new().with_arg("order", valid_order());
        let err = broker.place_order().invoke(&ctx(), &args).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoLinkedAccount);

        let args = CallArgs::new().with_arg("broker_order_id", "BRK-1");
        let err = broker.cancel().invoke(&ctx(), &args).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoLinkedAccount);

        let err = broker
            .cancel_all()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoLinkedAccount);

        assert!(fake.calls().iter().all(|c| c == "list_accounts"));
    }

    #[tokio::test]
    async fn test_place_order_forwards_typed_request() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let args = CallArgs::new().with_arg("order", valid_order());
        let value = tools(&fake)
            .place_order()
            .invoke(&ctx(), &args)
            .await
            .unwrap();

        assert_eq!(value, json!({"broker_order_id": "BRK-1", "status": "PENDING"}));

        let placed = fake.placed.lock().unwrap();
        let (account, order) = &placed[0];
        assert_eq!(account, "acc-1");
        assert_eq!(order.symbol, "AAPL");
        assert_eq!(order.quantity, 2.0);
        assert_eq!(order.limit_price, Some(180.25));
        assert_eq!(order.tif, "GTC");
        assert_eq!(order.client_id, "cid-42");
    }

    #[test]
    fn test_order_coercion_rules() {
        let args = CallArgs::new().with_arg(
            "order",
            json!({"symbol": 7203, "side": "SELL", "qty": 1.5, "client_id": 99}),
        );
        let order = order_request_from_args(&args).unwrap();
        assert_eq!(order.symbol, "7203");
        assert_eq!(order.client_id, "99");
        assert_eq!(order.order_type, "Market");
        assert_eq!(order.tif, "Day");
        assert_eq!(order.limit_price, None);

        let args = CallArgs::new().with_arg(
            "order",
            json!({"symbol": "AAPL", "side": "BUY", "qty": 1, "limit_price": 10, "client_id": "c"}),
        );
        assert_eq!(order_request_from_args(&args).unwrap().order_type, "Limit");
    }

    #[test]
    fn test_order_validation_failures() {
        let cases = [
            json!("not an object"),
            json!({"side": "BUY", "qty": 1, "client_id": "c"}),
            json!({"symbol": "AAPL", "side": "BUY", "qty": "one", "client_id": "c"}),
            json!({"symbol": "AAPL", "side": "BUY", "qty": 0, "client_id": "c"}),
            json!({"symbol": "AAPL", "side": "BUY", "qty": 1}),
            json!({
                "symbol": "AAPL",
                "side": "BUY",
                "qty": 1,
                "client_id": "c",
                "limit_price": "x"
            }),
        ];
        for order in cases {
            let args = CallArgs::new().with_arg("order", order.clone());
            let err = order_request_from_args(&args).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "{order}");
        }
        assert!(order_request_from_args(&CallArgs::new()).is_err());
    }

    #[tokio::test]
    async fn test_invalid_order_never_reaches_brokerage() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let args = CallArgs::new().with_arg("order", json!({"symbol": "AAPL"}));
        let err = tools(&fake)
            .place_order()
            .invoke(&ctx(), &args)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_requires_order_id() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let broker = tools(&fake);

        let err = broker
            .cancel()
            .invoke(&ctx(), &CallArgs::new().with_arg("broker_order_id", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(fake.calls().is_empty());

        let value = broker
            .cancel()
            .invoke(
                &ctx(),
                &CallArgs::new()
                    .with_arg("account_id", "acc-7")
                    .with_arg("broker_order_id", "BRK-1"),
            )
            .await
            .unwrap();
        assert_eq!(value["status"], "CANCELED");
        assert_eq!(fake.calls(), vec!["cancel_order:acc-7:BRK-1"]);
    }

    #[tokio::test]
    async fn test_cancel_all_forwards() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let value = tools(&fake)
            .cancel_all()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap();
        assert_eq!(value["status"], "CANCELED_ALL");
        assert_eq!(fake.calls(), vec!["list_accounts", "cancel_all:acc-1"]);
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_backend_error() {
        let fake = Arc::new(FakeBrokerage::failing(BrokerageError::Status {
            operation: "list accounts".into(),
            status: 500,
        }));
        let broker = tools(&fake);

        let err = broker
            .accounts()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Backend);
        assert!(err.message.contains("500"));

        // Failure while resolving the default account is not a NoLinkedAccount
        let err = broker
            .positions()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Backend);
    }

    #[tokio::test]
    async fn test_unconfigured_brokerage_is_unavailable() {
        let broker = BrokerTools::new(Arc::new(UnconfiguredBrokerage::new("missing credentials")));
        let err = broker
            .accounts()
            .invoke(&ctx(), &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_backend() {
        let fake = Arc::new(FakeBrokerage::with_accounts(&["acc-1"]));
        let ctx = CallContext::background();
        ctx.cancel();

        let err = tools(&fake)
            .accounts()
            .invoke(&ctx, &CallArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert!(fake.calls().is_empty());
    }
}
