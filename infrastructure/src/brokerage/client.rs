//! SnapTrade HTTP client
//!
//! One request/response round trip per operation: no retries, pagination or
//! streaming. Every request carries the client credentials as headers, is
//! bounded by the configured request timeout, and is abandoned as soon as the
//! call context is cancelled or its deadline passes.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use skybit_application::ports::brokerage::{BrokerageError, BrokeragePort};
use skybit_application::ports::tool_handler::CallContext;
use skybit_domain::brokerage::{Account, OrderRequest, PlaceOrderResponse, Position};
use tracing::debug;

use super::config::{SnapTradeConfig, SnapTradeConfigError};

const CLIENT_ID_HEADER: &str = "X-Snaptrade-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Snaptrade-Client-Secret";

/// Authenticated SnapTrade client
#[derive(Clone)]
pub struct SnapTradeClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for SnapTradeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapTradeClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl SnapTradeClient {
    pub fn new(config: &SnapTradeConfig) -> Result<Self, SnapTradeConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SnapTradeConfigError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SnapTradeConfigError::InvalidUrl {
                url: config.base_url.clone(),
                message: "not a base URL".into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SnapTradeConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        ctx: &CallContext,
        operation: &str,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response, BrokerageError> {
        let url = self.endpoint(segments);
        debug!(operation, %method, path = url.path(), "SnapTrade request");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(cancelled(operation)),
            _ = ctx.expired() => return Err(deadline_exceeded(operation)),
            result = request.send() => result.map_err(|e| transport_error(operation, e))?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(BrokerageError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        ctx: &CallContext,
        operation: &str,
        response: Response,
    ) -> Result<T, BrokerageError> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(cancelled(operation)),
            _ = ctx.expired() => Err(deadline_exceeded(operation)),
            result = response.json::<T>() => result.map_err(|e| {
                if e.is_timeout() {
                    deadline_exceeded(operation)
                } else {
                    BrokerageError::Decode {
                        operation: operation.to_string(),
                        message: e.without_url().to_string(),
                    }
                }
            }),
        }
    }
}

fn cancelled(operation: &str) -> BrokerageError {
    BrokerageError::Cancelled {
        operation: operation.to_string(),
    }
}

fn deadline_exceeded(operation: &str) -> BrokerageError {
    BrokerageError::DeadlineExceeded {
        operation: operation.to_string(),
    }
}

/// A reqwest timeout is the request budget running out, not an outage.
fn transport_error(operation: &str, err: reqwest::Error) -> BrokerageError {
    if err.is_timeout() {
        return deadline_exceeded(operation);
    }
    BrokerageError::Transport {
        operation: operation.to_string(),
        message: err.without_url().to_string(),
    }
}

#[async_trait]
impl BrokeragePort for SnapTradeClient {
    async fn list_accounts(&self, ctx: &CallContext) -> Result<Vec<Account>, BrokerageError> {
        const OP: &str = "list accounts";
        let response = self
            .send::<()>(ctx, OP, Method::GET, &["accounts"], None)
            .await?;
        Self::decode(ctx, OP, response).await
    }

    async fn list_positions(
        &self,
        ctx: &CallContext,
        account_id: &str,
    ) -> Result<Vec<Position>, BrokerageError> {
        const OP: &str = "list positions";
        let response = self
            .send::<()>(ctx, OP, Method::GET, &["accounts", account_id, "positions"], None)
            .await?;
        Self::decode(ctx, OP, response).await
    }

    async fn place_order(
        &self,
        ctx: &CallContext,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<PlaceOrderResponse, BrokerageError> {
        const OP: &str = "place order";
        let response = self
            .send(ctx, OP, Method::POST, &["accounts", account_id, "orders"], Some(order))
            .await?;
        Self::decode(ctx, OP, response).await
    }

    async fn cancel_order(
        &self,
        ctx: &CallContext,
        account_id: &str,
        broker_order_id: &str,
    ) -> Result<(), BrokerageError> {
        self.send::<()>(
            ctx,
            "cancel order",
            Method::POST,
            &["accounts", account_id, "orders", broker_order_id, "cancel"],
            None,
        )
        .await?;
        Ok(())
    }

    async fn cancel_all(&self, ctx: &CallContext, account_id: &str) -> Result<(), BrokerageError> {
        self.send::<()>(
            ctx,
            "cancel all orders",
            Method::POST,
            &["accounts", account_id, "orders", "cancel_all"],
            None,
        )
        .await?;
        Ok(())
    }
}
