//! HTTP routes for the tool gateway

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use skybit_application::ports::tool_executor::ToolExecutorPort;
use skybit_application::use_cases::dispatch_call::{DispatchInput, DispatchToolCallUseCase};
use skybit_domain::tool::ToolDefinition;
use std::time::Duration;
use tracing::debug;

use super::envelope::{ToolRequest, ToolResponse};

/// Header carrying the caller's own deadline in milliseconds
pub const CALL_TIMEOUT_HEADER: &str = "x-call-timeout-ms";

/// Shared state for every request
#[derive(Clone)]
pub struct GatewayState {
    dispatcher: DispatchToolCallUseCase,
}

impl GatewayState {
    pub fn new(dispatcher: DispatchToolCallUseCase) -> Self {
        Self { dispatcher }
    }
}

/// `POST /mcp`, `GET /tools`, `GET /health`
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/mcp", post(call_tool))
        .route("/tools", get(list_tools))
        .route("/health", get(health))
        .with_state(state)
}

async fn call_tool(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: ToolRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected malformed tool-call envelope");
            return (StatusCode::BAD_REQUEST, Json(ToolResponse::invalid_json())).into_response();
        }
    };

    let mut input = DispatchInput::new(request.into_call());
    if let Some(timeout) = caller_timeout(&headers) {
        input = input.with_caller_timeout(timeout);
    }

    let outcome = state.dispatcher.execute(input).await;
    Json(ToolResponse::from(outcome)).into_response()
}

async fn list_tools(State(state): State<GatewayState>) -> Json<ToolResponse> {
    let spec = state.dispatcher.executor().tool_spec();
    let names: Vec<&str> = spec.names().collect();
    let tools: Vec<&ToolDefinition> = spec.all().collect();
    Json(ToolResponse::success(json!({ "names": names, "tools": tools })))
}

async fn health() -> Json<ToolResponse> {
    Json(ToolResponse::success(json!({ "status": "ok" })))
}

/// Parse the caller deadline header; absent, malformed or zero means none.
fn caller_timeout(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CALL_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
