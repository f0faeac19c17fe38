//! Dispatch Tool Call use case.
//!
//! Runs one inbound tool call to completion under a bounded deadline:
//!
//! 1. Derive a [`CallContext`] from the caller's context and the effective
//!    timeout (configured bound, shortened by the caller's own bound)
//! 2. Gate high-risk tools through the policy rules
//! 3. Resolve and execute through the [`ToolExecutorPort`]
//! 4. Convert a deadline expiry, cancellation, or handler panic into a
//!    typed failure
//!
//! The use case always produces a [`CallOutcome`]; nothing that happens
//! inside one call can take down the caller.

use crate::config::DispatchParams;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::tool_handler::CallContext;
use futures::FutureExt;
use skybit_domain::policy::PolicyRequest;
use skybit_domain::tool::{CallOutcome, ToolCall, ToolError};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Input for the [`DispatchToolCallUseCase`].
#[derive(Debug, Clone)]
pub struct DispatchInput {
    pub call: ToolCall,
    /// Caller-supplied bound; can only shorten the configured timeout
    pub caller_timeout: Option<Duration>,
}

impl DispatchInput {
    pub fn new(call: ToolCall) -> Self {
        Self {
            call,
            caller_timeout: None,
        }
    }

    pub fn with_caller_timeout(mut self, timeout: Duration) -> Self {
        self.caller_timeout = Some(timeout);
        self
    }
}

/// Use case for dispatching a single tool call.
#[derive(Clone)]
pub struct DispatchToolCallUseCase {
    executor: Arc<dyn ToolExecutorPort>,
    params: DispatchParams,
}

impl DispatchToolCallUseCase {
    pub fn new(executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            executor,
            params: DispatchParams::default(),
        }
    }

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    pub fn executor(&self) -> &Arc<dyn ToolExecutorPort> {
        &self.executor
    }

    /// Dispatch with no enclosing context.
    pub async fn execute(&self, input: DispatchInput) -> CallOutcome {
        self.execute_in(&CallContext::background(), input).await
    }

    /// Dispatch under `parent`; the call's deadline never exceeds the
    /// parent's, and cancelling the parent cancels the call.
    pub async fn execute_in(&self, parent: &CallContext, input: DispatchInput) -> CallOutcome {
        let timeout = self.params.effective_timeout(input.caller_timeout);
        let ctx = parent.child_with_timeout(timeout);
        let deadline = ctx.deadline().unwrap_or_else(|| Instant::now() + timeout);
        let name = input.call.tool_name.as_str();
        let args = &input.call.arguments;
        let started = Instant::now();

        info!(
            tool = name,
            timeout_ms = timeout.as_millis() as u64,
            "Dispatching tool call"
        );

        if let Err(denied) = self.check_policy(name, &input.call) {
            warn!(tool = name, error = %denied, "Tool call denied by policy");
            return CallOutcome::Failure(denied);
        }

        let call = AssertUnwindSafe(self.executor.call(&ctx, name, args)).catch_unwind();

        let outcome = tokio::select! {
            biased;
            finished = tokio::time::timeout_at(deadline, call) => match finished {
                Ok(Ok(result)) => CallOutcome::from(result),
                Ok(Err(panic)) => {
                    let message = panic_message(panic.as_ref());
                    error!(tool = name, panic = %message, "Tool handler panicked");
                    CallOutcome::Failure(ToolError::internal(format!(
                        "tool {} failed unexpectedly",
                        name
                    )))
                }
                Err(_elapsed) => {
                    warn!(
                        tool = name,
                        timeout_ms = timeout.as_millis() as u64,
                        "Tool call deadline exceeded"
                    );
                    CallOutcome::Failure(ToolError::timeout(name))
                }
            },
            _ = parent.cancelled() => {
                warn!(tool = name, "Tool call cancelled by caller");
                CallOutcome::Failure(ToolError::cancelled(name))
            }
        };

        // Anything the handler spawned under this context stops here.
        ctx.cancel();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            CallOutcome::Success(_) => info!(tool = name, elapsed_ms, "Tool call succeeded"),
            CallOutcome::Failure(err) => {
                info!(tool = name, elapsed_ms, code = err.code(), "Tool call failed")
            }
        }
        outcome
    }

    fn check_policy(&self, name: &str, call: &ToolCall) -> Result<(), ToolError> {
        let Some(definition) = self.executor.get_tool(name) else {
            return Ok(());
        };
        if !definition.is_high_risk() || self.params.policy.is_permissive() {
            return Ok(());
        }

        let decision = self
            .params
            .policy
            .evaluate(&PolicyRequest::from_args(name, &call.arguments));
        if decision.allowed {
            Ok(())
        } else {
            Err(ToolError::policy_denied(
                decision.reason.unwrap_or_else(|| "rejected".to_string()),
            ))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
