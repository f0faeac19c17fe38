//! Tool handler port
//!
//! A [`ToolHandler`] is the atomic unit of gateway work: it receives the
//! call's [`CallContext`] and the caller's [`CallArgs`], and returns either a
//! result value or a [`ToolError`]. Handlers validate and coerce the keys
//! they need on entry; nothing upstream enforces a schema.

use async_trait::async_trait;
use serde_json::Value;
use skybit_domain::tool::{CallArgs, ToolDefinition, ToolError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call execution context: an optional deadline plus a cancellation
/// token shared with everything the call spawns.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Context with no deadline (tests, one-shot CLI calls)
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancellation: CancellationToken::new(),
        }
    }

    /// Derive a child context whose deadline never exceeds this one.
    ///
    /// Cancelling the parent cancels the child; cancelling the child leaves
    /// the parent untouched.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) => Some(parent.min(candidate)),
            None => Some(candidate),
        };
        Self {
            deadline,
            cancellation: self.cancellation.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline (`None` when unbounded)
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the call is cancelled
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Resolves once the deadline passes; pends forever when unbounded
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Fail fast before starting expensive work.
    pub fn ensure_active(&self, operation: &str) -> Result<(), ToolError> {
        if self.is_cancelled() {
            return Err(ToolError::cancelled(operation));
        }
        if self.is_expired() {
            return Err(ToolError::timeout(operation));
        }
        Ok(())
    }
}

/// A named, callable unit of gateway functionality.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Definition advertised to callers; its `name` is the registry key.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool.
    async fn invoke(&self, ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybit_domain::tool::ErrorKind;

    #[test]
    fn test_background_context_never_expires() {
        let ctx = CallContext::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(ctx.ensure_active("noop").is_ok());
    }

    #[tokio::test]
    async fn test_child_deadline_is_capped_by_parent() {
        let parent = CallContext::with_timeout(Duration::from_millis(50));
        let child = parent.child_with_timeout(Duration::from_secs(10));
        assert!(child.deadline().unwrap() <= parent.deadline().unwrap());

        let tighter = parent.child_with_timeout(Duration::from_millis(5));
        assert!(tighter.deadline().unwrap() < parent.deadline().unwrap());
    }

    #[tokio::test]
    async fn test_cancellation_flows_parent_to_child_only() {
        let parent = CallContext::background();
        let child = parent.child_with_timeout(Duration::from_secs(1));

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child_with_timeout(Duration::from_secs(1));
        parent.cancel();
        assert!(other.is_cancelled());
        other.cancelled().await;
        assert_eq!(
            other.ensure_active("broker.accounts").unwrap_err().kind,
            ErrorKind::Cancelled
        );
    }

    #[tokio::test]
    async fn test_expired_context_reports_timeout() {
        let ctx = CallContext::with_timeout(Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert_eq!(
            ctx.ensure_active("trade.preview").unwrap_err().kind,
            ErrorKind::Timeout
        );
    }

    #[tokio::test]
    async fn test_expired_resolves_at_deadline_only() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        tokio::time::timeout(Duration::from_secs(1), ctx.expired())
            .await
            .unwrap();

        let unbounded = CallContext::background();
        assert!(
            tokio::time::timeout(Duration::from_millis(20), unbounded.expired())
                .await
                .is_err()
        );
    }
}
