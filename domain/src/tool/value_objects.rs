//! Tool domain value objects: error and outcome types
//!
//! Every call through the gateway terminates in exactly one [`CallOutcome`]:
//! a result value or a [`ToolError`], never both.
//!
//! | Code | Raised by | Meaning |
//! |------|-----------|---------|
//! | `NOT_FOUND` | registry | No handler bound to the requested name |
//! | `INVALID_ARGUMENT` | handler | Required field missing or malformed |
//! | `NO_LINKED_ACCOUNT` | broker handlers | Nothing to default the account to |
//! | `BACKEND_ERROR` | broker handlers | Brokerage transport, status, or decode failure |
//! | `TIMEOUT` | dispatcher | Call deadline elapsed |
//! | `CANCELLED` | dispatcher / client | Call context cancelled |
//! | `POLICY_DENIED` | dispatcher | Policy rules rejected a high-risk call |
//! | `UNAVAILABLE` | broker handlers | Brokerage credentials not configured |
//! | `INTERNAL` | dispatcher | Handler panicked |

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    NoLinkedAccount,
    #[serde(rename = "BACKEND_ERROR")]
    Backend,
    Timeout,
    Cancelled,
    PolicyDenied,
    Unavailable,
    Internal,
}

impl ErrorKind {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NoLinkedAccount => "NO_LINKED_ACCOUNT",
            ErrorKind::Backend => "BACKEND_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::PolicyDenied => "POLICY_DENIED",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error that occurred while resolving or executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("unknown tool: {}", tool_name.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn no_linked_account() -> Self {
        Self::new(
            ErrorKind::NoLinkedAccount,
            "no accounts linked; run brokers connect",
        )
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("call timed out: {}", operation.into()),
        )
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Cancelled,
            format!("call cancelled: {}", operation.into()),
        )
    }

    pub fn policy_denied(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::PolicyDenied,
            format!("denied by policy: {}", reason.into()),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Terminal state of one call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(Value),
    Failure(ToolError),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        self.into()
    }
}

impl From<Result<Value, ToolError>> for CallOutcome {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(value) => CallOutcome::Success(value),
            Err(error) => CallOutcome::Failure(error),
        }
    }
}

impl From<CallOutcome> for Result<Value, ToolError> {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Success(value) => Ok(value),
            CallOutcome::Failure(error) => Err(error),
        }
    }
}
