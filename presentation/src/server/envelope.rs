//! Tool-call envelope
//!
//! Request: `{name, args}`. Response: `{ok, error?, error_kind?, data?}`
//! where `error` is present iff `ok` is false and `data` iff it is true.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use skybit_domain::tool::{CallArgs, CallOutcome, ErrorKind, ToolCall, ToolError};

/// Inbound call envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub name: String,
    /// Absent and `null` both mean "no arguments"
    #[serde(default)]
    pub args: Option<CallArgs>,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>, args: CallArgs) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
        }
    }

    pub fn into_call(self) -> ToolCall {
        ToolCall::new(self.name).with_arguments(self.args.unwrap_or_default())
    }
}

/// Outbound response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResponse {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            error: None,
            error_kind: None,
            data: Some(data),
        }
    }

    pub fn failure(err: &ToolError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind),
            data: None,
        }
    }

    /// Body for an envelope that could not be parsed
    pub fn invalid_json() -> Self {
        Self {
            ok: false,
            error: Some("invalid json".to_string()),
            error_kind: None,
            data: None,
        }
    }
}

impl From<CallOutcome> for ToolResponse {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Success(data) => Self::success(data),
            CallOutcome::Failure(err) => Self::failure(&err),
        }
    }
}
