//! Audit records: append-only entries describing notable actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339 UTC timestamp
    pub ts: String,
    pub event: Value,
    pub payload: Value,
}

impl AuditRecord {
    pub fn new(ts: impl Into<String>, event: Value, payload: Value) -> Self {
        Self {
            ts: ts.into(),
            event,
            payload,
        }
    }
}
