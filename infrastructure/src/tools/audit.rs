//! audit.log tool: best-effort append to the audit log
//!
//! A persistence failure is reported as `persisted: false` and logged; it
//! never fails the call, so an unwritable disk cannot block trading actions.

use async_trait::async_trait;
use serde_json::{Value, json};
use skybit_application::ports::audit_sink::AuditSink;
use skybit_application::ports::tool_handler::{CallContext, ToolHandler};
use skybit_domain::audit::AuditRecord;
use skybit_domain::tool::{CallArgs, RiskLevel, ToolDefinition, ToolError, ToolParameter};
use std::sync::Arc;
use tracing::warn;

use super::rfc3339_now;

/// Tool name constant
pub const AUDIT_LOG: &str = "audit.log";

/// Handler for `audit.log`
pub struct AuditLogTool {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogTool {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ToolHandler for AuditLogTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            AUDIT_LOG,
            "Append an event to the local audit log. Returns whether it was persisted.",
            RiskLevel::Low,
        )
        .with_parameter(ToolParameter::new("event", "Event name", false))
        .with_parameter(
            ToolParameter::new("payload", "Arbitrary event data", false).with_type("any"),
        )
    }

    async fn invoke(&self, _ctx: &CallContext, args: &CallArgs) -> Result<Value, ToolError> {
        let record = AuditRecord::new(
            rfc3339_now(),
            args.get("event").cloned().unwrap_or(Value::Null),
            args.get("payload").cloned().unwrap_or(Value::Null),
        );

        let persisted = match self.sink.append(&record) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Audit record not persisted");
                false
            }
        };
        Ok(json!({ "persisted": persisted }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybit_application::ports::audit_sink::{AuditError, NoAuditSink};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditSink for MemorySink {
        fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_appends_event_and_payload() {
        let sink = Arc::new(MemorySink::default());
        let tool = AuditLogTool::new(sink.clone());
        let args = CallArgs::new()
            .with_arg("event", "order.placed")
            .with_arg("payload", json!({"broker_order_id": "SNAP-1"}));

        let value = tool.invoke(&CallContext::background(), &args).await.unwrap();
        assert_eq!(value, json!({"persisted": true}));

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, json!("order.placed"));
        assert_eq!(records[0].payload["broker_order_id"], "SNAP-1");
        assert!(records[0].ts.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_missing_fields_become_null() {
        let sink = Arc::new(MemorySink::default());
        AuditLogTool::new(sink.clone())
            .invoke(&CallContext::background(), &CallArgs::new())
            .await
            .unwrap();

        let records = sink.records.lock().unwrap();
        assert_eq!(records[0].event, Value::Null);
        assert_eq!(records[0].payload, Value::Null);
    }

    #[tokio::test]
    async fn test_sink_failure_is_not_an_error() {
        let value = AuditLogTool::new(Arc::new(NoAuditSink))
            .invoke(&CallContext::background(), &CallArgs::new().with_arg("event", "x"))
            .await
            .unwrap();
        assert_eq!(value, json!({"persisted": false}));
    }
}
