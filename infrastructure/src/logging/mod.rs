//! Logging infrastructure: the persistent audit trail.
//!
//! Provides [`JsonlAuditLog`], a JSONL file writer that implements the
//! [`AuditSink`](skybit_application::AuditSink) port. Diagnostic logs go
//! through `tracing` instead.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditLog;
