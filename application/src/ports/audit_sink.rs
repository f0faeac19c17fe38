//! Port for the append-only audit log.
//!
//! Separate from `tracing`-based operation logs: tracing carries diagnostic
//! messages, this port persists audit records in a machine-readable store.

use skybit_domain::audit::AuditRecord;
use thiserror::Error;

/// Why an audit record could not be persisted
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode audit record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write audit record: {0}")]
    Write(#[from] std::io::Error),
}

/// Append-only sink for audit records.
///
/// Each append must land as one complete record even when called from many
/// tasks at once.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Sink that drops everything (tests, audit disabled).
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit logging disabled".into()))
    }
}
