//! JSONL audit log writer.
//!
//! Each [`AuditRecord`] is serialized as one JSON line and appended with a
//! single `write_all` while holding the file lock, so concurrent appends from
//! many calls never interleave mid-line.

use skybit_application::ports::audit_sink::{AuditError, AuditSink};
use skybit_domain::audit::AuditRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Append-only JSONL audit log.
///
/// Thread-safe via `Mutex<File>`. A file that cannot be opened does not
/// prevent construction: the log then rejects every append.
pub struct JsonlAuditLog {
    file: Result<Mutex<File>, String>,
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Open (or create) the log in append mode, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = Self::open_file(path).map(Mutex::new).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Could not open audit log");
            e.to_string()
        });
        if file.is_ok() {
            debug!(path = %path.display(), "Audit log opened");
        }

        Self {
            file,
            path: path.to_path_buf(),
        }
    }

    fn open_file(path: &Path) -> std::io::Result<File> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        self.file.is_ok()
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let file = self
            .file
            .as_ref()
            .map_err(|reason| AuditError::Unavailable(reason.clone()))?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = file
            .lock()
            .map_err(|_| AuditError::Unavailable("audit log lock poisoned".into()))?;
        write_line(&mut *file, &line)?;
        Ok(())
    }
}

/// Write one terminated line. A failed write may leave a fragment behind, so
/// it is closed with a newline to keep later records on their own lines.
fn write_line<W: Write>(out: &mut W, line: &[u8]) -> std::io::Result<()> {
    if let Err(e) = out.write_all(line).and_then(|()| out.flush()) {
        let _ = out.write_all(b"\n").and_then(|()| out.flush());
        return Err(e);
    }
    Ok(())
}
