//! Audit log handle — single-writer serialization of appends
//!
//! The journal file is the one shared, mutually-exclusive resource in
//! the system. A dedicated writer thread owns the `JournalWriter` and
//! drains an mpsc queue; `append` resolves once its record is durably
//! on disk. Writes are totally ordered by the channel, so N concurrent
//! appends yield exactly N intact records.

use crate::journal::{JournalError, JournalWriter};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use types::errors::AuditError;
use types::record::AttemptRecord;

const QUEUE_DEPTH: usize = 256;

struct Append {
    record: AttemptRecord,
    ack: oneshot::Sender<Result<u64, AuditError>>,
}

/// Cloneable handle to the audit log writer task.
#[derive(Clone)]
pub struct AuditLog {
    tx: mpsc::Sender<Append>,
    path: PathBuf,
}

impl AuditLog {
    /// Open the journal and start the writer thread.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        let mut writer = JournalWriter::open(&path)?;
        let (tx, mut rx) = mpsc::channel::<Append>(QUEUE_DEPTH);

        // Dedicated thread: appends fsync, which must not stall the
        // async workers. Exits when the last handle is dropped.
        std::thread::spawn(move || {
            while let Some(append) = rx.blocking_recv() {
                let result = writer
                    .append(&append.record)
                    .map(|entry| entry.sequence)
                    .map_err(|e| AuditError::Storage(e.to_string()));
                // Caller may have gone away; the record is on disk either way.
                let _ = append.ack.send(result);
            }
        });

        Ok(Self { tx, path })
    }

    /// Append one attempt record, resolving after it is durable.
    /// Returns the record's sequence number.
    pub async fn append(&self, record: AttemptRecord) -> Result<u64, AuditError> {
        let (ack, ack_rx) = oneshot::channel();
        self.tx
            .send(Append { record, ack })
            .await
            .map_err(|_| AuditError::Closed)?;
        ack_rx.await.map_err(|_| AuditError::Closed)?
    }

    /// Path of the journal file backing this log.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}
