//! Append-only audit trail for transfer attempts
//!
//! Every attempt that reaches validation produces exactly one record.
//! Records are written one frame per append with a CRC32C checksum, so
//! a crash mid-write can only damage the in-flight record, never the
//! history. A single writer task owns the file; concurrent appends are
//! totally ordered through its channel.

pub mod journal;
pub mod log;
pub mod reader;

pub use journal::{JournalEntry, JournalError, JournalWriter};
pub use log::AuditLog;
pub use reader::{read_all, JournalReader, ReaderError};
