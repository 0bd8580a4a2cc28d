//! Journal writer — append-only attempt stream with checksums
//!
//! # Binary format (per entry)
//! ```text
//! [total_len: u32]
//! [sequence:  u64]
//! [timestamp: i64]
//! [payload_len: u32][payload: bincode(AttemptRecord)]
//! [checksum: u32]  // CRC32C over sequence+timestamp+payload
//! ```

use chrono::Utc;
use crc32c::crc32c;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::record::AttemptRecord;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Journal Entry ───────────────────────────────────────────────────

/// A single journal entry holding one persisted attempt record.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// Monotonic sequence number, assigned by the writer
    pub sequence: u64,
    /// Unix nanosecond timestamp of the append
    pub timestamp: i64,
    /// Bincode-serialized `AttemptRecord`
    pub payload: Vec<u8>,
    /// CRC32C checksum over (sequence ++ timestamp ++ payload)
    pub checksum: u32,
}

impl JournalEntry {
    /// Create a new entry, computing the CRC32C checksum automatically.
    pub fn new(sequence: u64, timestamp: i64, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &payload);
        Self {
            sequence,
            timestamp,
            payload,
            checksum,
        }
    }

    /// Compute CRC32C over the concatenation of (sequence, timestamp, payload).
    pub fn compute_checksum(sequence: u64, timestamp: i64, payload: &[u8]) -> u32 {
        let mut buf = Vec::with_capacity(8 + 8 + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    /// Validate the stored checksum against the recomputed value.
    pub fn verify_checksum(&self) -> bool {
        let expected = Self::compute_checksum(self.sequence, self.timestamp, &self.payload);
        self.checksum == expected
    }

    /// Decode the payload back into an attempt record.
    pub fn record(&self) -> Result<AttemptRecord, JournalError> {
        bincode::deserialize(&self.payload)
            .map_err(|e| JournalError::Serialization(e.to_string()))
    }

    /// Serialize entry to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_len = self.payload.len() as u32;

        // body = 8 (seq) + 8 (ts) + 4 (pl_len) + pl_bytes + 4 (crc)
        let body_len: u32 = 8 + 8 + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize entry from the binary wire format.
    ///
    /// Returns `(entry, bytes_consumed)` on success. An `Err` means the
    /// data at this position is truncated or malformed; it never panics
    /// on corrupted input.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Serialization(
                "not enough data for length prefix".into(),
            ));
        }

        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        // Reject absurd lengths (likely corruption)
        if body_len > 10_000_000 {
            return Err(JournalError::Serialization(format!(
                "implausible body length: {body_len} (likely corruption)"
            )));
        }

        let total = 4 + body_len;
        if data.len() < total {
            return Err(JournalError::Serialization(format!(
                "incomplete entry: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        // Minimum body: 8 (seq) + 8 (ts) + 4 (pl_len) + 0 + 4 (crc) = 24
        if body_len < 24 {
            return Err(JournalError::Serialization(format!(
                "body too small: {body_len} bytes, minimum is 24"
            )));
        }

        let body = &data[4..total];
        let mut pos: usize = 0;

        let sequence = u64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let timestamp = i64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let payload_len = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;

        if pos + payload_len + 4 != body.len() {
            return Err(JournalError::Serialization(format!(
                "payload_len {} inconsistent with body length {}",
                payload_len,
                body.len()
            )));
        }
        let payload = body[pos..pos + payload_len].to_vec();
        pos += payload_len;

        let checksum = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap());

        let entry = Self {
            sequence,
            timestamp,
            payload,
            checksum,
        };

        Ok((entry, total))
    }
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Append-only journal writer.
///
/// One frame per append, flushed and fsynced before the append returns,
/// so the blast radius of a crash is bounded to the in-flight record.
/// Not safe for sharing between threads; the `AuditLog` handle owns one
/// writer behind a single-writer task.
pub struct JournalWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    next_sequence: u64,
}

impl JournalWriter {
    /// Open (or create) a journal file, scanning any existing entries to
    /// recover the next sequence number. A torn final entry from an
    /// earlier crash is truncated away so new appends land directly
    /// after the last intact frame.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (next_sequence, intact_len) = Self::scan_intact(&path)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() > intact_len {
            file.set_len(intact_len)?;
        }

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            next_sequence,
        })
    }

    /// The sequence number the next append will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// The journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one attempt record durably. Returns the written entry.
    pub fn append(&mut self, record: &AttemptRecord) -> Result<JournalEntry, JournalError> {
        let payload =
            bincode::serialize(record).map_err(|e| JournalError::Serialization(e.to_string()))?;
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let entry = JournalEntry::new(self.next_sequence, timestamp, payload);

        self.writer.write_all(&entry.to_bytes())?;
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        self.next_sequence += 1;
        Ok(entry)
    }

    /// Scan from the start, returning the next sequence number and the
    /// byte length of the intact prefix.
    fn scan_intact(path: &Path) -> Result<(u64, u64), JournalError> {
        if !path.exists() {
            return Ok((0, 0));
        }
        let data = fs::read(path)?;
        let mut pos = 0;
        let mut next = 0;
        while pos < data.len() {
            match JournalEntry::from_bytes(&data[pos..]) {
                Ok((entry, consumed)) if entry.verify_checksum() => {
                    next = entry.sequence + 1;
                    pos += consumed;
                }
                // Torn or corrupt tail from a crash; resume after the
                // last intact entry.
                _ => {
                    tracing::warn!(
                        path = %path.display(),
                        offset = pos,
                        "journal tail unreadable, truncating to last intact entry"
                    );
                    break;
                }
            }
        }
        Ok((next, pos as u64))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
