//! Journal reader — sequential scan with corruption detection
//!
//! Returns records in insertion order, validating each frame's CRC32C
//! checksum. A truncated or corrupt tail (the usual crash artifact) ends
//! the scan: the valid prefix is returned and a partially-written record
//! is never surfaced.

use crate::journal::{JournalEntry, JournalError};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use types::record::AttemptRecord;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
}

/// Diagnostic record for a damaged journal tail.
#[derive(Debug, Clone)]
pub struct CorruptionRecord {
    /// Byte offset where the scan stopped.
    pub byte_offset: u64,
    /// Human-readable detail.
    pub detail: String,
}

// ── Journal Reader ──────────────────────────────────────────────────

/// Sequential journal reader with checksum validation.
pub struct JournalReader {
    path: PathBuf,
    data: Vec<u8>,
    pos: usize,
    corruption: Option<CorruptionRecord>,
}

impl JournalReader {
    /// Open a reader over the journal file. A missing file reads as an
    /// empty journal.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReaderError> {
        let path = path.into();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            data,
            pos: 0,
            corruption: None,
        })
    }

    /// Read the next intact entry, or `None` at end of journal.
    ///
    /// The scan stops at the first damaged frame; the damage is
    /// available via [`corruption`](Self::corruption).
    pub fn next_entry(&mut self) -> Option<JournalEntry> {
        if self.corruption.is_some() || self.pos >= self.data.len() {
            return None;
        }

        match JournalEntry::from_bytes(&self.data[self.pos..]) {
            Ok((entry, consumed)) if entry.verify_checksum() => {
                self.pos += consumed;
                Some(entry)
            }
            Ok((entry, _)) => {
                self.stop_at_corruption(format!(
                    "checksum mismatch in entry seq={}",
                    entry.sequence
                ));
                None
            }
            Err(e) => {
                self.stop_at_corruption(e.to_string());
                None
            }
        }
    }

    /// Read the next attempt record, or `None` at end of journal.
    pub fn next_record(&mut self) -> Result<Option<AttemptRecord>, ReaderError> {
        match self.next_entry() {
            Some(entry) => Ok(Some(entry.record()?)),
            None => Ok(None),
        }
    }

    /// The damage that ended the scan, if any.
    pub fn corruption(&self) -> Option<&CorruptionRecord> {
        self.corruption.as_ref()
    }

    fn stop_at_corruption(&mut self, detail: String) {
        tracing::warn!(
            path = %self.path.display(),
            offset = self.pos,
            detail = %detail,
            "journal scan stopped at damaged frame"
        );
        self.corruption = Some(CorruptionRecord {
            byte_offset: self.pos as u64,
            detail,
        });
    }
}

/// Read every intact attempt record from a journal file, in insertion
/// order.
pub fn read_all(path: impl Into<PathBuf>) -> Result<Vec<AttemptRecord>, ReaderError> {
    let mut reader = JournalReader::open(path)?;
    let mut records = Vec::new();
    while let Some(record) = reader.next_record()? {
        records.push(record);
    }
    Ok(records)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalWriter;
    use tempfile::TempDir;
    use types::ids::ChargeId;
    use types::money::Amount;
    use types::record::AttemptStatus;

    fn sample_record(i: i64) -> AttemptRecord {
        AttemptRecord::completed(
            Amount::from_minor(100 + i).unwrap(),
            "GBP",
            format!("acct_{i}"),
            ChargeId::new(format!("ch_{i}")),
        )
    }

    #[test]
    fn test_read_back_in_insertion_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("attempts.bin");
        let mut writer = JournalWriter::open(&path).unwrap();

        let records: Vec<_> = (0..10).map(sample_record).collect();
        for record in &records {
            writer.append(record).unwrap();
        }

        let read = read_all(&path).unwrap();
        assert_eq!(read, records);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let read = read_all(tmp.path().join("nothing.bin")).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_truncated_tail_returns_valid_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("attempts.bin");
        let mut writer = JournalWriter::open(&path).unwrap();
        for i in 0..3 {
            writer.append(&sample_record(i)).unwrap();
        }
        drop(writer);

        // Chop bytes off the last frame.
        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() - 5]).unwrap();

        let mut reader = JournalReader::open(&path).unwrap();
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record);
        }
        assert_eq!(records.len(), 2);
        assert!(reader.corruption().is_some());
    }

    #[test]
    fn test_flipped_byte_stops_scan_at_checksum() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("attempts.bin");
        let mut writer = JournalWriter::open(&path).unwrap();
        let first = writer.append(&sample_record(0)).unwrap();
        writer.append(&sample_record(1)).unwrap();
        drop(writer);

        // Flip a payload byte inside the second frame.
        let mut data = fs::read(&path).unwrap();
        let offset = first.to_bytes().len() + 25;
        data[offset] ^= 0xFF;
        fs::write(&path, &data).unwrap();

        let mut reader = JournalReader::open(&path).unwrap();
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
        let corruption = reader.corruption().unwrap();
        assert!(corruption.detail.contains("checksum") || corruption.detail.contains("corrupt"));
    }

    #[test]
    fn test_statuses_survive_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("attempts.bin");
        let mut writer = JournalWriter::open(&path).unwrap();

        writer.append(&sample_record(0)).unwrap();
        writer
            .append(&AttemptRecord::failed(
                rust_decimal::Decimal::new(500, 2),
                "GBP",
                "acct_456",
                "Face not recognized",
            ))
            .unwrap();
        writer
            .append(&AttemptRecord::error(
                Amount::from_minor(500).unwrap(),
                "GBP",
                "acct_456",
                "card_declined",
            ))
            .unwrap();

        let read = read_all(&path).unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read[0].status, AttemptStatus::Completed);
        assert_eq!(read[1].status, AttemptStatus::Failed);
        assert_eq!(read[1].charge_id, None);
        assert_eq!(read[2].status, AttemptStatus::Error);
        assert_eq!(read[2].error.as_deref(), Some("card_declined"));
    }
}
