//! Append-only journal: the durability mechanism behind [`Store`](crate::Store).
//!
//! One journal record == one committed batch. Records are self-delimiting
//! (length prefix + CRC32) so recovery can tell a torn tail write (crash
//! mid-append) apart from real corruption: a record that runs past EOF is
//! a torn tail and is truncated away silently; a complete record whose
//! checksum doesn't match is corruption and is surfaced, never repaired
//! (spec §7, `CorruptedStateError`).
//!
//! This is deliberately a single-segment, single-writer log — the engine
//! has no multi-writer or multi-segment rotation requirement (spec §5) —
//! unlike the source project's full WAL, which rotates across many
//! immutable segment files for a server workload.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::store::{DurabilityMode, WriteOp};

const JOURNAL_FILE_NAME: &str = "journal.log";

/// One durable commit: the batch of writes/deletes applied together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Record {
    pub ops: Vec<WriteOp>,
}

/// Handle to the on-disk journal file.
pub(crate) struct Journal {
    file: File,
    path: PathBuf,
    durability: DurabilityMode,
    writes_since_sync: u64,
}

impl Journal {
    /// Open (creating if absent) the journal at `root`, replaying any
    /// existing records into `apply`.
    ///
    /// `apply` is called once per recovered record, in file order, so the
    /// caller can rebuild its in-memory index exactly as it would have
    /// looked just before the crash (or cleanly, on a normal close).
    pub fn open(
        root: &Path,
        durability: DurabilityMode,
        mut apply: impl FnMut(Record),
    ) -> Result<Self> {
        let path = root.join(JOURNAL_FILE_NAME);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let valid_len = replay(&mut file, &path, &mut apply)?;

        // A torn tail write is truncated away: the next append starts
        // cleanly right after the last complete, checksummed record.
        let current_len = file.metadata().map_err(|e| StoreError::io(&path, e))?.len();
        if valid_len < current_len {
            file.set_len(valid_len).map_err(|e| StoreError::io(&path, e))?;
        }
        file.seek(SeekFrom::End(0)).map_err(|e| StoreError::io(&path, e))?;

        Ok(Journal {
            file,
            path,
            durability,
            writes_since_sync: 0,
        })
    }

    /// Append one record (one commit) and apply the configured durability
    /// policy.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let payload = serde_json::to_vec(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let crc = crc32fast::hash(&payload);

        let mut frame = Vec::with_capacity(payload.len() + 8);
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&payload);

        self.file
            .write_all(&frame)
            .map_err(|e| StoreError::io(&self.path, e))?;

        self.writes_since_sync += 1;
        if self.durability.should_sync_now(self.writes_since_sync) {
            self.file
                .sync_data()
                .map_err(|e| StoreError::io(&self.path, e))?;
            self.writes_since_sync = 0;
        }
        Ok(())
    }

    /// Force a sync regardless of durability mode (called from `close`).
    pub fn flush(&mut self) -> Result<()> {
        self.file
            .sync_data()
            .map_err(|e| StoreError::io(&self.path, e))
    }
}

/// Replay every complete, checksummed record in `file`, calling `apply` for
/// each. Returns the byte offset through the last valid record (i.e. the
/// length the file should be truncated to if a torn tail follows).
fn replay(file: &mut File, path: &Path, apply: &mut impl FnMut(Record)) -> Result<u64> {
    file.seek(SeekFrom::Start(0)).map_err(|e| StoreError::io(path, e))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|e| StoreError::io(path, e))?;

    let mut offset = 0usize;
    while offset < buf.len() {
        // Torn tail: not even a full 8-byte header survived the crash.
        if offset + 8 > buf.len() {
            break;
        }
        let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
        let crc = u32::from_le_bytes(buf[offset + 4..offset + 8].try_into().unwrap());
        let payload_start = offset + 8;
        let payload_end = payload_start + len;

        // Torn tail: header claims more payload than the file actually has.
        if payload_end > buf.len() {
            break;
        }

        let payload = &buf[payload_start..payload_end];
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != crc {
            return Err(StoreError::Corrupted(format!(
                "journal record at offset {offset} failed checksum (not a torn tail: \
                 a complete-length record with a bad checksum is real corruption)"
            )));
        }

        let record: Record = serde_json::from_slice(payload)
            .map_err(|e| StoreError::Corrupted(format!("journal record is not valid JSON: {e}")))?;
        apply(record);

        offset = payload_end;
    }

    Ok(offset as u64)
}

impl DurabilityMode {
    fn should_sync_now(self, writes_since_sync: u64) -> bool {
        match self {
            DurabilityMode::InMemory => false,
            DurabilityMode::Strict => true,
            DurabilityMode::Batched { batch_size } => writes_since_sync >= batch_size as u64,
        }
    }
}
