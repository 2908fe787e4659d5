//! Snapshot files
//!
//! Seed data for a `MemoryStore`, written as one checksummed block.
//!
//! ## File Format
//! ```text
//! ┌──────────┬───────────┬──────────┬──────────┬──────────────────────┐
//! │Magic (4) │Version (2)│ CRC (4)  │ Len (4)  │ bincode((path, val)) │
//! └──────────┴───────────┴──────────┴──────────┴──────────────────────┘
//! ```
//! Integers are little-endian; the CRC covers the body only.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VstorageError};

use super::path::path_segments;
use super::MemoryStore;

/// Magic number for snapshot files
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"VSTS";

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_SIZE: usize = 14;

/// Snapshot body: every `(path, value)` pair in path order
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBody {
    entries: Vec<(String, String)>,
}

/// Write every entry of `store` to `path`, replacing any existing file
pub fn save_snapshot(store: &MemoryStore, path: &Path) -> Result<()> {
    let snapshot = SnapshotBody {
        entries: store.entries(),
    };
    let body = bincode::serialize(&snapshot)?;
    let body_len = u32::try_from(body.len()).map_err(|_| {
        VstorageError::Snapshot(format!("Snapshot too large: {} bytes", body.len()))
    })?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_all(&SNAPSHOT_VERSION.to_le_bytes())?;
    writer.write_all(&crc32fast::hash(&body).to_le_bytes())?;
    writer.write_all(&body_len.to_le_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;

    let file = writer
        .into_inner()
        .map_err(|e| VstorageError::Snapshot(format!("Failed to flush snapshot: {}", e)))?;
    file.sync_all()?;

    tracing::debug!(
        "Saved {} entries to snapshot {}",
        snapshot.entries.len(),
        path.display()
    );
    Ok(())
}

/// Load the entries in `path` into `store`
///
/// Returns the number of entries loaded. A bad magic, unknown version,
/// short body or checksum mismatch leaves `store` untouched.
pub fn load_snapshot(store: &MemoryStore, path: &Path) -> Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| {
        VstorageError::Snapshot(format!("Truncated snapshot header: {}", e))
    })?;

    if &header[0..4] != SNAPSHOT_MAGIC {
        return Err(VstorageError::Snapshot(format!(
            "Invalid snapshot magic: expected VSTS, got {:?}",
            &header[0..4]
        )));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != SNAPSHOT_VERSION {
        return Err(VstorageError::Snapshot(format!(
            "Unsupported snapshot version: {}",
            version
        )));
    }

    let expected_crc = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let body_len = u32::from_le_bytes([header[10], header[11], header[12], header[13]]) as usize;

    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body).map_err(|e| {
        VstorageError::Snapshot(format!("Truncated snapshot body: {}", e))
    })?;

    let actual_crc = crc32fast::hash(&body);
    if actual_crc != expected_crc {
        return Err(VstorageError::Snapshot(format!(
            "Checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
            expected_crc, actual_crc
        )));
    }

    let SnapshotBody { entries } = bincode::deserialize(&body)?;
    for (path, _) in &entries {
        path_segments(path)?;
    }
    for (path, value) in &entries {
        store.set(path, value.as_str())?;
    }

    tracing::debug!("Loaded {} entries from snapshot {}", entries.len(), path.display());
    Ok(entries.len())
}
