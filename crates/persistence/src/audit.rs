//! Checksummed audit journal.
//!
//! One framed record per registry append, in append order:
//!
//! ```text
//! [seq u64][timestamp u64][label_len u32][payload_len u32][crc64 u64][label][payload]
//! ```
//!
//! `seq` is the enrollment's position in the registry and the payload is
//! the enrollment in its registry JSON form. The registry file stays the
//! source of truth; the journal lets `verify` detect edits to it.

use crate::error::{PersistenceError, Result};
use crc64fast::Digest;
use deploykit::types::RegistryEnrollment;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditHeader {
    pub seq: u64,
    pub timestamp: u64,
    pub label_len: u32,
    pub payload_len: u32,
    pub checksum: u64,
}

impl AuditHeader {
    pub const SIZE: usize = 8 + 8 + 4 + 4 + 8;

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;

        Ok(Self {
            seq: le_u64(&buf[0..8]),
            timestamp: le_u64(&buf[8..16]),
            label_len: le_u32(&buf[16..20]),
            payload_len: le_u32(&buf[20..24]),
            checksum: le_u64(&buf[24..32]),
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..8].copy_from_slice(&self.seq.to_le_bytes());
        buf[8..16].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[16..20].copy_from_slice(&self.label_len.to_le_bytes());
        buf[20..24].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[24..32].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub header: AuditHeader,
    pub label: String,
    pub enrollment: RegistryEnrollment,
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn checksum(seq: u64, timestamp: u64, label: &[u8], payload: &[u8]) -> u64 {
    let mut digest = Digest::new();
    digest.write(&seq.to_le_bytes());
    digest.write(&timestamp.to_le_bytes());
    digest.write(&(label.len() as u32).to_le_bytes());
    digest.write(&(payload.len() as u32).to_le_bytes());
    digest.write(label);
    digest.write(payload);
    digest.sum64()
}

pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn append_record(
    path: impl AsRef<Path>,
    seq: u64,
    timestamp: Option<u64>,
    label: &str,
    enrollment: &RegistryEnrollment,
) -> Result<()> {
    let payload = serde_json::to_vec(enrollment)?;
    let timestamp = timestamp.unwrap_or_else(now_secs);
    let header = AuditHeader {
        seq,
        timestamp,
        label_len: label.len() as u32,
        payload_len: payload.len() as u32,
        checksum: checksum(seq, timestamp, label.as_bytes(), &payload),
    };

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&header.to_bytes())?;
    file.write_all(label.as_bytes())?;
    file.write_all(&payload)?;
    file.sync_data()?;

    Ok(())
}

pub struct AuditReader {
    reader: BufReader<File>,
}

impl AuditReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    fn read_record(&mut self, header: AuditHeader) -> Result<AuditRecord> {
        let mut label = vec![0u8; header.label_len as usize];
        self.reader.read_exact(&mut label)?;
        let mut payload = vec![0u8; header.payload_len as usize];
        self.reader.read_exact(&mut payload)?;

        let found = checksum(header.seq, header.timestamp, &label, &payload);
        if found != header.checksum {
            return Err(PersistenceError::ChecksumMismatch {
                seq: header.seq,
                expected: header.checksum,
                found,
            });
        }

        let label = String::from_utf8(label)
            .map_err(|e| PersistenceError::InvalidFormat(format!("Invalid UTF-8 in label: {}", e)))?;
        let enrollment = serde_json::from_slice(&payload)?;
        Ok(AuditRecord {
            header,
            label,
            enrollment,
        })
    }
}

impl Iterator for AuditReader {
    type Item = Result<AuditRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = match AuditHeader::read_from(&mut self.reader) {
            Ok(h) => h,
            Err(PersistenceError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return None,
            Err(e) => return Some(Err(e)),
        };
        Some(self.read_record(header))
    }
}

/// Every record; a missing journal reads as empty.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    AuditReader::new(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploykit::types::{Address, Version};
    use tempfile::tempdir;

    fn enrollment(addr: u8) -> RegistryEnrollment {
        RegistryEnrollment::new("X", Version::new(1, 0, 0), Address([addr; 20]), serde_json::json!([]))
    }

    #[test]
    fn test_records_read_back_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        append_record(&path, 0, Some(10), "deploy", &enrollment(1)).unwrap();
        append_record(&path, 1, Some(20), "upgrade", &enrollment(2)).unwrap();

        let records = read_all(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "deploy");
        assert_eq!(records[1].header.seq, 1);
        assert_eq!(records[1].header.timestamp, 20);
        assert_eq!(records[1].enrollment, enrollment(2));
    }

    #[test]
    fn test_flipped_byte_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        append_record(&path, 0, Some(10), "deploy", &enrollment(1)).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 3;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let err = read_all(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::ChecksumMismatch { seq: 0, .. }));
    }

    #[test]
    fn test_missing_journal_is_empty() {
        let dir = tempdir().unwrap();
        assert!(read_all(dir.path().join("none.log")).unwrap().is_empty());
    }

    #[test]
    fn test_header_bytes() {
        let header = AuditHeader {
            seq: 3,
            timestamp: 4,
            label_len: 5,
            payload_len: 6,
            checksum: 7,
        };
        let bytes = header.to_bytes();
        assert_eq!(AuditHeader::read_from(&bytes[..]).unwrap(), header);
    }
}
