//! File-backed registry: a JSON array of `[name, version, address, abi]`.
//!
//! # Guarantees
//! - every append is read-check-write under an exclusive lock file
//! - the new file is written beside the old one and renamed over it, so a
//!   crash leaves either the old or the new array, never half of one
//! - a file that is not a well-formed array is `CorruptRegistry`; it is
//!   never repaired or rewritten
//! - a missing file reads as an empty registry

use crate::audit;
use crate::lock::WriteLock;
use deploykit::registry::{check_append, ContractRegistry, RegistryError, Result};
use deploykit::types::RegistryEnrollment;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalRegistry {
    path: PathBuf,
    journal: Option<PathBuf>,
    operation: String,
}

impl LocalRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            journal: None,
            operation: "enroll".to_string(),
        }
    }

    /// Also record each append in a checksummed audit journal.
    pub fn with_journal(mut self, journal: impl Into<PathBuf>) -> Self {
        self.journal = Some(journal.into());
        self
    }

    /// Label written to the journal for subsequent appends.
    pub fn set_operation(&mut self, operation: impl Into<String>) {
        self.operation = operation.into();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal(&self) -> Option<&Path> {
        self.journal.as_deref()
    }

    fn read(&self) -> Result<Vec<RegistryEnrollment>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::CorruptRegistry(format!("{}: {}", self.path.display(), e)))
    }

    fn write(&self, entries: &[RegistryEnrollment]) -> Result<()> {
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| RegistryError::CorruptRegistry(format!("cannot encode registry: {}", e)))?;

        let mut tmp_name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        let mut file = File::create(&tmp)?;
        file.write_all(&body)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ContractRegistry for LocalRegistry {
    fn append(&mut self, enrollment: RegistryEnrollment) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let _lock = WriteLock::acquire(&self.path)?;

        let mut entries = self.read()?;
        check_append(&entries, &enrollment)?;
        let seq = entries.len() as u64;
        entries.push(enrollment);
        self.write(&entries)?;
        tracing::debug!("Registry {} now has {} enrollment(s)", self.path.display(), entries.len());

        if let (Some(journal), Some(appended)) = (&self.journal, entries.last()) {
            // The registry write already happened; a journal failure is reported, not undone.
            if let Err(e) = audit::append_record(journal, seq, None, &self.operation, appended) {
                tracing::error!("Enrollment {} written but not journaled: {}", seq, e);
            }
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<RegistryEnrollment>> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploykit::types::{Address, Version};
    use serde_json::json;
    use tempfile::tempdir;

    fn entry(name: &str, major: u32, addr: u8) -> RegistryEnrollment {
        RegistryEnrollment::new(name, Version::new(major, 0, 0), Address([addr; 20]), json!([{"type": "fallback"}]))
    }

    #[test]
    fn test_appends_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = LocalRegistry::new(&path);
        registry.append(entry("X", 1, 1)).unwrap();
        registry.append(entry("Dispatcher", 1, 2)).unwrap();
        registry.append(entry("X", 2, 3)).unwrap();

        let reopened = LocalRegistry::new(&path);
        let all = reopened.all().unwrap();
        assert_eq!(all, vec![entry("X", 1, 1), entry("Dispatcher", 1, 2), entry("X", 2, 3)]);
        assert_eq!(reopened.current("X").unwrap(), Some(entry("X", 2, 3)));
        assert_eq!(reopened.previous("X").unwrap(), Some(entry("X", 1, 1)));
    }

    #[test]
    fn test_on_disk_shape_is_array_of_tuples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        LocalRegistry::new(&path).append(entry("X", 1, 1)).unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw[0][0], "X");
        assert_eq!(raw[0][1], "1.0.0");
        assert_eq!(raw[0][2], format!("0x{}", "01".repeat(20)));
        assert_eq!(raw[0][3], json!([{"type": "fallback"}]));
    }

    #[test]
    fn test_missing_and_empty_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        assert!(LocalRegistry::new(&path).all().unwrap().is_empty());

        fs::write(&path, "\n").unwrap();
        assert!(LocalRegistry::new(&path).all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_corrupt_and_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"[{"name": "X"}]"#).unwrap();

        let mut registry = LocalRegistry::new(&path);
        assert!(matches!(registry.all(), Err(RegistryError::CorruptRegistry(_))));
        assert!(matches!(registry.append(entry("X", 1, 1)), Err(RegistryError::CorruptRegistry(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"name": "X"}]"#);
    }

    #[test]
    fn test_locked_registry_refuses_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let _held = WriteLock::acquire(&path).unwrap();

        let err = LocalRegistry::new(&path).append(entry("X", 1, 1)).unwrap_err();
        assert!(matches!(err, RegistryError::Locked(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_of_current_is_rejected() {
        let dir = tempdir().unwrap();
        let mut registry = LocalRegistry::new(dir.path().join("registry.json"));
        registry.append(entry("X", 1, 1)).unwrap();

        let err = registry.append(entry("X", 1, 1)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateEnrollment { .. }));
        assert_eq!(registry.all().unwrap().len(), 1);
    }

    #[test]
    fn test_journal_mirrors_appends() {
        let dir = tempdir().unwrap();
        let journal = dir.path().join("audit.log");
        let mut registry = LocalRegistry::new(dir.path().join("registry.json")).with_journal(&journal);

        registry.set_operation("deploy");
        registry.append(entry("X", 1, 1)).unwrap();
        registry.set_operation("upgrade");
        registry.append(entry("X", 2, 2)).unwrap();

        let records = audit::read_all(&journal).unwrap();
        let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["deploy", "upgrade"]);
        assert_eq!(records[1].header.seq, 1);
        assert_eq!(records[1].enrollment, entry("X", 2, 2));
    }
}
