// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Contract Registry
//!
//! Append-only, ordered ledger of deployment enrollments.
//!
//! # Invariants
//! - `append` is the only mutation
//! - order is append order, oldest first; no backend may reorder,
//!   deduplicate or drop entries
//! - "current" for a name is the LAST matching enrollment, "previous" the
//!   one before it; never derived by comparing versions

use crate::types::{Address, RegistryEnrollment, Version};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{name} {version} at {address} is already the current enrollment")]
    DuplicateEnrollment {
        name: String,
        version: Version,
        address: Address,
    },

    #[error("corrupt registry: {0}")]
    CorruptRegistry(String),

    #[error("registry is locked by another writer; remove {} if none is running", .0.display())]
    Locked(PathBuf),

    #[error("registry IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Storage-agnostic registry contract.
pub trait ContractRegistry {
    /// Append one enrollment at the end.
    fn append(&mut self, enrollment: RegistryEnrollment) -> Result<()>;

    /// Every enrollment in append order.
    fn all(&self) -> Result<Vec<RegistryEnrollment>>;

    /// Order-preserving filter of [`all`](Self::all). `None` matches anything.
    fn search(&self, contract_name: Option<&str>, address: Option<&Address>) -> Result<Vec<RegistryEnrollment>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| contract_name.map_or(true, |n| e.contract_name == n))
            .filter(|e| address.map_or(true, |a| e.address == *a))
            .collect())
    }

    /// Last enrollment for `contract_name`.
    fn current(&self, contract_name: &str) -> Result<Option<RegistryEnrollment>> {
        Ok(self.search(Some(contract_name), None)?.pop())
    }

    /// Second-to-last enrollment for `contract_name`.
    fn previous(&self, contract_name: &str) -> Result<Option<RegistryEnrollment>> {
        let mut history = self.search(Some(contract_name), None)?;
        if history.len() < 2 {
            return Ok(None);
        }
        history.pop();
        Ok(history.pop())
    }
}

/// Double-write guard shared by every backend.
///
/// Rejects `candidate` when the identical (name, version, address) triple
/// is already the current enrollment for that name, which is what a
/// retried append produces. A rollback re-enrolling an older address is
/// not a duplicate because something else is current at that point.
pub fn check_append(existing: &[RegistryEnrollment], candidate: &RegistryEnrollment) -> Result<()> {
    let current = existing
        .iter()
        .rev()
        .find(|e| e.contract_name == candidate.contract_name);
    match current {
        Some(e) if e.same_triple(candidate) => Err(RegistryError::DuplicateEnrollment {
            name: candidate.contract_name.clone(),
            version: candidate.version,
            address: candidate.address,
        }),
        _ => Ok(()),
    }
}

/// Process-local registry.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistry {
    entries: Vec<RegistryEnrollment>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<RegistryEnrollment>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEnrollment] {
        &self.entries
    }
}

impl ContractRegistry for InMemoryRegistry {
    fn append(&mut self, enrollment: RegistryEnrollment) -> Result<()> {
        check_append(&self.entries, &enrollment)?;
        self.entries.push(enrollment);
        Ok(())
    }

    fn all(&self) -> Result<Vec<RegistryEnrollment>> {
        Ok(self.entries.clone())
    }
}
