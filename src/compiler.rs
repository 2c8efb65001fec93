// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Compilation oracle boundary.
//!
//! Turning sources into bytecode is external. A [`Compiler`] takes one
//! version-tagged group of source directories and returns the artifacts
//! built from it, each stamped with the group's version.

use crate::types::{Bytecode, ContractArtifact, Version};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("no sources at {0}")]
    MissingSource(PathBuf),

    #[error("invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },
}

/// Ordered directories that together make up one contract version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceGroup {
    pub version: Version,
    pub dirs: Vec<PathBuf>,
}

impl SourceGroup {
    pub fn new(version: Version, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            version,
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

pub trait Compiler {
    fn compile(&self, group: &SourceGroup) -> Result<Vec<ContractArtifact>, CompileError>;
}

/// Contract as produced from a source directory, before version stamping.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceContract {
    pub name: String,
    pub abi: Value,
    pub bytecode: Bytecode,
}

/// Oracle answering from a fixed table keyed by directory.
#[derive(Clone, Debug, Default)]
pub struct StaticCompiler {
    sources: BTreeMap<PathBuf, Vec<SourceContract>>,
}

impl StaticCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, dir: impl Into<PathBuf>, contracts: Vec<SourceContract>) -> Self {
        self.sources.entry(dir.into()).or_default().extend(contracts);
        self
    }
}

impl Compiler for StaticCompiler {
    fn compile(&self, group: &SourceGroup) -> Result<Vec<ContractArtifact>, CompileError> {
        let mut artifacts = Vec::new();
        for dir in &group.dirs {
            let contracts = self
                .sources
                .get(dir)
                .ok_or_else(|| CompileError::MissingSource(dir.clone()))?;
            artifacts.extend(contracts.iter().map(|c| ContractArtifact {
                name: c.name.clone(),
                version: group.version,
                abi: c.abi.clone(),
                bytecode: c.bytecode.clone(),
            }));
        }
        Ok(artifacts)
    }
}
