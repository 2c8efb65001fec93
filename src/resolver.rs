// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Version Resolver
//!
//! Picks exactly one compiled artifact for a (name, selector) pair.
//!
//! # Rules
//! - groups are compiled in declared order; different versions of one name
//!   coexist, the same (name, version) from two groups is a config error
//! - `Exact` matches on the numeric triple only, never a prefix or range
//! - `Latest` / `Earliest` take the max / min under (major, minor, patch)
//! - storage is ordered maps, so results never depend on discovery order

use crate::compiler::{CompileError, Compiler, SourceGroup};
use crate::types::{ContractArtifact, Version, VersionSelector};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no artifact named {name}")]
    NotFound { name: String },

    #[error("{name} has no version {requested} (available: {available:?})")]
    AmbiguousOrMissingVersion {
        name: String,
        requested: Version,
        available: Vec<Version>,
    },

    #[error("{name} {version} is provided by more than one source group")]
    DuplicateArtifact { name: String, version: Version },

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Clone, Debug, Default)]
pub struct VersionResolver {
    artifacts: BTreeMap<String, BTreeMap<Version, ContractArtifact>>,
}

impl VersionResolver {
    /// Compile every group, in order, and index the results.
    pub fn discover(compiler: &dyn Compiler, groups: &[SourceGroup]) -> Result<Self> {
        let mut artifacts = Vec::new();
        for group in groups {
            let compiled = compiler.compile(group)?;
            tracing::debug!("Compiled {} artifact(s) for {}", compiled.len(), group.version);
            artifacts.extend(compiled);
        }
        Self::from_artifacts(artifacts)
    }

    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ContractArtifact>) -> Result<Self> {
        let mut index: BTreeMap<String, BTreeMap<Version, ContractArtifact>> = BTreeMap::new();
        for artifact in artifacts {
            let versions = index.entry(artifact.name.clone()).or_default();
            if versions.contains_key(&artifact.version) {
                return Err(ResolveError::DuplicateArtifact {
                    name: artifact.name,
                    version: artifact.version,
                });
            }
            versions.insert(artifact.version, artifact);
        }
        Ok(Self { artifacts: index })
    }

    pub fn resolve(&self, name: &str, selector: VersionSelector) -> Result<&ContractArtifact> {
        let versions = self.artifacts.get(name).ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })?;

        let found = match selector {
            VersionSelector::Latest => versions.values().next_back(),
            VersionSelector::Earliest => versions.values().next(),
            VersionSelector::Exact(v) => versions.get(&v),
        };

        match (found, selector) {
            (Some(artifact), _) => Ok(artifact),
            (None, VersionSelector::Exact(requested)) => Err(ResolveError::AmbiguousOrMissingVersion {
                name: name.to_string(),
                requested,
                available: versions.keys().copied().collect(),
            }),
            // An indexed name always has at least one version.
            (None, _) => Err(ResolveError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Known versions of `name`, ascending.
    pub fn versions(&self, name: &str) -> Vec<Version> {
        self.artifacts
            .get(name)
            .map(|v| v.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Smallest known version of `name` strictly greater than `after`.
    pub fn successor(&self, name: &str, after: Version) -> Option<Version> {
        self.artifacts
            .get(name)?
            .range((std::ops::Bound::Excluded(after), std::ops::Bound::Unbounded))
            .next()
            .map(|(v, _)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }
}
