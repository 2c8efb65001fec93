//! Compiler oracle backed by pre-built artifact directories.
//!
//! Each source directory holds one `<ContractName>.json` per contract:
//!
//! ```json
//! { "abi": [...], "bytecode": "0x6080..." }
//! ```
//!
//! Files are read in sorted path order so discovery is deterministic.

use deploykit::compiler::{CompileError, Compiler, SourceGroup};
use deploykit::types::{Bytecode, ContractArtifact};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct ArtifactFile {
    abi: Value,
    bytecode: Bytecode,
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactDirectoryCompiler;

impl ArtifactDirectoryCompiler {
    pub fn new() -> Self {
        Self
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
        let invalid = |reason: String| CompileError::InvalidArtifact {
            path: dir.to_path_buf(),
            reason,
        };
        if !dir.is_dir() {
            return Err(CompileError::MissingSource(dir.to_path_buf()));
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| invalid(e.to_string()))? {
            let path = entry.map_err(|e| invalid(e.to_string()))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, path: &Path, group: &SourceGroup) -> Result<ContractArtifact, CompileError> {
        let invalid = |reason: String| CompileError::InvalidArtifact {
            path: path.to_path_buf(),
            reason,
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| invalid("file name is not UTF-8".into()))?;
        let raw = fs::read(path).map_err(|e| invalid(e.to_string()))?;
        let file: ArtifactFile = serde_json::from_slice(&raw).map_err(|e| invalid(e.to_string()))?;
        if file.bytecode.is_empty() {
            return Err(invalid("empty bytecode".into()));
        }
        Ok(ContractArtifact {
            name: name.to_string(),
            version: group.version,
            abi: file.abi,
            bytecode: file.bytecode,
        })
    }
}

impl Compiler for ArtifactDirectoryCompiler {
    fn compile(&self, group: &SourceGroup) -> Result<Vec<ContractArtifact>, CompileError> {
        let mut artifacts = Vec::new();
        for dir in &group.dirs {
            for path in self.read_dir(dir)? {
                artifacts.push(self.load(&path, group)?);
            }
        }
        tracing::debug!("Loaded {} artifact(s) for {}", artifacts.len(), group.version);
        Ok(artifacts)
    }
}
