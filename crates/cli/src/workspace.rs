use anyhow::Context;
use deploykit::compiler::SourceGroup;
use deploykit::config::DeployConfig;
use deploykit::ledger::sim::{LocalSigner, SimLedger};
use deploykit::proxy::ProxyKind;
use deploykit::resolver::VersionResolver;
use deploykit::types::{Address, Version};
use deploykit_persistence::{chain_state, ArtifactDirectoryCompiler, LocalRegistry};
use std::path::{Path, PathBuf};

pub const DEFAULT_DEPLOYER: Address = Address([0xd0; 20]);

/// Everything one CLI invocation operates on.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub registry: PathBuf,
    pub journal: PathBuf,
    pub chain_state: PathBuf,
    pub sources: Vec<SourceGroup>,
    pub config: DeployConfig,
    pub deployer: Address,
}

impl Workspace {
    pub fn new(registry: impl Into<PathBuf>, chain_state: impl Into<PathBuf>) -> Self {
        let registry = registry.into();
        Self {
            journal: journal_path(&registry),
            registry,
            chain_state: chain_state.into(),
            sources: Vec::new(),
            config: DeployConfig::default(),
            deployer: DEFAULT_DEPLOYER,
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceGroup>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_config(mut self, config: DeployConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry handle whose appends are journaled under `operation`.
    pub fn open_registry(&self, operation: &str) -> LocalRegistry {
        let mut registry = LocalRegistry::new(&self.registry).with_journal(&self.journal);
        registry.set_operation(operation);
        registry
    }

    pub fn load_chain(&self) -> anyhow::Result<SimLedger> {
        chain_state::load(&self.chain_state)
            .with_context(|| format!("loading chain state {}", self.chain_state.display()))
    }

    pub fn save_chain(&self, ledger: &SimLedger) -> anyhow::Result<()> {
        chain_state::save(&self.chain_state, ledger)
            .with_context(|| format!("saving chain state {}", self.chain_state.display()))
    }

    pub fn resolver(&self) -> anyhow::Result<VersionResolver> {
        if self.sources.is_empty() {
            anyhow::bail!("no source groups given; pass --source VERSION=DIR[,DIR]");
        }
        Ok(VersionResolver::discover(&ArtifactDirectoryCompiler::new(), &self.sources)?)
    }

    pub fn signer(&self) -> LocalSigner {
        LocalSigner::new(self.deployer)
    }
}

/// `registry.json` -> `registry.audit`
pub fn journal_path(registry: &Path) -> PathBuf {
    registry.with_extension("audit")
}

/// `VERSION=DIR[,DIR...]`
pub fn parse_source(s: &str) -> Result<SourceGroup, String> {
    let (version, dirs) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VERSION=DIR[,DIR], got {:?}", s))?;
    let version: Version = version.trim().parse().map_err(|e| format!("{}", e))?;
    let dirs: Vec<&str> = dirs.split(',').map(str::trim).filter(|d| !d.is_empty()).collect();
    if dirs.is_empty() {
        return Err(format!("no directories for {}", version));
    }
    Ok(SourceGroup::new(version, dirs))
}

/// `NAME` (dispatcher) or `NAME=dispatcher|router`
pub fn parse_upgradeable(s: &str) -> Result<(String, ProxyKind), String> {
    match s.split_once('=') {
        None => Ok((s.trim().to_string(), ProxyKind::Dispatcher)),
        Some((name, kind)) => {
            let kind = ProxyKind::parse(kind.trim()).ok_or_else(|| format!("unknown proxy kind {:?}", kind))?;
            Ok((name.trim().to_string(), kind))
        }
    }
}
