use crate::error::Result;
use deploykit::compiler::SourceGroup;
use deploykit::types::Version;
use serde_json::json;

use std::fs;
use std::path::{Path, PathBuf};

pub struct TestPaths {
    pub v1: PathBuf,
    pub v2: PathBuf,
    pub proxies: PathBuf,
    pub registry: PathBuf,
    pub chain_state: PathBuf,
}

impl TestPaths {
    /// v1 (with the proxies) and v2.
    pub fn source_groups(&self) -> Vec<SourceGroup> {
        vec![
            SourceGroup::new(Version::new(1, 0, 0), [&self.v1, &self.proxies]),
            SourceGroup::new(Version::new(2, 0, 0), [&self.v2]),
        ]
    }
}

fn write_artifact(dir: &Path, name: &str, tag: u8) -> Result<()> {
    let body = json!({
        "abi": [{ "type": "function", "name": "version", "outputs": [{ "type": "uint8", "value": tag }] }],
        "bytecode": format!("0x6080{:02x}{}", tag, hex_name(name)),
    });
    fs::write(dir.join(format!("{}.json", name)), serde_json::to_vec_pretty(&body)?)?;
    Ok(())
}

fn hex_name(name: &str) -> String {
    name.bytes().map(|b| format!("{:02x}", b)).collect()
}

/// Artifact directories for an upgradeable `StakingEscrow` (1.0.0, 2.0.0),
/// a plain `Token` (1.0.0) and both proxy contracts, plus paths for the
/// registry and chain state (not created).
pub fn generate_test_scenario(dir: &Path) -> Result<TestPaths> {
    let v1 = dir.join("contracts/v1");
    let v2 = dir.join("contracts/v2");
    let proxies = dir.join("contracts/proxies");
    for d in [&v1, &v2, &proxies] {
        fs::create_dir_all(d)?;
    }

    write_artifact(&v1, "StakingEscrow", 1)?;
    write_artifact(&v1, "Token", 1)?;
    write_artifact(&v2, "StakingEscrow", 2)?;
    write_artifact(&proxies, "Dispatcher", 1)?;
    write_artifact(&proxies, "StakingInterfaceRouter", 1)?;

    Ok(TestPaths {
        v1,
        v2,
        proxies,
        registry: dir.join("registry.json"),
        chain_state: dir.join("chain.json"),
    })
}
