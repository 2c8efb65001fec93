use crate::workspace::Workspace;
use deploykit::ledger::LedgerClient;
use deploykit::registry::ContractRegistry;
use deploykit::types::{Address, RegistryEnrollment, Version, VersionSelector};

/// Enroll a contract that is live on-chain but missing from the registry,
/// as reported by a partial deployment. The code at `address` must match
/// the resolved artifact.
pub fn run(ws: &Workspace, name: &str, version: Version, address: Address) -> anyhow::Result<()> {
    let resolver = ws.resolver()?;
    let ledger = ws.load_chain()?;
    let artifact = resolver.resolve(name, VersionSelector::Exact(version))?;

    match ledger.code(address)? {
        None => anyhow::bail!("no code at {}; nothing to reconcile", address),
        Some(code) if code != artifact.bytecode => {
            anyhow::bail!("code at {} is not {} {}", address, name, version)
        }
        Some(_) => {}
    }

    let mut registry = ws.open_registry("reconcile");
    registry.append(RegistryEnrollment::new(name, version, address, artifact.abi.clone()))?;

    println!("\nReconciled {} {} at {}\n", name, version, address);
    Ok(())
}
