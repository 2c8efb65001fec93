use super::{report, table};
use crate::workspace::Workspace;
use deploykit::orchestrator::{DeployRequest, DeploymentOrchestrator};
use deploykit::types::{UpgradeSecret, VersionSelector};

pub fn run(ws: &Workspace, name: &str, version: VersionSelector, secret: Option<&str>) -> anyhow::Result<()> {
    let resolver = ws.resolver()?;
    let ledger = ws.load_chain()?;
    let signer = ws.signer();
    let orchestrator = DeploymentOrchestrator::new(&resolver, &ledger, &signer, &ws.config);
    let mut registry = ws.open_registry("deploy");

    let mut request = DeployRequest::new(name, version);
    if let Some(secret) = secret {
        request = request.with_secret_hash(UpgradeSecret::from(secret).commitment());
    }
    let result = orchestrator.deploy(&request, &mut registry);
    // Chain effects persist even when the registry step failed.
    ws.save_chain(&ledger)?;
    let deployment = result.map_err(report)?;

    let mut out = table(vec!["Contract", "Version", "Address"]);
    for e in deployment.enrollments() {
        out.add_row(vec![e.contract_name.clone(), e.version.to_string(), e.address.to_string()]);
    }
    println!("\nDeployed {}\n", name);
    println!("{out}\n");
    Ok(())
}
