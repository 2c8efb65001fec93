use super::table;
use crate::workspace::Workspace;
use deploykit::orchestrator::DeploymentOrchestrator;
use deploykit::registry::ContractRegistry;
use deploykit::resolver::VersionResolver;
use deploykit_persistence::{audit, LocalRegistry};
use std::path::Path;

fn file_row(label: &str, path: &Path, details: String) -> Vec<String> {
    let status = if path.exists() { "FOUND" } else { "MISSING" };
    vec![label.to_string(), status.to_string(), path.display().to_string(), details]
}

pub fn run(ws: &Workspace) -> anyhow::Result<()> {
    println!("\nDeployment Status Report");
    println!("------------------------");

    let registry = LocalRegistry::new(&ws.registry);
    let enrollments = registry.all();
    let ledger = ws.load_chain()?;

    let mut files = table(vec!["File", "Status", "Path", "Details"]);
    files.add_row(file_row(
        "Registry",
        &ws.registry,
        match &enrollments {
            Ok(all) => format!("{} enrollments", all.len()),
            Err(e) => format!("CORRUPT: {}", e),
        },
    ));
    files.add_row(file_row(
        "Journal",
        &ws.journal,
        match audit::read_all(&ws.journal) {
            Ok(records) => format!("{} records", records.len()),
            Err(e) => format!("CORRUPT: {}", e),
        },
    ));
    let chain = ledger.snapshot();
    files.add_row(file_row(
        "Chain",
        &ws.chain_state,
        format!("block {}, {} contracts", chain.block_number, chain.contracts().count()),
    ));
    println!("{files}\n");

    enrollments?;

    let resolver = VersionResolver::default();
    let signer = ws.signer();
    let orchestrator = DeploymentOrchestrator::new(&resolver, &ledger, &signer, &ws.config);
    let proxies = orchestrator.proxy_manager();

    let mut contracts = table(vec!["Contract", "Proxy", "Live target", "Live version", "Status"]);
    for (name, kind) in ws.config.proxies.iter() {
        let Some(current) = registry.current(name)? else {
            contracts.add_row(vec![name, "-", "-", "-", "NOT DEPLOYED"]);
            continue;
        };
        let Some(proxy) = proxies.locate(&registry, kind, name)? else {
            contracts.add_row(vec![name.to_string(), format!("no live {}", kind), "-".into(), "-".into(), "NO PROXY".into()]);
            continue;
        };
        let target = proxies.current_target(&proxy)?;
        let live_version = registry
            .search(Some(name), Some(&target))?
            .pop()
            .map_or_else(|| "unenrolled".to_string(), |e| e.version.to_string());
        let status = if target == current.address { "IN SYNC" } else { "DIVERGED" };

        contracts.add_row(vec![
            name.to_string(),
            proxy.address().to_string(),
            target.to_string(),
            live_version,
            status.to_string(),
        ]);
    }
    println!("{contracts}\n");

    Ok(())
}
