use super::report;
use crate::workspace::Workspace;
use deploykit::orchestrator::{DeploymentOrchestrator, RollbackController, RollbackRequest};
use deploykit::resolver::VersionResolver;
use deploykit::types::UpgradeSecret;

pub fn run(ws: &Workspace, name: &str, secret: &str, next_secret: &str) -> anyhow::Result<()> {
    // Rollback targets are read from the registry, not resolved.
    let resolver = if ws.sources.is_empty() {
        VersionResolver::default()
    } else {
        ws.resolver()?
    };
    let ledger = ws.load_chain()?;
    let signer = ws.signer();
    let orchestrator = DeploymentOrchestrator::new(&resolver, &ledger, &signer, &ws.config);
    let mut registry = ws.open_registry("rollback");

    let request = RollbackRequest::new(
        name,
        UpgradeSecret::from(secret),
        UpgradeSecret::from(next_secret).commitment(),
    );
    let result = RollbackController::new(&orchestrator).rollback(&request, &mut registry);
    ws.save_chain(&ledger)?;
    let outcome = result.map_err(report)?;

    println!("\nRolled back {} to {}", name, outcome.enrollment.version);
    println!("Proxy:      {}", outcome.proxy);
    println!("Previous:   {}", outcome.previous_target);
    println!("Now:        {}\n", outcome.enrollment.address);
    Ok(())
}
