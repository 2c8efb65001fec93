use super::report;
use crate::workspace::Workspace;
use deploykit::orchestrator::{DeploymentOrchestrator, UpgradeController, UpgradeRequest};
use deploykit::types::{Address, UpgradeSecret, VersionSelector};

pub struct UpgradeArgs<'a> {
    pub name: &'a str,
    pub version: VersionSelector,
    pub secret: &'a str,
    pub next_secret: &'a str,
    pub allow_version_skip: bool,
    pub resume: Option<Address>,
}

pub fn run(ws: &Workspace, args: UpgradeArgs<'_>) -> anyhow::Result<()> {
    let resolver = ws.resolver()?;
    let ledger = ws.load_chain()?;
    let signer = ws.signer();
    let orchestrator = DeploymentOrchestrator::new(&resolver, &ledger, &signer, &ws.config);
    let mut registry = ws.open_registry("upgrade");

    let mut request = UpgradeRequest::new(
        args.name,
        args.version,
        UpgradeSecret::from(args.secret),
        UpgradeSecret::from(args.next_secret).commitment(),
    );
    if args.allow_version_skip {
        request = request.skipping_versions();
    }
    if let Some(address) = args.resume {
        request = request.resume_with(address);
    }

    let result = UpgradeController::new(&orchestrator).upgrade(&request, &mut registry);
    ws.save_chain(&ledger)?;
    let outcome = result.map_err(report)?;

    println!("\nUpgraded {} to {}", args.name, outcome.enrollment.version);
    println!("Proxy:      {}", outcome.proxy);
    println!("Previous:   {}", outcome.previous_target);
    println!("Now:        {}\n", outcome.enrollment.address);
    Ok(())
}
