use super::support::*;
use crate::ledger::sim::SimLedger;
use crate::orchestrator::{DeployRequest, Deployment, DeploymentOrchestrator, UpgradeController, UpgradeRequest};
use crate::proxy::{ProxyError, ProxyKind};
use crate::registry::{ContractRegistry, InMemoryRegistry};
use crate::types::VersionSelector;
use crate::DeployError;

fn deploy(orchestrator: &DeploymentOrchestrator<'_>, registry: &mut InMemoryRegistry, name: &str) -> Deployment {
    let request = DeployRequest::new(name, VersionSelector::Earliest).with_secret_hash(secret(0).commitment());
    orchestrator.deploy(&request, registry).unwrap()
}

#[test]
fn test_wrong_secret_changes_nothing() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();
    let deployed = deploy(&orchestrator, &mut registry, X);
    let proxy = deployed.proxy.unwrap();
    let before = ledger.proxy_slot(&proxy.address()).unwrap();
    let block = ledger.snapshot().block_number;

    let err = orchestrator
        .proxy_manager()
        .retarget(&proxy, deployed.implementation.address, &secret(7), secret(8).commitment())
        .unwrap_err();

    assert_eq!(err, ProxyError::Unauthorized { proxy: proxy.address() });
    assert_eq!(ledger.proxy_slot(&proxy.address()).unwrap(), before);
    assert_eq!(ledger.snapshot().block_number, block);
}

#[test]
fn test_correct_secret_rotates_commitment() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();
    let first = deploy(&orchestrator, &mut registry, X);
    let other = deploy(&orchestrator, &mut registry, Y);
    let proxy = first.proxy.unwrap();
    let new_target = other.implementation.address;

    orchestrator
        .proxy_manager()
        .retarget(&proxy, new_target, &secret(0), secret(1).commitment())
        .unwrap();

    let slot = ledger.proxy_slot(&proxy.address()).unwrap();
    assert_eq!(slot.target, new_target);
    assert_eq!(slot.secret_hash, secret(1).commitment());
    assert_eq!(orchestrator.proxy_manager().current_target(&proxy).unwrap(), new_target);

    // The spent secret no longer authorizes anything.
    let err = orchestrator
        .proxy_manager()
        .retarget(&proxy, first.implementation.address, &secret(0), secret(2).commitment())
        .unwrap_err();
    assert_eq!(err, ProxyError::Unauthorized { proxy: proxy.address() });
    assert_eq!(ledger.proxy_slot(&proxy.address()).unwrap().target, new_target);
}

#[test]
fn test_locate_picks_the_proxy_of_the_right_contract() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();
    let x = deploy(&orchestrator, &mut registry, X);
    let y = deploy(&orchestrator, &mut registry, Y);

    let manager = orchestrator.proxy_manager();
    let found_x = manager.locate(&registry, ProxyKind::Dispatcher, X).unwrap().unwrap();
    let found_y = manager.locate(&registry, ProxyKind::Dispatcher, Y).unwrap().unwrap();
    assert_eq!(Some(found_x), x.proxy);
    assert_eq!(Some(found_y), y.proxy);
    assert!(manager.locate(&registry, ProxyKind::Router, X).unwrap().is_none());
}

#[test]
fn test_upgrading_one_contract_leaves_siblings_alone() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();
    let x = deploy(&orchestrator, &mut registry, X);
    let y = deploy(&orchestrator, &mut registry, Y);

    let request = UpgradeRequest::new(Y, VersionSelector::Exact(v(2)), secret(0), secret(1).commitment());
    let outcome = UpgradeController::new(&orchestrator).upgrade(&request, &mut registry).unwrap();

    assert_eq!(outcome.proxy, y.proxy.unwrap().address());
    let x_slot = ledger.proxy_slot(&x.proxy.unwrap().address()).unwrap();
    assert_eq!(x_slot.target, x.implementation.address);
    assert_eq!(x_slot.secret_hash, secret(0).commitment());
}

#[test]
fn test_router_kind() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();

    let deployed = deploy(&orchestrator, &mut registry, "StakingInterface");
    let proxy = deployed.proxy.unwrap();
    assert_eq!(proxy.kind, ProxyKind::Router);
    assert_eq!(proxy.enrollment.contract_name, "StakingInterfaceRouter");

    let request = UpgradeRequest::new(
        "StakingInterface",
        VersionSelector::Latest,
        secret(0),
        secret(1).commitment(),
    );
    let outcome = UpgradeController::new(&orchestrator).upgrade(&request, &mut registry).unwrap();
    assert_eq!(outcome.enrollment.version, v(2));
    assert_eq!(ledger.proxy_slot(&proxy.address()).unwrap().target, outcome.enrollment.address);
}

#[test]
fn test_plain_contract_gets_no_proxy() {
    let (r, cfg, ledger, signer) = (resolver(), config(), SimLedger::new(), deployer());
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();

    let deployed = orchestrator
        .deploy(&DeployRequest::new(PLAIN, VersionSelector::Latest), &mut registry)
        .unwrap();
    assert!(deployed.proxy.is_none());
    assert_eq!(registry.len(), 1);
    assert_eq!(ledger.contract_count(), 1);

    let request = UpgradeRequest::new(PLAIN, VersionSelector::Latest, secret(0), secret(1).commitment());
    let err = UpgradeController::new(&orchestrator).upgrade(&request, &mut registry).unwrap_err();
    assert!(matches!(err, DeployError::NotUpgradeable { .. }));
    assert_eq!(registry.all().unwrap().len(), 1);
}
