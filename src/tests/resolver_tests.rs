use super::support::*;
use crate::compiler::{CompileError, SourceGroup, StaticCompiler};
use crate::ledger::sim::SimLedger;
use crate::orchestrator::{DeployRequest, DeploymentOrchestrator};
use crate::registry::InMemoryRegistry;
use crate::resolver::{ResolveError, VersionResolver};
use crate::types::{Version, VersionSelector};
use crate::DeployError;

#[test]
fn test_latest_earliest_exact() {
    let r = resolver();
    assert_eq!(r.resolve(X, VersionSelector::Latest).unwrap().version, v(3));
    assert_eq!(r.resolve(X, VersionSelector::Earliest).unwrap().version, v(1));

    let exact = r.resolve(X, VersionSelector::Exact(v(2))).unwrap();
    assert_eq!(exact.version, v(2));
    assert_eq!(exact.name, X);
    assert_eq!(exact.bytecode, contract(X, 2).bytecode);
}

#[test]
fn test_exact_is_not_a_prefix_match() {
    let r = resolver();
    let err = r.resolve(X, VersionSelector::Exact(Version::new(2, 0, 1))).unwrap_err();
    assert_eq!(
        err,
        ResolveError::AmbiguousOrMissingVersion {
            name: X.to_string(),
            requested: Version::new(2, 0, 1),
            available: vec![v(1), v(2), v(3)],
        }
    );
}

#[test]
fn test_unknown_name() {
    let err = resolver().resolve("Nope", VersionSelector::Latest).unwrap_err();
    assert_eq!(err, ResolveError::NotFound { name: "Nope".into() });
}

#[test]
fn test_missing_version_deploys_nothing() {
    let r = resolver();
    let cfg = config();
    let ledger = SimLedger::new();
    let signer = deployer();
    let orchestrator = DeploymentOrchestrator::new(&r, &ledger, &signer, &cfg);
    let mut registry = InMemoryRegistry::new();

    let request = DeployRequest::new(X, VersionSelector::Exact(Version::new(9, 9, 9)))
        .with_secret_hash(secret(0).commitment());
    let err = orchestrator.deploy(&request, &mut registry).unwrap_err();

    assert!(matches!(err, DeployError::Resolve(ResolveError::AmbiguousOrMissingVersion { .. })));
    assert_eq!(err.stage(), crate::Stage::Resolve);
    assert!(registry.is_empty());
    assert_eq!(ledger.contract_count(), 0);
}

#[test]
fn test_same_version_from_two_groups_is_rejected() {
    let compiler = StaticCompiler::new()
        .with_source("a", vec![contract(X, 1)])
        .with_source("b", vec![contract(X, 1)]);
    let groups = vec![SourceGroup::new(v(1), ["a"]), SourceGroup::new(v(1), ["b"])];

    let err = VersionResolver::discover(&compiler, &groups).unwrap_err();
    assert_eq!(
        err,
        ResolveError::DuplicateArtifact {
            name: X.into(),
            version: v(1)
        }
    );
}

#[test]
fn test_discovery_order_does_not_matter() {
    let mut reversed = groups();
    reversed.reverse();
    let a = resolver();
    let b = VersionResolver::discover(&compiler(), &reversed).unwrap();

    for name in a.names() {
        assert_eq!(a.versions(name), b.versions(name));
        for selector in [VersionSelector::Latest, VersionSelector::Earliest] {
            assert_eq!(a.resolve(name, selector).unwrap(), b.resolve(name, selector).unwrap());
        }
    }
}

#[test]
fn test_missing_source_dir() {
    let groups = vec![SourceGroup::new(v(1), ["contracts/v1", "contracts/gone"])];
    let err = VersionResolver::discover(&compiler(), &groups).unwrap_err();
    assert_eq!(err, ResolveError::Compile(CompileError::MissingSource("contracts/gone".into())));
}

#[test]
fn test_successor() {
    let r = resolver();
    assert_eq!(r.successor(X, v(1)), Some(v(2)));
    assert_eq!(r.successor(X, Version::new(1, 5, 0)), Some(v(2)));
    assert_eq!(r.successor(X, v(3)), None);
    assert_eq!(r.successor("Nope", v(1)), None);
}
