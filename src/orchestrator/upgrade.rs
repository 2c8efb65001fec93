// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Upgrade Controller
//!
//! ```text
//! Resolved -> ImplementationDeployed -> Retargeted -> Enrolled
//! ```
//!
//! Each transition is attempted once. A failure stops the machine where it
//! is and the error carries the stage and any orphaned address; on-chain
//! state is never reverted automatically.
//!
//! # Version policy
//! By default the requested version must be the next known version after
//! the one currently enrolled. `allow_version_skip` lifts that.

use super::DeploymentOrchestrator;
use crate::error::{DeployError, Result, Stage};
use crate::proxy::ProxyError;
use crate::registry::ContractRegistry;
use crate::types::{Address, RegistryEnrollment, SecretHash, UpgradeSecret, VersionSelector};
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UpgradePhase {
    Resolved,
    ImplementationDeployed,
    Retargeted,
    Enrolled,
}

impl fmt::Display for UpgradePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpgradePhase::Resolved => "resolved",
            UpgradePhase::ImplementationDeployed => "implementation-deployed",
            UpgradePhase::Retargeted => "retargeted",
            UpgradePhase::Enrolled => "enrolled",
        })
    }
}

#[derive(Clone, Debug)]
pub struct UpgradeRequest {
    pub name: String,
    pub version: VersionSelector,
    /// Opens the proxy's current commitment.
    pub secret: UpgradeSecret,
    /// Commitment installed for the next retarget.
    pub next_secret_hash: SecretHash,
    pub allow_version_skip: bool,
    /// Reuse an implementation already deployed by a failed attempt.
    pub implementation: Option<Address>,
}

impl UpgradeRequest {
    pub fn new(
        name: impl Into<String>,
        version: VersionSelector,
        secret: UpgradeSecret,
        next_secret_hash: SecretHash,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            secret,
            next_secret_hash,
            allow_version_skip: false,
            implementation: None,
        }
    }

    pub fn skipping_versions(mut self) -> Self {
        self.allow_version_skip = true;
        self
    }

    pub fn resume_with(mut self, implementation: Address) -> Self {
        self.implementation = Some(implementation);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeOutcome {
    pub enrollment: RegistryEnrollment,
    pub proxy: Address,
    pub previous_target: Address,
    pub phase: UpgradePhase,
}

pub struct UpgradeController<'o, 'a> {
    orchestrator: &'o DeploymentOrchestrator<'a>,
}

impl<'o, 'a> UpgradeController<'o, 'a> {
    pub fn new(orchestrator: &'o DeploymentOrchestrator<'a>) -> Self {
        Self { orchestrator }
    }

    pub fn upgrade(&self, request: &UpgradeRequest, registry: &mut dyn ContractRegistry) -> Result<UpgradeOutcome> {
        let o = self.orchestrator;
        let name = request.name.as_str();

        if !o.proxies().is_upgradeable(name) {
            return Err(DeployError::NotUpgradeable { name: name.to_string() });
        }
        let current = registry
            .current(name)?
            .ok_or_else(|| DeployError::NotDeployed { name: name.to_string() })?;
        let proxy = o.live_proxy(&*registry, name)?;
        let artifact = o.resolver().resolve(name, request.version)?;

        if !request.allow_version_skip {
            let expected = o.resolver().successor(name, current.version);
            if expected != Some(artifact.version) {
                return Err(DeployError::VersionPolicy {
                    name: name.to_string(),
                    current: current.version,
                    requested: artifact.version,
                    expected: expected.map_or_else(|| "none, already latest".to_string(), |v| v.to_string()),
                });
            }
        }

        let previous_target = o.checked_target(&proxy, &current)?;
        let mut phase = UpgradePhase::Resolved;
        tracing::info!("Upgrade {} {} -> {}: {}", name, current.version, artifact.version, phase);

        let implementation = match request.implementation {
            Some(address) => {
                let code = o.transactor().code(address).map_err(|source| DeployError::Transaction {
                    stage: Stage::Deploy,
                    source,
                })?;
                if code.as_ref() != Some(&artifact.bytecode) {
                    return Err(DeployError::ImplementationMismatch {
                        name: name.to_string(),
                        version: artifact.version,
                        address,
                    });
                }
                tracing::info!("Reusing deployed implementation {}", address);
                address
            }
            None => o.deploy_implementation(artifact)?,
        };
        phase = UpgradePhase::ImplementationDeployed;
        tracing::info!("Upgrade {}: {} at {}", name, phase, implementation);

        o.proxy_manager()
            .retarget(&proxy, implementation, &request.secret, request.next_secret_hash)
            .map_err(|source| match source {
                ProxyError::Unauthorized { proxy: rejected_by } => DeployError::Unauthorized {
                    proxy: rejected_by,
                    orphaned: Some(implementation),
                },
                source => DeployError::Retarget {
                    proxy: proxy.address(),
                    orphaned: Some(implementation),
                    source,
                },
            })?;
        phase = UpgradePhase::Retargeted;
        tracing::info!("Upgrade {}: {}", name, phase);

        let enrollment = RegistryEnrollment::new(name, artifact.version, implementation, artifact.abi.clone());
        o.enroll(registry, enrollment.clone())?;
        phase = UpgradePhase::Enrolled;
        tracing::info!("Upgrade {}: {}", name, phase);

        Ok(UpgradeOutcome {
            enrollment,
            proxy: proxy.address(),
            previous_target,
            phase,
        })
    }
}
