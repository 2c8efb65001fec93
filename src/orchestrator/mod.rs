// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Deployment Orchestrator
//!
//! Resolve -> deploy implementation -> (first time) deploy proxy -> enroll.
//!
//! # Ordering
//! The on-chain mutation always happens before the registry append. A
//! crash in between leaves a live, unregistered contract, which
//! `PartialDeployment` reports with its address; never a registry entry
//! for something that does not exist.
//!
//! # Failure handling
//! - implementation transaction fails (incl. timeout): registry untouched,
//!   safe to retry
//! - registry append fails: `PartialDeployment`, never retried here
//! - proxy creation fails: `ProxyDeployment`; the implementation is
//!   already enrolled, so the request is not retryable

pub mod rollback;
pub mod upgrade;

pub use rollback::{RollbackController, RollbackOutcome, RollbackRequest};
pub use upgrade::{UpgradeController, UpgradeOutcome, UpgradePhase, UpgradeRequest};

use crate::config::{DeployConfig, ProxyTable};
use crate::error::{DeployError, Result, Stage};
use crate::ledger::{Call, Constructor, LedgerClient, LedgerError, Signer, Transactor};
use crate::proxy::{ProxyKind, ProxyManager, ProxyRecord};
use crate::registry::ContractRegistry;
use crate::resolver::VersionResolver;
use crate::types::{Address, ContractArtifact, RegistryEnrollment, SecretHash, VersionSelector};

#[derive(Clone, Debug, PartialEq)]
pub struct DeployRequest {
    pub name: String,
    pub version: VersionSelector,
    /// Initial commitment; required for upgradeable contracts.
    pub secret_hash: Option<SecretHash>,
}

impl DeployRequest {
    pub fn new(name: impl Into<String>, version: VersionSelector) -> Self {
        Self {
            name: name.into(),
            version,
            secret_hash: None,
        }
    }

    pub fn with_secret_hash(mut self, secret_hash: SecretHash) -> Self {
        self.secret_hash = Some(secret_hash);
        self
    }
}

/// What a successful `deploy` enrolled.
#[derive(Clone, Debug, PartialEq)]
pub struct Deployment {
    pub implementation: RegistryEnrollment,
    pub proxy: Option<ProxyRecord>,
}

impl Deployment {
    pub fn enrollments(&self) -> Vec<&RegistryEnrollment> {
        let mut out = vec![&self.implementation];
        if let Some(p) = &self.proxy {
            out.push(&p.enrollment);
        }
        out
    }
}

pub struct DeploymentOrchestrator<'a> {
    resolver: &'a VersionResolver,
    transactor: Transactor<'a>,
    proxies: &'a ProxyTable,
}

impl<'a> DeploymentOrchestrator<'a> {
    pub fn new(
        resolver: &'a VersionResolver,
        ledger: &'a dyn LedgerClient,
        signer: &'a dyn Signer,
        config: &'a DeployConfig,
    ) -> Self {
        Self {
            resolver,
            transactor: Transactor::new(ledger, signer, config.confirmation_policy()),
            proxies: &config.proxies,
        }
    }

    pub fn resolver(&self) -> &VersionResolver {
        self.resolver
    }

    pub fn proxies(&self) -> &ProxyTable {
        self.proxies
    }

    pub fn proxy_manager(&self) -> ProxyManager<'_, 'a> {
        ProxyManager::new(&self.transactor)
    }

    pub(crate) fn transactor(&self) -> &Transactor<'a> {
        &self.transactor
    }

    pub fn deploy(&self, request: &DeployRequest, registry: &mut dyn ContractRegistry) -> Result<Deployment> {
        let artifact = self.resolver.resolve(&request.name, request.version)?;

        // Everything that can be refused is refused before the first transaction.
        let proxy_plan = match self.proxies.kind_of(&request.name) {
            None => None,
            Some(kind) => {
                let secret_hash = request.secret_hash.ok_or_else(|| DeployError::MissingSecretHash {
                    name: request.name.clone(),
                })?;
                // Any enrollment counts: after a partial upgrade the live
                // proxy targets an unenrolled address and `locate` misses it.
                if let Some(current) = registry.current(&request.name)? {
                    let proxy = self.proxy_manager().locate(&*registry, kind, &request.name)?;
                    return Err(DeployError::AlreadyDeployed {
                        name: request.name.clone(),
                        kind,
                        current: current.address,
                        proxy: proxy.map(|p| p.address()),
                    });
                }
                let proxy_artifact = self.resolver.resolve(kind.contract_name(), VersionSelector::Latest)?;
                Some((kind, proxy_artifact, secret_hash))
            }
        };
        tracing::info!("Resolved {} {} for deployment", artifact.name, artifact.version);

        let address = self.deploy_implementation(artifact)?;
        let implementation = RegistryEnrollment::new(&artifact.name, artifact.version, address, artifact.abi.clone());
        self.enroll(registry, implementation.clone())?;

        let proxy = match proxy_plan {
            None => None,
            Some((kind, proxy_artifact, secret_hash)) => {
                let record = self.deploy_proxy(&artifact.name, kind, proxy_artifact, address, secret_hash)?;
                self.enroll(registry, record.enrollment.clone())?;
                Some(record)
            }
        };

        Ok(Deployment { implementation, proxy })
    }

    fn deploy_proxy(
        &self,
        contract_name: &str,
        kind: ProxyKind,
        artifact: &ContractArtifact,
        target: Address,
        secret_hash: SecretHash,
    ) -> Result<ProxyRecord> {
        self.proxy_manager()
            .deploy_proxy(kind, artifact, target, secret_hash)
            .map_err(|source| {
                tracing::error!("{} deployment failed after {} was enrolled: {}", kind, target, source);
                DeployError::ProxyDeployment {
                    name: contract_name.to_string(),
                    kind,
                    implementation: target,
                    source,
                }
            })
    }

    /// Create the implementation contract. No registry side effects.
    pub(crate) fn deploy_implementation(&self, artifact: &ContractArtifact) -> Result<Address> {
        let call = Call::Create {
            contract_name: artifact.name.clone(),
            version: artifact.version,
            bytecode: artifact.bytecode.clone(),
            constructor: Constructor::Empty,
        };
        let receipt = self.transactor.submit(None, call).map_err(|source| {
            tracing::warn!("Deployment of {} {} failed: {}", artifact.name, artifact.version, source);
            DeployError::Transaction {
                stage: Stage::Deploy,
                source,
            }
        })?;
        let address = receipt.contract_address.ok_or_else(|| DeployError::Transaction {
            stage: Stage::Deploy,
            source: LedgerError::UnexpectedValue("receipt has no contract address".into()),
        })?;
        tracing::info!("Deployed {} {} at {}", artifact.name, artifact.version, address);
        Ok(address)
    }

    /// Append after a successful on-chain mutation.
    pub(crate) fn enroll(&self, registry: &mut dyn ContractRegistry, enrollment: RegistryEnrollment) -> Result<()> {
        let address = enrollment.address;
        match registry.append(enrollment.clone()) {
            Ok(()) => {
                tracing::info!(
                    "Enrolled {} {} at {}",
                    enrollment.contract_name,
                    enrollment.version,
                    address
                );
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    "{} {} is live at {} but could not be enrolled: {}",
                    enrollment.contract_name,
                    enrollment.version,
                    address,
                    source
                );
                Err(DeployError::PartialDeployment {
                    address,
                    enrollment: Box::new(enrollment),
                    source,
                })
            }
        }
    }

    /// Proxy kind and live proxy of an upgradeable, deployed contract.
    pub(crate) fn live_proxy(&self, registry: &dyn ContractRegistry, name: &str) -> Result<ProxyRecord> {
        let kind = self.proxies.kind_of(name).ok_or_else(|| DeployError::NotUpgradeable {
            name: name.to_string(),
        })?;
        self.proxy_manager()
            .locate(registry, kind, name)?
            .ok_or_else(|| DeployError::ProxyNotFound { name: name.to_string() })
    }

    /// Live target of `proxy`, warning if it is not the registry's current.
    pub(crate) fn checked_target(&self, proxy: &ProxyRecord, current: &RegistryEnrollment) -> Result<Address> {
        let live = self
            .proxy_manager()
            .current_target(proxy)
            .map_err(|source| DeployError::Retarget {
                proxy: proxy.address(),
                orphaned: None,
                source,
            })?;
        if live != current.address {
            tracing::warn!(
                "{} targets {} but the registry's current {} is {}",
                proxy.address(),
                live,
                current.contract_name,
                current.address
            );
        }
        Ok(live)
    }
}
