// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Rollback Controller
//!
//! A rollback is an upgrade to an address that is already enrolled: the
//! second-to-last enrollment for the name. History is never rewritten; a
//! NEW enrollment pointing at the old address is appended, so "current"
//! (last enrollment) follows the proxy.

use super::DeploymentOrchestrator;
use crate::error::{DeployError, Result};
use crate::proxy::ProxyError;
use crate::registry::ContractRegistry;
use crate::types::{Address, RegistryEnrollment, SecretHash, UpgradeSecret};

#[derive(Clone, Debug)]
pub struct RollbackRequest {
    pub name: String,
    pub secret: UpgradeSecret,
    pub next_secret_hash: SecretHash,
}

impl RollbackRequest {
    pub fn new(name: impl Into<String>, secret: UpgradeSecret, next_secret_hash: SecretHash) -> Self {
        Self {
            name: name.into(),
            secret,
            next_secret_hash,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RollbackOutcome {
    pub enrollment: RegistryEnrollment,
    pub proxy: Address,
    pub previous_target: Address,
}

pub struct RollbackController<'o, 'a> {
    orchestrator: &'o DeploymentOrchestrator<'a>,
}

impl<'o, 'a> RollbackController<'o, 'a> {
    pub fn new(orchestrator: &'o DeploymentOrchestrator<'a>) -> Self {
        Self { orchestrator }
    }

    pub fn rollback(&self, request: &RollbackRequest, registry: &mut dyn ContractRegistry) -> Result<RollbackOutcome> {
        let o = self.orchestrator;
        let name = request.name.as_str();

        if !o.proxies().is_upgradeable(name) {
            return Err(DeployError::NotUpgradeable { name: name.to_string() });
        }
        let mut history = registry.search(Some(name), None)?;
        let enrolled = history.len();
        let (Some(current), Some(target)) = (history.pop(), history.pop()) else {
            return Err(DeployError::NoRollbackTarget {
                name: name.to_string(),
                enrolled,
            });
        };

        let proxy = o.live_proxy(&*registry, name)?;
        let previous_target = o.checked_target(&proxy, &current)?;
        tracing::info!(
            "Rolling back {} from {} ({}) to {} ({})",
            name,
            current.version,
            current.address,
            target.version,
            target.address
        );

        o.proxy_manager()
            .retarget(&proxy, target.address, &request.secret, request.next_secret_hash)
            .map_err(|source| match source {
                ProxyError::Unauthorized { proxy: rejected_by } => DeployError::Unauthorized {
                    proxy: rejected_by,
                    orphaned: None,
                },
                source => DeployError::Retarget {
                    proxy: proxy.address(),
                    orphaned: None,
                    source,
                },
            })?;

        let enrollment = RegistryEnrollment::new(name, target.version, target.address, target.abi);
        o.enroll(registry, enrollment.clone())?;

        Ok(RollbackOutcome {
            enrollment,
            proxy: proxy.address(),
            previous_target,
        })
    }
}
