// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Operation-level errors.
//!
//! Every failure of deploy / upgrade / rollback names the stage it reached
//! so an operator can reconcile chain state against the registry by hand.

use crate::ledger::LedgerError;
use crate::proxy::{ProxyError, ProxyKind};
use crate::registry::RegistryError;
use crate::resolver::ResolveError;
use crate::types::{Address, RegistryEnrollment, Version};
use core::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Resolve,
    Deploy,
    Retarget,
    Enroll,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resolve => "resolve",
            Stage::Deploy => "deploy",
            Stage::Retarget => "retarget",
            Stage::Enroll => "enroll",
        })
    }
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("resolve: {0}")]
    Resolve(#[from] ResolveError),

    #[error("resolve: registry read failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("resolve: {name} has no enrollments")]
    NotDeployed { name: String },

    #[error("resolve: {name} is not an upgradeable contract")]
    NotUpgradeable { name: String },

    #[error("resolve: {name} is already enrolled at {current}; upgrade it instead")]
    AlreadyDeployed {
        name: String,
        kind: ProxyKind,
        current: Address,
        /// Live proxy, when one still targets an enrolled implementation.
        proxy: Option<Address>,
    },

    #[error("resolve: no enrolled proxy targets any {name} implementation")]
    ProxyNotFound { name: String },

    #[error("resolve: {name} is upgradeable and needs an initial secret commitment")]
    MissingSecretHash { name: String },

    #[error("resolve: upgrade of {name} from {current} to {requested} skips versions; expected {expected}")]
    VersionPolicy {
        name: String,
        current: Version,
        requested: Version,
        expected: String,
    },

    #[error("deploy: code at {address} does not match {name} {version}")]
    ImplementationMismatch {
        name: String,
        version: Version,
        address: Address,
    },

    #[error("{stage}: transaction failed: {source}")]
    Transaction {
        stage: Stage,
        #[source]
        source: LedgerError,
    },

    #[error("deploy: {kind} for {name} failed after {implementation} was enrolled: {source}")]
    ProxyDeployment {
        name: String,
        kind: ProxyKind,
        /// Enrolled, but nothing dispatches to it.
        implementation: Address,
        #[source]
        source: LedgerError,
    },

    #[error("retarget: {proxy} rejected the upgrade secret")]
    Unauthorized {
        proxy: Address,
        /// Implementation deployed by this attempt, not enrolled.
        orphaned: Option<Address>,
    },

    #[error("retarget: {proxy}: {source}")]
    Retarget {
        proxy: Address,
        orphaned: Option<Address>,
        #[source]
        source: ProxyError,
    },

    #[error("enroll: {address} is live on-chain but not enrolled: {source}")]
    PartialDeployment {
        address: Address,
        /// The record that still has to be appended.
        enrollment: Box<RegistryEnrollment>,
        #[source]
        source: RegistryError,
    },

    #[error("resolve: {name} has {enrolled} enrollment(s); rollback needs at least two")]
    NoRollbackTarget { name: String, enrolled: usize },
}

impl DeployError {
    /// Stage reached when the operation stopped.
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::Resolve(_)
            | DeployError::Registry(_)
            | DeployError::NotDeployed { .. }
            | DeployError::NotUpgradeable { .. }
            | DeployError::AlreadyDeployed { .. }
            | DeployError::ProxyNotFound { .. }
            | DeployError::MissingSecretHash { .. }
            | DeployError::VersionPolicy { .. }
            | DeployError::NoRollbackTarget { .. } => Stage::Resolve,
            DeployError::ImplementationMismatch { .. } | DeployError::ProxyDeployment { .. } => Stage::Deploy,
            DeployError::Transaction { stage, .. } => *stage,
            DeployError::Unauthorized { .. } | DeployError::Retarget { .. } => Stage::Retarget,
            DeployError::PartialDeployment { .. } => Stage::Enroll,
        }
    }

    /// True when the registry was not touched and the same request can be
    /// re-run. A retarget timeout is excluded: it may still confirm.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployError::Resolve(_) | DeployError::Registry(_) => true,
            DeployError::Transaction { stage, source } => {
                *stage == Stage::Deploy
                    && matches!(
                        source,
                        LedgerError::TransactionTimeout { .. } | LedgerError::Rejected(_)
                    )
            }
            _ => false,
        }
    }

    /// Address left for manual reconciliation: live but not enrolled, or
    /// enrolled without a proxy.
    pub fn orphaned_address(&self) -> Option<Address> {
        match self {
            DeployError::PartialDeployment { address, .. } => Some(*address),
            DeployError::ProxyDeployment { implementation, .. } => Some(*implementation),
            DeployError::Unauthorized { orphaned, .. } | DeployError::Retarget { orphaned, .. } => *orphaned,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
