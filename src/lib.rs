// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! deploykit: lifecycle management for upgradeable contract deployments.
//!
//! Resolve a contract version, deploy it behind a proxy, record every
//! deployment in an append-only registry, then upgrade or roll back the
//! live implementation while keeping full history.

pub mod compiler;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod types;

pub use config::{DeployConfig, ProxyTable};
pub use error::{DeployError, Stage};
pub use orchestrator::{
    DeployRequest, Deployment, DeploymentOrchestrator, RollbackController, RollbackRequest, UpgradeController,
    UpgradeRequest,
};
pub use registry::{ContractRegistry, InMemoryRegistry, RegistryError};
pub use resolver::{ResolveError, VersionResolver};

#[cfg(test)]
mod tests;
