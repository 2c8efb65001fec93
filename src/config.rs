// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Deployment configuration.

use crate::ledger::ConfirmationPolicy;
use crate::proxy::ProxyKind;
use std::collections::BTreeMap;
use std::time::Duration;

/// Closed mapping from upgradeable contract name to its proxy kind.
///
/// Names not in the table are plain contracts and get no proxy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyTable {
    entries: BTreeMap<String, ProxyKind>,
}

impl ProxyTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, contract_name: impl Into<String>, kind: ProxyKind) -> Self {
        self.entries.insert(contract_name.into(), kind);
        self
    }

    pub fn kind_of(&self, contract_name: &str) -> Option<ProxyKind> {
        self.entries.get(contract_name).copied()
    }

    pub fn is_upgradeable(&self, contract_name: &str) -> bool {
        self.entries.contains_key(contract_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ProxyKind)> {
        self.entries.iter().map(|(n, k)| (n.as_str(), *k))
    }
}

impl Default for ProxyTable {
    fn default() -> Self {
        Self::empty()
            .with("StakingEscrow", ProxyKind::Dispatcher)
            .with("PolicyManager", ProxyKind::Dispatcher)
            .with("Adjudicator", ProxyKind::Dispatcher)
            .with("StakingInterface", ProxyKind::Router)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployConfig {
    /// Blocks required on top of a receipt before it counts.
    pub confirmations: u64,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub proxies: ProxyTable,
}

impl DeployConfig {
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.confirmations,
            timeout: self.timeout,
            poll_interval: self.poll_interval,
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        let policy = ConfirmationPolicy::default();
        Self {
            confirmations: policy.confirmations,
            timeout: policy.timeout,
            poll_interval: policy.poll_interval,
            proxies: ProxyTable::default(),
        }
    }
}
