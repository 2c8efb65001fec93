// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proxy kinds.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::ledger::{Call, Query};
use crate::types::{Address, SecretHash, UpgradeSecret};

/// The two indirection contracts. Authorization semantics are identical;
/// the call and query shapes differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProxyKind {
    /// Generic per-contract proxy.
    Dispatcher,
    /// Proxy used by the staking interface family.
    Router,
}

impl ProxyKind {
    /// Name under which proxies of this kind are enrolled.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ProxyKind::Dispatcher => "Dispatcher",
            ProxyKind::Router => "StakingInterfaceRouter",
        }
    }

    /// The only way to build a retarget transaction: the new target and the
    /// next commitment always travel together.
    pub fn retarget_call(&self, target: Address, secret: UpgradeSecret, next_secret_hash: SecretHash) -> Call {
        match self {
            ProxyKind::Dispatcher => Call::DispatcherUpgrade {
                target,
                secret,
                next_secret_hash,
            },
            ProxyKind::Router => Call::RouterSetTarget {
                target,
                secret,
                next_secret_hash,
            },
        }
    }

    pub fn target_query(&self) -> Query {
        match self {
            ProxyKind::Dispatcher => Query::DispatcherTarget,
            ProxyKind::Router => Query::RouterTarget,
        }
    }

    pub fn commitment_query(&self) -> Query {
        match self {
            ProxyKind::Dispatcher => Query::DispatcherSecretHash,
            ProxyKind::Router => Query::RouterSecretHash,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dispatcher" => Some(ProxyKind::Dispatcher),
            "router" => Some(ProxyKind::Router),
            _ => None,
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}
