// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Shared scenario setup: a three-version contract `X`, a plain contract,
//! both proxy kinds and a registry that can be told to fail.

use crate::compiler::{SourceContract, SourceGroup, StaticCompiler};
use crate::config::{DeployConfig, ProxyTable};
use crate::ledger::sim::{LocalSigner, SimLedger};
use crate::ledger::{self, CallValue, LedgerClient, LedgerError, Query, Receipt, SignedTransaction};
use crate::proxy::ProxyKind;
use crate::registry::{ContractRegistry, InMemoryRegistry, RegistryError, Result};
use crate::resolver::VersionResolver;
use crate::types::{Address, Bytecode, RegistryEnrollment, TxHash, UpgradeSecret, Version};
use serde_json::json;
use std::cell::Cell;
use std::time::Duration;

pub const X: &str = "X";
pub const Y: &str = "Y";
pub const PLAIN: &str = "Token";

pub fn v(major: u32) -> Version {
    Version::new(major, 0, 0)
}

pub fn contract(name: &str, major: u8) -> SourceContract {
    SourceContract {
        name: name.to_string(),
        abi: json!([{ "type": "function", "name": format!("{}_v{}", name.to_lowercase(), major) }]),
        bytecode: Bytecode(vec![0x60, major, name.len() as u8]),
    }
}

/// X and Y at 1.0.0 .. 3.0.0, StakingInterface at 1.0.0 .. 2.0.0, both
/// proxies and a plain token at 1.0.0.
pub fn compiler() -> StaticCompiler {
    let mut compiler = StaticCompiler::new().with_source(
        "contracts/proxies",
        vec![contract("Dispatcher", 1), contract("StakingInterfaceRouter", 1)],
    );
    for major in 1..=3u8 {
        let mut contracts = vec![contract(X, major), contract(Y, major)];
        if major <= 2 {
            contracts.push(contract("StakingInterface", major));
        }
        if major == 1 {
            contracts.push(contract(PLAIN, major));
        }
        compiler = compiler.with_source(format!("contracts/v{}", major), contracts);
    }
    compiler
}

pub fn groups() -> Vec<SourceGroup> {
    vec![
        SourceGroup::new(v(1), ["contracts/v1", "contracts/proxies"]),
        SourceGroup::new(v(2), ["contracts/v2"]),
        SourceGroup::new(v(3), ["contracts/v3"]),
    ]
}

pub fn resolver() -> VersionResolver {
    VersionResolver::discover(&compiler(), &groups()).unwrap()
}

pub fn config() -> DeployConfig {
    DeployConfig {
        poll_interval: Duration::from_millis(1),
        proxies: ProxyTable::default()
            .with(X, ProxyKind::Dispatcher)
            .with(Y, ProxyKind::Dispatcher),
        ..DeployConfig::default()
    }
}

pub fn deployer() -> LocalSigner {
    LocalSigner::new(Address([0xde; 20]))
}

pub fn secret(n: u32) -> UpgradeSecret {
    UpgradeSecret::new(format!("upgrade-secret-{}", n))
}

/// Registry that accepts `budget` appends and then fails every write.
pub struct FailingRegistry {
    pub inner: InMemoryRegistry,
    budget: usize,
}

impl FailingRegistry {
    pub fn after(budget: usize) -> Self {
        Self {
            inner: InMemoryRegistry::new(),
            budget,
        }
    }
}

impl ContractRegistry for FailingRegistry {
    fn append(&mut self, enrollment: RegistryEnrollment) -> Result<()> {
        if self.budget == 0 {
            return Err(RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.budget -= 1;
        self.inner.append(enrollment)
    }

    fn all(&self) -> Result<Vec<RegistryEnrollment>> {
        self.inner.all()
    }
}

/// Ledger whose `fail_at`-th send (1-based) is refused by the node.
pub struct FlakyLedger {
    pub inner: SimLedger,
    sends: Cell<usize>,
    fail_at: usize,
}

impl FlakyLedger {
    pub fn failing_send(fail_at: usize) -> Self {
        Self {
            inner: SimLedger::new(),
            sends: Cell::new(0),
            fail_at,
        }
    }
}

impl LedgerClient for FlakyLedger {
    fn send(&self, tx: SignedTransaction) -> ledger::Result<TxHash> {
        let n = self.sends.get() + 1;
        self.sends.set(n);
        if n == self.fail_at {
            return Err(LedgerError::Rejected("node down".into()));
        }
        self.inner.send(tx)
    }

    fn receipt(&self, tx_hash: &TxHash) -> ledger::Result<Option<Receipt>> {
        self.inner.receipt(tx_hash)
    }

    fn block_number(&self) -> ledger::Result<u64> {
        self.inner.block_number()
    }

    fn call(&self, contract: Address, query: Query) -> ledger::Result<CallValue> {
        self.inner.call(contract, query)
    }

    fn code(&self, address: Address) -> ledger::Result<Option<Bytecode>> {
        self.inner.code(address)
    }
}
